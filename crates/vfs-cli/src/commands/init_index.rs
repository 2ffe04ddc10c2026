//! Init-index command: seed a new index from the store

use colored::Colorize;
use vfs_index::{FileIndex, build_index_from_store};

use super::EXIT_OK;
use crate::context::RunContext;
use crate::error::{CliError, Result};

/// Create the index file and fill it from a store walk.
pub fn run_init_index(ctx: &RunContext) -> Result<i32> {
    let store = ctx.open_store()?;
    let path = ctx.index_path()?;

    if path.exists() {
        return Err(CliError::user(format!(
            "Index file {} already exists.",
            path.display()
        )));
    }
    if path.starts_with(store.root()) {
        return Err(CliError::user(format!(
            "Index file {} must live outside the store root {}.",
            path.display(),
            store.root().display()
        )));
    }

    let index = FileIndex::create(path)?;
    let report = build_index_from_store(&index, &store)?;

    println!(
        "{} Index initialized at {} ({} directories, {} files).",
        "OK".green().bold(),
        path.display().to_string().cyan(),
        report.dirs,
        report.files
    );
    Ok(EXIT_OK)
}
