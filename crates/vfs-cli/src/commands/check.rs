//! Check command: scan only

use colored::Colorize;
use vfs_core::Fsck;

use super::render;
use super::{EXIT_OK, EXIT_UNHEALTHY};
use crate::context::RunContext;
use crate::error::Result;

/// Scan the index against the store and report.
///
/// Returns [`EXIT_UNHEALTHY`] when anything disagrees.
pub fn run_check(ctx: &RunContext, json: bool) -> Result<i32> {
    let store = ctx.open_store()?;
    let index = ctx.open_index()?;

    if !json {
        println!(
            "{} Checking {} against {}...",
            "=>".blue().bold(),
            ctx.index_path()?.display(),
            ctx.store_root()?.display()
        );
    }

    let report = Fsck::new(&index, &store, ctx.options(false, false)).run()?;

    if json {
        render::print_json(&report)?;
    } else {
        render::print_human(&report, false);
        if !report.status.is_healthy() {
            println!();
            println!("Run {} to repair.", "vfsck repair".cyan());
        }
    }

    Ok(if report.status.is_healthy() {
        EXIT_OK
    } else {
        EXIT_UNHEALTHY
    })
}
