//! Repair command: scan, then apply the repair policy

use colored::Colorize;
use vfs_core::Fsck;

use super::EXIT_OK;
use super::render;
use crate::context::RunContext;
use crate::error::Result;

/// Scan and repair. Failed repairs are reported, not fatal.
pub fn run_repair(ctx: &RunContext, dry_run: bool, json: bool) -> Result<i32> {
    let store = ctx.open_store()?;
    let index = ctx.open_index()?;
    let options = ctx.options(true, dry_run);
    let dry_run = options.dry_run;

    if !json {
        let verb = if dry_run { "Planning repairs for" } else { "Repairing" };
        println!(
            "{} {} {}...",
            "=>".blue().bold(),
            verb,
            ctx.index_path()?.display()
        );
    }

    let report = Fsck::new(&index, &store, options).run()?;

    if json {
        render::print_json(&report)?;
    } else {
        render::print_human(&report, dry_run);
    }
    Ok(EXIT_OK)
}
