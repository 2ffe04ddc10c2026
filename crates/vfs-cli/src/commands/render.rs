//! Human and JSON rendering of fsck reports

use colored::Colorize;
use vfs_core::{DiscrepancyKind, FsckLog, FsckReport, FsckStatus};

use crate::error::Result;

/// Print the report as pretty JSON on stdout.
pub fn print_json(report: &FsckReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Print one line per record and a closing summary.
pub fn print_human(report: &FsckReport, dry_run: bool) {
    for log in &report.logs {
        print_log(log, dry_run);
    }
    if !report.logs.is_empty() {
        println!();
    }
    print_summary(report, dry_run);
}

fn print_log(log: &FsckLog, dry_run: bool) {
    let marker = match log.kind() {
        DiscrepancyKind::FileMissing => "-".red(),
        DiscrepancyKind::IndexMissing => "+".green(),
        DiscrepancyKind::TypeMismatch => "!".red(),
        DiscrepancyKind::ContentMismatch => "~".yellow(),
    };
    println!(
        "   {} {}: {} {}",
        marker,
        log.filename.to_string().cyan(),
        log.message(),
        format!("({})", log.file_id()).dimmed()
    );

    if log.has_action() {
        let label = if dry_run { "would" } else { "->" };
        match &log.prune_error {
            None => println!("      {} {}", label.green(), log.prune_action),
            Some(e) => println!(
                "      {} {} {}",
                label.red(),
                log.prune_action,
                format!("failed: {e}").red()
            ),
        }
    }
}

fn print_summary(report: &FsckReport, dry_run: bool) {
    let c = &report.counts;
    match report.status {
        FsckStatus::Healthy => {
            println!(
                "{} Index and store are consistent.",
                "OK".green().bold()
            );
        }
        FsckStatus::Repaired => {
            println!(
                "{} Repaired {} discrepancies.",
                "REPAIRED".green().bold(),
                c.repaired
            );
        }
        FsckStatus::Degraded => {
            println!(
                "{} {} discrepancies ({} file missing, {} index missing, {} type mismatch, {} content mismatch)",
                "DEGRADED".yellow().bold(),
                c.total(),
                c.file_missing,
                c.index_missing,
                c.type_mismatch,
                c.content_mismatch
            );
            if c.repaired > 0 {
                println!("   {} repaired", c.repaired);
            }
            if c.failed > 0 {
                println!("   {}", format!("{} repairs failed", c.failed).red());
            }
            if dry_run {
                println!("   Dry run: nothing was written.");
            }
        }
        FsckStatus::Cancelled => {
            println!(
                "{} Run stopped after {} discrepancies.",
                "CANCELLED".red().bold(),
                c.total()
            );
        }
    }
}
