//! Fsck runner
//!
//! Scans, then (when asked) repairs each record in discovery order.

use tracing::{info, warn};
use vfs_fs::ContentStore;
use vfs_index::Indexer;

use super::prune::prune;
use super::report::FsckReport;
use super::scanner::Scanner;
use crate::{CancellationToken, Result};

/// Options for a run
#[derive(Debug, Clone, Default)]
pub struct FsckOptions {
    /// Describe repairs without writing them
    pub dry_run: bool,
    /// Run the repair policy after scanning
    pub repair: bool,
    /// Polled between nodes and between repairs
    pub cancel: CancellationToken,
}

/// Runs the checker over one index and one store.
pub struct Fsck<'a> {
    index: &'a dyn Indexer,
    store: &'a dyn ContentStore,
    options: FsckOptions,
}

impl<'a> Fsck<'a> {
    pub fn new(index: &'a dyn Indexer, store: &'a dyn ContentStore, options: FsckOptions) -> Self {
        Self {
            index,
            store,
            options,
        }
    }

    pub fn options(&self) -> &FsckOptions {
        &self.options
    }

    /// Scan, optionally repair, and summarize.
    ///
    /// Only read errors during the scan fail the run. Cancellation yields a
    /// report covering what was done, with status
    /// [`Cancelled`](super::FsckStatus::Cancelled).
    pub fn run(&self) -> Result<FsckReport> {
        let cancel = &self.options.cancel;
        let mut logs = Vec::new();
        let scanned = Scanner::new(self.index, self.store)
            .with_cancel(cancel.clone())
            .scan_each(&mut |log| logs.push(log));

        let mut cancelled = match scanned {
            Ok(()) => false,
            Err(e) if e.is_cancelled() => {
                warn!(found = logs.len(), "Scan cancelled");
                true
            }
            Err(e) => return Err(e),
        };

        let applied = self.options.repair && !self.options.dry_run;
        if self.options.repair && !cancelled {
            for log in &mut logs {
                if cancel.is_cancelled() {
                    warn!("Repair cancelled");
                    cancelled = true;
                    break;
                }
                prune(self.index, log, self.options.dry_run);
            }
        }

        let report = FsckReport::from_logs(logs, applied, cancelled);
        info!(
            status = ?report.status,
            discrepancies = report.counts.total(),
            repaired = report.counts.repaired,
            failed = report.counts.failed,
            dry_run = self.options.dry_run,
            "Fsck complete"
        );
        Ok(report)
    }
}
