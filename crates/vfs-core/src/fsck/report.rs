//! Run reports
//!
//! Provides the summary of one check or repair run.

use serde::Serialize;

use super::log::{DiscrepancyKind, FsckLog};

/// Overall outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FsckStatus {
    /// Index and store agree
    Healthy,
    /// Every discrepancy was repaired
    Repaired,
    /// Something is left: a failed repair, or a discrepancy that is reported
    /// only or was not repaired
    Degraded,
    /// The run stopped before finishing
    Cancelled,
}

impl FsckStatus {
    /// The worse of two statuses:
    /// Cancelled > Degraded > Repaired > Healthy
    pub fn worst(self, other: FsckStatus) -> FsckStatus {
        use FsckStatus::*;
        match (self, other) {
            (Cancelled, _) | (_, Cancelled) => Cancelled,
            (Degraded, _) | (_, Degraded) => Degraded,
            (Repaired, _) | (_, Repaired) => Repaired,
            (Healthy, Healthy) => Healthy,
        }
    }

    pub fn is_healthy(self) -> bool {
        self == FsckStatus::Healthy
    }
}

/// Tallies over the records of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FsckCounts {
    pub file_missing: usize,
    pub index_missing: usize,
    pub type_mismatch: usize,
    pub content_mismatch: usize,
    /// Records whose repair was applied
    pub repaired: usize,
    /// Records whose repair failed
    pub failed: usize,
    /// Records left as they were
    pub unrepaired: usize,
}

impl FsckCounts {
    pub fn total(&self) -> usize {
        self.file_missing + self.index_missing + self.type_mismatch + self.content_mismatch
    }

    fn record(&mut self, log: &FsckLog, applied: bool) {
        match log.kind() {
            DiscrepancyKind::FileMissing => self.file_missing += 1,
            DiscrepancyKind::IndexMissing => self.index_missing += 1,
            DiscrepancyKind::TypeMismatch => self.type_mismatch += 1,
            DiscrepancyKind::ContentMismatch => self.content_mismatch += 1,
        }
        if log.prune_error.is_some() {
            self.failed += 1;
        } else if applied && log.has_action() {
            self.repaired += 1;
        } else {
            self.unrepaired += 1;
        }
    }
}

/// Report from a check or repair run
#[derive(Debug, Serialize)]
pub struct FsckReport {
    pub status: FsckStatus,
    pub counts: FsckCounts,
    pub cancelled: bool,
    /// Records in discovery order
    pub logs: Vec<FsckLog>,
}

impl FsckReport {
    /// Summarize records. `applied` is whether repairs were written, i.e. a
    /// repair run outside dry-run.
    pub fn from_logs(logs: Vec<FsckLog>, applied: bool, cancelled: bool) -> Self {
        let mut counts = FsckCounts::default();
        for log in &logs {
            counts.record(log, applied);
        }

        let mut status = if counts.total() == 0 {
            FsckStatus::Healthy
        } else if counts.failed == 0 && counts.unrepaired == 0 {
            FsckStatus::Repaired
        } else {
            FsckStatus::Degraded
        };
        if cancelled {
            status = status.worst(FsckStatus::Cancelled);
        }

        Self {
            status,
            counts,
            cancelled,
            logs,
        }
    }

    /// Records whose repair failed.
    pub fn failures(&self) -> impl Iterator<Item = &FsckLog> {
        self.logs.iter().filter(|l| l.prune_error.is_some())
    }
}
