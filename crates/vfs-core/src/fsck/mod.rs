//! Reconciliation of the metadata index against the content store

mod engine;
mod log;
mod prune;
mod report;
mod scanner;

pub use engine::{Fsck, FsckOptions};
pub use log::{Discrepancy, DiscrepancyKind, FsckLog};
pub use prune::{
    ACTION_CREATE_IN_PLACE, ACTION_CREATE_ORPHAN, ACTION_REMOVE_ENTRY, ACTION_UPDATE_CONTENT,
    prune,
};
pub use report::{FsckCounts, FsckReport, FsckStatus};
pub use scanner::{Scanner, scan};
