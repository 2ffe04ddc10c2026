//! Consistency checking and repair for the virtual filesystem
//!
//! This crate sits above the content store and the metadata index and
//! reconciles the two:
//!
//! - **Scanner**: walks both sides and yields every discrepancy, in order
//! - **Records**: [`FsckLog`] describes one discrepancy and its repair outcome
//! - **Repair**: [`prune`] applies the repair policy to one record
//! - **Runner**: [`Fsck`] ties scan and repair together into a [`FsckReport`]
//!
//! The content store is ground truth. Only the index is ever mutated.
//!
//! ```text
//!                 CLI
//!                  |
//!              vfs-core
//!               /     \
//!          vfs-fs   vfs-index
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod fsck;

pub use cancel::CancellationToken;
pub use config::FsckConfig;
pub use error::{Error, Result};
pub use fsck::{
    Discrepancy, DiscrepancyKind, Fsck, FsckCounts, FsckLog, FsckOptions, FsckReport, FsckStatus,
    Scanner, prune, scan,
};
