//! Content store abstraction for vfsck
//!
//! The content store holds the actual bytes of the virtual filesystem and is
//! always treated as ground truth by the checker. This crate also carries the
//! small filesystem helpers shared by the rest of the workspace: logical
//! paths, checksums, atomic writes and format-agnostic config loading.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;
pub mod store;

pub use config::ConfigStore;
pub use constants::WellKnownDir;
pub use error::{Error, Result};
pub use path::LogicalPath;
pub use store::{ContentStore, LocalStore, MemStore, NodeKind, StoreNode, WalkControl};
