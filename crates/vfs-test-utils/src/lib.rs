//! Shared test fixtures for the vfsck workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`memory`]: [`TestVfs`], an in-memory store and index built side by side
//! - [`disk`]: [`TestTree`], a store directory and index file in a temp dir

pub mod disk;
pub mod memory;

pub use disk::TestTree;
pub use memory::TestVfs;
