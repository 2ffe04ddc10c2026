//! Metadata index for the virtual filesystem
//!
//! The index holds one document per directory and per file: identity,
//! hierarchy, declared checksum and size. It is kept separately from the
//! bytes, which is why it can drift from the content store.
//!
//! Two backends implement [`Indexer`]:
//!
//! - [`MemoryIndex`]: in-process, for tests and embedding
//! - [`FileIndex`]: a JSON/TOML document on disk, one locked atomic
//!   replace per mutation
//!
//! Every mutation that replaces or removes a document is old-value checked
//! and fails with [`Error::Conflict`] instead of overwriting a concurrent
//! change.

pub mod data;
pub mod doc;
pub mod error;
pub mod file;
pub mod indexer;
pub mod memory;
pub mod seed;

pub use data::IndexData;
pub use doc::{DirDoc, DocReference, FileDoc, IndexDoc};
pub use error::{Error, Result};
pub use file::FileIndex;
pub use indexer::Indexer;
pub use memory::MemoryIndex;
pub use seed::{SeedReport, build_index_from_store};
