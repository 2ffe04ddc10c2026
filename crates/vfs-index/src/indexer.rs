//! The index contract consumed by the checker

use tracing::debug;
use uuid::Uuid;
use vfs_fs::LogicalPath;

use crate::{DirDoc, Error, FileDoc, IndexData, IndexDoc, Result};

/// Read and compare-and-swap write access to the metadata index.
///
/// Lookups that miss return [`Error::NotFound`]. Updates and deletes take
/// the document the caller believes is current and fail with
/// [`Error::Conflict`] when it is not.
pub trait Indexer: Send + Sync {
    fn dir_by_id(&self, id: &str) -> Result<DirDoc>;

    fn dir_by_path(&self, path: &LogicalPath) -> Result<DirDoc>;

    fn file_by_path(&self, path: &LogicalPath) -> Result<FileDoc>;

    /// Either kind of document by identifier.
    fn doc_by_id(&self, id: &str) -> Result<IndexDoc>;

    /// The whole table as of one read.
    ///
    /// Whole-tree readers such as the checker take one snapshot instead of a
    /// lookup per node, which for [`FileIndex`](crate::FileIndex) would parse
    /// the document again every time.
    fn snapshot(&self) -> Result<IndexData>;

    fn create_dir_doc(&self, doc: &DirDoc) -> Result<()>;

    fn create_file_doc(&self, doc: &FileDoc) -> Result<()>;

    fn update_file_doc(&self, old: &FileDoc, new: &FileDoc) -> Result<()>;

    fn delete_file_doc(&self, doc: &FileDoc) -> Result<()>;

    /// Not recursive.
    fn delete_dir_doc(&self, doc: &DirDoc) -> Result<()>;

    /// Return the directory at `path`, creating it and any missing ancestors.
    ///
    /// Losing a creation race to another writer is not an error: the winner's
    /// document is re-read and returned.
    fn ensure_dir(&self, path: &LogicalPath) -> Result<DirDoc> {
        match self.dir_by_path(path) {
            Ok(dir) => return Ok(dir),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let Some(parent_path) = path.parent() else {
            return Err(Error::not_found("root directory"));
        };
        let parent = self.ensure_dir(&parent_path)?;
        let doc = DirDoc::new(Uuid::new_v4().to_string(), &parent, path.name());

        match self.create_dir_doc(&doc) {
            Ok(()) => {
                debug!(path = %path, id = %doc.id, "Created directory document");
                Ok(doc)
            }
            Err(Error::AlreadyExists { .. }) => {
                debug!(path = %path, "Directory created concurrently, re-reading");
                self.dir_by_path(path)
            }
            Err(e) => Err(e),
        }
    }
}
