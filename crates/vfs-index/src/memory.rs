//! In-process index backend

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use vfs_fs::LogicalPath;

use crate::{DirDoc, FileDoc, IndexData, IndexDoc, Indexer, Result};

/// An [`Indexer`] over an in-memory [`IndexData`].
///
/// Each mutation runs under the write lock, so checks and writes are atomic
/// with respect to other threads.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    data: RwLock<IndexData>,
}

impl MemoryIndex {
    /// An index holding only the root directory.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: IndexData) -> Result<Self> {
        data.validate()?;
        Ok(Self {
            data: RwLock::new(data),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexData> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexData> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Indexer for MemoryIndex {
    fn dir_by_id(&self, id: &str) -> Result<DirDoc> {
        self.read().dir_by_id(id)
    }

    fn dir_by_path(&self, path: &LogicalPath) -> Result<DirDoc> {
        self.read().dir_by_path(path)
    }

    fn file_by_path(&self, path: &LogicalPath) -> Result<FileDoc> {
        self.read().file_by_path(path)
    }

    fn doc_by_id(&self, id: &str) -> Result<IndexDoc> {
        self.read().doc_by_id(id)
    }

    fn snapshot(&self) -> Result<IndexData> {
        Ok(self.read().clone())
    }

    fn create_dir_doc(&self, doc: &DirDoc) -> Result<()> {
        self.write().create_dir_doc(doc)
    }

    fn create_file_doc(&self, doc: &FileDoc) -> Result<()> {
        self.write().create_file_doc(doc)
    }

    fn update_file_doc(&self, old: &FileDoc, new: &FileDoc) -> Result<()> {
        self.write().update_file_doc(old, new)
    }

    fn delete_file_doc(&self, doc: &FileDoc) -> Result<()> {
        self.write().delete_file_doc(doc)
    }

    fn delete_dir_doc(&self, doc: &DirDoc) -> Result<()> {
        self.write().delete_dir_doc(doc)
    }
}
