//! On-disk index backend
//!
//! The whole table is one JSON, TOML or YAML document (format chosen by
//! extension). Readers hold a shared lock while loading. Writers hold an
//! exclusive lock across load, mutate and atomic replace, so every mutation
//! is one commit and concurrent writers never lose each other's changes.

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use vfs_fs::io::LockGuard;
use vfs_fs::{ConfigStore, LogicalPath};

use crate::{DirDoc, Error, FileDoc, IndexData, IndexDoc, Indexer, Result};

/// An [`Indexer`] persisted to a single file.
#[derive(Debug, Clone)]
pub struct FileIndex {
    path: PathBuf,
    store: ConfigStore,
}

impl FileIndex {
    /// Create a new index file holding only the root directory.
    ///
    /// Fails with [`Error::AlreadyExists`] if the file is already there.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        Self::create_with(path, IndexData::new())
    }

    /// Create a new index file with the given contents.
    pub fn create_with(path: impl Into<PathBuf>, data: IndexData) -> Result<Self> {
        let index = Self {
            path: path.into(),
            store: ConfigStore::new(),
        };
        data.validate()?;

        let _lock = LockGuard::exclusive(&index.path)?;
        if index.path.exists() {
            return Err(Error::AlreadyExists {
                what: format!("index file {}", index.path.display()),
            });
        }
        index.store.save(&index.path, &data)?;
        info!(path = %index.path.display(), docs = data.len(), "Created index file");
        Ok(index)
    }

    /// Open an existing index file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let index = Self {
            path: path.into(),
            store: ConfigStore::new(),
        };
        if !index.path.is_file() {
            return Err(Error::not_found(format!(
                "index file {}",
                index.path.display()
            )));
        }
        index.load()?.validate()?;
        Ok(index)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the current table under a shared lock.
    pub fn load(&self) -> Result<IndexData> {
        let _lock = LockGuard::shared(&self.path)?;
        Ok(self.store.load(&self.path)?)
    }

    fn read<T>(&self, f: impl FnOnce(&IndexData) -> Result<T>) -> Result<T> {
        let data = self.load()?;
        f(&data)
    }

    fn mutate(&self, f: impl FnOnce(&mut IndexData) -> Result<()>) -> Result<()> {
        let _lock = LockGuard::exclusive(&self.path)?;
        let mut data: IndexData = self.store.load(&self.path)?;
        f(&mut data)?;
        self.store.save(&self.path, &data)?;
        debug!(path = %self.path.display(), docs = data.len(), "Committed index mutation");
        Ok(())
    }
}

impl Indexer for FileIndex {
    fn dir_by_id(&self, id: &str) -> Result<DirDoc> {
        self.read(|d| d.dir_by_id(id))
    }

    fn dir_by_path(&self, path: &LogicalPath) -> Result<DirDoc> {
        self.read(|d| d.dir_by_path(path))
    }

    fn file_by_path(&self, path: &LogicalPath) -> Result<FileDoc> {
        self.read(|d| d.file_by_path(path))
    }

    fn doc_by_id(&self, id: &str) -> Result<IndexDoc> {
        self.read(|d| d.doc_by_id(id))
    }

    fn snapshot(&self) -> Result<IndexData> {
        self.load()
    }

    fn create_dir_doc(&self, doc: &DirDoc) -> Result<()> {
        self.mutate(|d| d.create_dir_doc(doc))
    }

    fn create_file_doc(&self, doc: &FileDoc) -> Result<()> {
        self.mutate(|d| d.create_file_doc(doc))
    }

    fn update_file_doc(&self, old: &FileDoc, new: &FileDoc) -> Result<()> {
        self.mutate(|d| d.update_file_doc(old, new))
    }

    fn delete_file_doc(&self, doc: &FileDoc) -> Result<()> {
        self.mutate(|d| d.delete_file_doc(doc))
    }

    fn delete_dir_doc(&self, doc: &DirDoc) -> Result<()> {
        self.mutate(|d| d.delete_dir_doc(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use vfs_fs::constants::ROOT_DIR_ID;

    #[test]
    fn create_refuses_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.json");
        FileIndex::create(&path).unwrap();
        assert!(matches!(
            FileIndex::create(&path).unwrap_err(),
            Error::AlreadyExists { .. }
        ));
    }

    #[test]
    fn open_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = FileIndex::open(dir.path().join("absent.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn failed_mutation_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.toml");
        let index = FileIndex::create(&path).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = index
            .create_file_doc(&FileDoc::new("f", "nowhere", "a", "x", 1))
            .unwrap_err();
        assert!(matches!(err, Error::MissingParent { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn mutations_persist_across_handles() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.json");
        let writer = FileIndex::create(&path).unwrap();
        writer
            .create_file_doc(&FileDoc::new("doc1", ROOT_DIR_ID, "a", "a1b2", 4))
            .unwrap();

        let reader = FileIndex::open(&path).unwrap();
        let doc = reader.doc_by_id("doc1").unwrap();
        assert_eq!(doc.as_file().unwrap().checksum, "a1b2");
    }

    #[test]
    fn snapshot_reads_the_committed_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.toml");
        let index = FileIndex::create(&path).unwrap();
        index
            .create_file_doc(&FileDoc::new("doc1", ROOT_DIR_ID, "a", "a1b2", 4))
            .unwrap();

        let snapshot = index.snapshot().unwrap();
        assert_eq!(snapshot, index.load().unwrap());
        assert_eq!(snapshot.files.len(), 1);
    }
}
