//! [`TestTree`] for scenarios backed by real files.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vfs_fs::LocalStore;
use vfs_index::{FileIndex, build_index_from_store};

/// A temp directory holding a `data/` store root and an index file next to
/// it, outside the store.
pub struct TestTree {
    temp_dir: TempDir,
    index_name: String,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Empty store with a JSON index path (not yet created).
    pub fn new() -> Self {
        Self::with_index_name("index.json")
    }

    /// Empty store; the index file name picks its format.
    pub fn with_index_name(name: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("data")).unwrap();
        Self {
            temp_dir,
            index_name: name.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn store_root(&self) -> PathBuf {
        self.root().join("data")
    }

    pub fn index_path(&self) -> PathBuf {
        self.root().join(&self.index_name)
    }

    /// Write a file under the store root, creating parents.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.store_root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("TestTree: write {}: {e}", path.display()));
    }

    pub fn mkdir(&self, rel: &str) {
        fs::create_dir_all(self.store_root().join(rel)).unwrap();
    }

    /// Remove a file or directory tree from the store.
    pub fn remove(&self, rel: &str) {
        let path = self.store_root().join(rel);
        if path.is_dir() {
            fs::remove_dir_all(&path).unwrap();
        } else {
            fs::remove_file(&path).unwrap();
        }
    }

    pub fn store(&self) -> LocalStore {
        LocalStore::open(self.store_root()).unwrap()
    }

    /// Create the index file from the current store contents.
    pub fn seed_index(&self) -> FileIndex {
        let index = FileIndex::create(self.index_path()).unwrap();
        build_index_from_store(&index, &self.store()).unwrap();
        index
    }

    /// Create an index holding only the root.
    pub fn empty_index(&self) -> FileIndex {
        FileIndex::create(self.index_path()).unwrap()
    }

    pub fn open_index(&self) -> FileIndex {
        FileIndex::open(self.index_path()).unwrap()
    }
}
