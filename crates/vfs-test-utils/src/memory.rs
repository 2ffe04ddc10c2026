//! [`TestVfs`] builder for in-memory scenarios.

use vfs_fs::constants::ROOT_DIR_ID;
use vfs_fs::{ContentStore, MemStore};
use vfs_index::{DirDoc, FileDoc, Indexer, MemoryIndex};

/// A [`MemStore`] and a [`MemoryIndex`] that start out in agreement.
///
/// The `both_*` methods keep the two sides in sync; the `*_only` methods
/// introduce drift on purpose.
///
/// # Example
///
/// ```rust
/// use vfs_test_utils::TestVfs;
///
/// let vfs = TestVfs::new();
/// vfs.both_dir("d1", vfs_fs::constants::ROOT_DIR_ID, "photos");
/// vfs.both_file("f1", "d1", "a.jpg", "a1b2");
/// vfs.store_only_file("f2", "d1", "b.jpg", "c3d4");
/// ```
#[derive(Debug, Default)]
pub struct TestVfs {
    pub store: MemStore,
    pub index: MemoryIndex,
}

impl TestVfs {
    /// Empty store and index, both holding only the root.
    pub fn new() -> Self {
        Self {
            store: MemStore::new(),
            index: MemoryIndex::new(),
        }
    }

    pub fn root_id(&self) -> &'static str {
        ROOT_DIR_ID
    }

    /// Directory present on both sides.
    pub fn both_dir(&self, id: &str, dir_id: &str, name: &str) {
        self.store_only_dir(id, dir_id, name);
        self.index_only_dir(id, dir_id, name);
    }

    /// File present on both sides with matching checksum.
    pub fn both_file(&self, id: &str, dir_id: &str, name: &str, checksum: &str) {
        self.store_only_file(id, dir_id, name, checksum);
        self.index_only_file(id, dir_id, name, checksum);
    }

    pub fn store_only_dir(&self, id: &str, dir_id: &str, name: &str) {
        self.store
            .mkdir(id, dir_id, name)
            .unwrap_or_else(|e| panic!("TestVfs: store mkdir {id}: {e}"));
    }

    pub fn store_only_file(&self, id: &str, dir_id: &str, name: &str, checksum: &str) {
        self.store
            .put_file_with_checksum(id, dir_id, name, checksum, checksum.len() as u64)
            .unwrap_or_else(|e| panic!("TestVfs: store put {id}: {e}"));
    }

    pub fn index_only_dir(&self, id: &str, dir_id: &str, name: &str) {
        let parent = self
            .index
            .dir_by_id(dir_id)
            .unwrap_or_else(|e| panic!("TestVfs: parent of {id}: {e}"));
        self.index
            .create_dir_doc(&DirDoc::new(id, &parent, name))
            .unwrap_or_else(|e| panic!("TestVfs: index dir {id}: {e}"));
    }

    pub fn index_only_file(&self, id: &str, dir_id: &str, name: &str, checksum: &str) {
        self.index
            .create_file_doc(&FileDoc::new(id, dir_id, name, checksum, checksum.len() as u64))
            .unwrap_or_else(|e| panic!("TestVfs: index file {id}: {e}"));
    }

    /// Change a file's stored checksum without touching the index.
    pub fn rewrite_in_store(&self, id: &str, checksum: &str) {
        self.store
            .set_checksum(id, checksum, checksum.len() as u64)
            .unwrap_or_else(|e| panic!("TestVfs: set checksum {id}: {e}"));
    }

    /// Remove a node (recursively) from the store only.
    pub fn remove_from_store(&self, id: &str) {
        self.store
            .remove(id)
            .unwrap_or_else(|e| panic!("TestVfs: remove {id}: {e}"));
    }

    /// Checksum the index holds for a file.
    pub fn indexed_checksum(&self, id: &str) -> String {
        let doc = self
            .index
            .doc_by_id(id)
            .unwrap_or_else(|e| panic!("TestVfs: doc {id}: {e}"));
        doc.as_file()
            .unwrap_or_else(|| panic!("TestVfs: {id} is not a file"))
            .checksum
            .clone()
    }

    /// Checksum the store computes for a file.
    pub fn stored_checksum(&self, id: &str) -> String {
        self.store
            .checksum(id)
            .unwrap_or_else(|e| panic!("TestVfs: checksum {id}: {e}"))
            .0
    }
}
