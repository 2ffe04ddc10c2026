//! The document table shared by every index backend
//!
//! [`IndexData`] holds the actual rules: identifier uniqueness, sibling name
//! uniqueness, parent existence and old-value checks. Backends only decide
//! where the table lives and how mutations are made atomic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vfs_fs::LogicalPath;
use vfs_fs::constants::ROOT_DIR_ID;

use crate::{DirDoc, Error, FileDoc, IndexDoc, Result};

/// Current on-disk format version.
pub const INDEX_FORMAT_VERSION: &str = "1.0";

/// All documents of one index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexData {
    /// Format version for forward compatibility
    pub version: String,
    /// Directory documents by id
    #[serde(default)]
    pub dirs: BTreeMap<String, DirDoc>,
    /// File documents by id
    #[serde(default)]
    pub files: BTreeMap<String, FileDoc>,
}

impl Default for IndexData {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexData {
    /// An index holding only the root directory.
    pub fn new() -> Self {
        let root = DirDoc::root();
        let mut dirs = BTreeMap::new();
        dirs.insert(root.id.clone(), root);
        Self {
            version: INDEX_FORMAT_VERSION.to_string(),
            dirs,
            files: BTreeMap::new(),
        }
    }

    /// Check the structural requirements of a freshly loaded table.
    pub fn validate(&self) -> Result<()> {
        let root = self
            .dirs
            .get(ROOT_DIR_ID)
            .ok_or_else(|| Error::InvalidDoc {
                id: ROOT_DIR_ID.to_string(),
                reason: "index has no root directory".into(),
            })?;
        if !root.fullpath.is_root() {
            return Err(Error::InvalidDoc {
                id: ROOT_DIR_ID.to_string(),
                reason: format!("root directory has path {}", root.fullpath),
            });
        }
        if let Some(id) = self.dirs.keys().find(|id| self.files.contains_key(*id)) {
            return Err(Error::InvalidDoc {
                id: id.clone(),
                reason: "identifier used by both a directory and a file".into(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.dirs.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dir_by_id(&self, id: &str) -> Result<DirDoc> {
        self.dirs
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("directory {id}")))
    }

    pub fn dir_by_path(&self, path: &LogicalPath) -> Result<DirDoc> {
        self.dirs
            .values()
            .find(|d| &d.fullpath == path)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("directory at {path}")))
    }

    pub fn file_by_path(&self, path: &LogicalPath) -> Result<FileDoc> {
        let missing = || Error::not_found(format!("file at {path}"));
        let parent_path = path.parent().ok_or_else(missing)?;
        let parent = self.dir_by_path(&parent_path).map_err(|_| missing())?;
        self.files
            .values()
            .find(|f| f.dir_id == parent.id && f.name == path.name())
            .cloned()
            .ok_or_else(missing)
    }

    pub fn doc_by_id(&self, id: &str) -> Result<IndexDoc> {
        if let Some(dir) = self.dirs.get(id) {
            return Ok(dir.clone().into());
        }
        self.files
            .get(id)
            .map(|f| f.clone().into())
            .ok_or_else(|| Error::not_found(format!("document {id}")))
    }

    /// Direct children of a directory, ordered by name then id.
    pub fn children(&self, dir_id: &str) -> Result<Vec<IndexDoc>> {
        if !self.dirs.contains_key(dir_id) {
            return Err(Error::not_found(format!("directory {dir_id}")));
        }
        let mut children: Vec<IndexDoc> = self
            .dirs
            .values()
            .filter(|d| d.dir_id == dir_id && d.id != dir_id)
            .map(|d| d.clone().into())
            .chain(
                self.files
                    .values()
                    .filter(|f| f.dir_id == dir_id)
                    .map(|f| f.clone().into()),
            )
            .collect();
        children.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(b.id())));
        Ok(children)
    }

    /// Every document, ordered by id.
    pub fn all_docs(&self) -> Vec<IndexDoc> {
        let mut docs: Vec<IndexDoc> = self
            .dirs
            .values()
            .map(|d| d.clone().into())
            .chain(self.files.values().map(|f| f.clone().into()))
            .collect();
        docs.sort_by(|a, b| a.id().cmp(b.id()));
        docs
    }

    pub fn create_dir_doc(&mut self, doc: &DirDoc) -> Result<()> {
        self.ensure_id_free(&doc.id)?;
        let parent = self.parent_of(&doc.dir_id)?;
        let expected = parent.fullpath.join(&doc.name);
        if doc.fullpath != expected {
            return Err(Error::InvalidDoc {
                id: doc.id.clone(),
                reason: format!("path {} does not match parent path {expected}", doc.fullpath),
            });
        }
        self.ensure_name_free(&doc.dir_id, &doc.name, &expected)?;
        self.dirs.insert(doc.id.clone(), doc.clone());
        Ok(())
    }

    pub fn create_file_doc(&mut self, doc: &FileDoc) -> Result<()> {
        self.ensure_id_free(&doc.id)?;
        let parent = self.parent_of(&doc.dir_id)?;
        let path = parent.fullpath.join(&doc.name);
        self.ensure_name_free(&doc.dir_id, &doc.name, &path)?;
        self.files.insert(doc.id.clone(), doc.clone());
        Ok(())
    }

    /// Replace `old` with `new`, failing with [`Error::Conflict`] when the
    /// stored document is no longer `old`.
    pub fn update_file_doc(&mut self, old: &FileDoc, new: &FileDoc) -> Result<()> {
        if old.id != new.id {
            return Err(Error::InvalidDoc {
                id: new.id.clone(),
                reason: format!("update cannot change the identifier from {}", old.id),
            });
        }
        self.check_current_file(old)?;
        if new.dir_id != old.dir_id || new.name != old.name {
            let parent = self.parent_of(&new.dir_id)?;
            let path = parent.fullpath.join(&new.name);
            self.ensure_name_free(&new.dir_id, &new.name, &path)?;
        }
        self.files.insert(new.id.clone(), new.clone());
        Ok(())
    }

    pub fn delete_file_doc(&mut self, doc: &FileDoc) -> Result<()> {
        self.check_current_file(doc)?;
        self.files.remove(&doc.id);
        Ok(())
    }

    /// Remove a directory document. Children are left in place.
    pub fn delete_dir_doc(&mut self, doc: &DirDoc) -> Result<()> {
        if doc.id == ROOT_DIR_ID {
            return Err(Error::InvalidDoc {
                id: doc.id.clone(),
                reason: "the root directory cannot be deleted".into(),
            });
        }
        let current = self
            .dirs
            .get(&doc.id)
            .ok_or_else(|| Error::not_found(format!("directory {}", doc.id)))?;
        if current != doc {
            return Err(Error::Conflict { id: doc.id.clone() });
        }
        self.dirs.remove(&doc.id);
        Ok(())
    }

    fn check_current_file(&self, expected: &FileDoc) -> Result<()> {
        let current = self
            .files
            .get(&expected.id)
            .ok_or_else(|| Error::not_found(format!("file {}", expected.id)))?;
        if current != expected {
            return Err(Error::Conflict {
                id: expected.id.clone(),
            });
        }
        Ok(())
    }

    fn ensure_id_free(&self, id: &str) -> Result<()> {
        if self.dirs.contains_key(id) || self.files.contains_key(id) {
            return Err(Error::AlreadyExists {
                what: format!("document {id}"),
            });
        }
        Ok(())
    }

    fn parent_of(&self, dir_id: &str) -> Result<&DirDoc> {
        self.dirs.get(dir_id).ok_or_else(|| Error::MissingParent {
            dir_id: dir_id.to_string(),
        })
    }

    fn ensure_name_free(&self, dir_id: &str, name: &str, path: &LogicalPath) -> Result<()> {
        let taken = self
            .dirs
            .values()
            .any(|d| d.dir_id == dir_id && d.name == name && d.id != ROOT_DIR_ID)
            || self
                .files
                .values()
                .any(|f| f.dir_id == dir_id && f.name == name);
        if taken {
            return Err(Error::AlreadyExists {
                what: format!("entry at {path}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn with_photos() -> (IndexData, DirDoc) {
        let mut data = IndexData::new();
        let photos = DirDoc::new("d-photos", &DirDoc::root(), "photos");
        data.create_dir_doc(&photos).unwrap();
        (data, photos)
    }

    #[test]
    fn new_index_has_only_root() {
        let data = IndexData::new();
        assert_eq!(data.len(), 1);
        assert!(data.dir_by_id(ROOT_DIR_ID).unwrap().is_root());
        assert!(data.validate().is_ok());
    }

    #[test]
    fn file_lookup_by_path_goes_through_parent() {
        let (mut data, photos) = with_photos();
        let file = FileDoc::new("f1", &photos.id, "a.jpg", "sha256:1", 1);
        data.create_file_doc(&file).unwrap();

        let found = data.file_by_path(&LogicalPath::new("/photos/a.jpg")).unwrap();
        assert_eq!(found, file);
        assert!(
            data.file_by_path(&LogicalPath::new("/other/a.jpg"))
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn create_rejects_duplicate_sibling_name() {
        let (mut data, photos) = with_photos();
        data.create_file_doc(&FileDoc::new("f1", &photos.id, "a.jpg", "x", 1))
            .unwrap();
        let err = data
            .create_file_doc(&FileDoc::new("f2", &photos.id, "a.jpg", "y", 1))
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { .. }));
    }

    #[test]
    fn create_rejects_missing_parent() {
        let mut data = IndexData::new();
        let err = data
            .create_file_doc(&FileDoc::new("f1", "nowhere", "a", "x", 1))
            .unwrap_err();
        assert!(matches!(err, Error::MissingParent { .. }));
    }

    #[test]
    fn create_dir_rejects_inconsistent_path() {
        let mut data = IndexData::new();
        let mut dir = DirDoc::new("d1", &DirDoc::root(), "a");
        dir.fullpath = LogicalPath::new("/b");
        assert!(matches!(
            data.create_dir_doc(&dir).unwrap_err(),
            Error::InvalidDoc { .. }
        ));
    }

    #[test]
    fn update_requires_current_revision() {
        let mut data = IndexData::new();
        let old = FileDoc::new("doc1", ROOT_DIR_ID, "a", "a1b2", 4);
        data.create_file_doc(&old).unwrap();

        let stale = old.with_content("ffff", 4, old.updated_at);
        let new = old.with_content("c3d4", 4, old.updated_at);
        assert!(matches!(
            data.update_file_doc(&stale, &new).unwrap_err(),
            Error::Conflict { .. }
        ));

        data.update_file_doc(&old, &new).unwrap();
        assert_eq!(data.files["doc1"].checksum, "c3d4");
    }

    #[test]
    fn delete_dir_leaves_children() {
        let (mut data, photos) = with_photos();
        data.create_file_doc(&FileDoc::new("f1", &photos.id, "a.jpg", "x", 1))
            .unwrap();
        data.delete_dir_doc(&photos).unwrap();
        assert!(data.dir_by_id(&photos.id).unwrap_err().is_not_found());
        assert_eq!(data.files["f1"].dir_id, photos.id);
    }

    #[test]
    fn root_cannot_be_deleted() {
        let mut data = IndexData::new();
        let root = data.dir_by_id(ROOT_DIR_ID).unwrap();
        assert!(data.delete_dir_doc(&root).is_err());
    }

    #[test]
    fn children_are_sorted_by_name() {
        let (mut data, _) = with_photos();
        data.create_file_doc(&FileDoc::new("f-z", ROOT_DIR_ID, "zeta", "x", 1))
            .unwrap();
        data.create_file_doc(&FileDoc::new("f-a", ROOT_DIR_ID, "alpha", "x", 1))
            .unwrap();
        let names: Vec<_> = data
            .children(ROOT_DIR_ID)
            .unwrap()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "photos", "zeta"]);
    }

    #[test]
    fn validate_rejects_missing_root() {
        let mut data = IndexData::new();
        data.dirs.clear();
        assert!(data.validate().is_err());
    }
}
