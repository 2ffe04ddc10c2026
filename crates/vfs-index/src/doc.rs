//! Directory and file documents
//!
//! Documents are the index-side view of a node. A directory knows its full
//! path; a file only knows its parent and name, so its path is derived from
//! the parent directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vfs_fs::constants::ROOT_DIR_ID;
use vfs_fs::{LogicalPath, StoreNode};

/// A backlink from another document to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocReference {
    pub id: String,
    pub doctype: String,
}

/// Index record for a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirDoc {
    pub id: String,
    /// Parent directory id, empty only for the root
    pub dir_id: String,
    pub fullpath: LogicalPath,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DirDoc {
    /// The root directory document.
    pub fn root() -> Self {
        let now = Utc::now();
        Self {
            id: ROOT_DIR_ID.to_string(),
            dir_id: String::new(),
            fullpath: LogicalPath::root(),
            name: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// A new directory named `name` inside `parent`.
    pub fn new(id: impl Into<String>, parent: &DirDoc, name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            dir_id: parent.id.clone(),
            fullpath: parent.fullpath.join(name),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Synthesize a document from what the store shows.
    pub fn from_store_node(node: &StoreNode) -> Self {
        let at = node.modified.unwrap_or_else(Utc::now);
        Self {
            id: node.id.clone(),
            dir_id: node.dir_id.clone(),
            fullpath: node.path.clone(),
            name: node.name.clone(),
            created_at: at,
            updated_at: at,
        }
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_DIR_ID
    }
}

/// Index record for a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDoc {
    pub id: String,
    pub dir_id: String,
    pub name: String,
    /// Declared content checksum (`sha256:<hex>` for locally computed ones)
    pub checksum: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub trashed: bool,
    /// Kept last so TOML renders it after the plain values
    #[serde(default)]
    pub referenced_by: Vec<DocReference>,
}

impl FileDoc {
    pub fn new(
        id: impl Into<String>,
        dir_id: impl Into<String>,
        name: &str,
        checksum: impl Into<String>,
        size: u64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            dir_id: dir_id.into(),
            name: name.to_string(),
            checksum: checksum.into(),
            size,
            created_at: now,
            updated_at: now,
            trashed: false,
            referenced_by: Vec::new(),
        }
    }

    /// Synthesize a document from a store file and the checksum and size read
    /// together from its bytes.
    pub fn from_store_node(node: &StoreNode, checksum: impl Into<String>, size: u64) -> Self {
        let at = node.modified.unwrap_or_else(Utc::now);
        Self {
            id: node.id.clone(),
            dir_id: node.dir_id.clone(),
            name: node.name.clone(),
            checksum: checksum.into(),
            size,
            created_at: at,
            updated_at: at,
            trashed: false,
            referenced_by: Vec::new(),
        }
    }

    /// Copy of this document carrying new content metadata.
    pub fn with_content(&self, checksum: impl Into<String>, size: u64, at: DateTime<Utc>) -> Self {
        Self {
            checksum: checksum.into(),
            size,
            updated_at: at,
            ..self.clone()
        }
    }
}

/// Either kind of document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndexDoc {
    Directory(DirDoc),
    File(FileDoc),
}

impl IndexDoc {
    pub fn id(&self) -> &str {
        match self {
            Self::Directory(d) => &d.id,
            Self::File(f) => &f.id,
        }
    }

    pub fn dir_id(&self) -> &str {
        match self {
            Self::Directory(d) => &d.dir_id,
            Self::File(f) => &f.dir_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Directory(d) => &d.name,
            Self::File(f) => &f.name,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub fn as_dir(&self) -> Option<&DirDoc> {
        match self {
            Self::Directory(d) => Some(d),
            Self::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileDoc> {
        match self {
            Self::File(f) => Some(f),
            Self::Directory(_) => None,
        }
    }
}

impl From<DirDoc> for IndexDoc {
    fn from(doc: DirDoc) -> Self {
        Self::Directory(doc)
    }
}

impl From<FileDoc> for IndexDoc {
    fn from(doc: FileDoc) -> Self {
        Self::File(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vfs_fs::NodeKind;

    #[test]
    fn child_dir_path_extends_parent() {
        let root = DirDoc::root();
        let photos = DirDoc::new("d1", &root, "photos");
        let trip = DirDoc::new("d2", &photos, "trip");
        assert_eq!(photos.fullpath.as_str(), "/photos");
        assert_eq!(trip.fullpath.as_str(), "/photos/trip");
        assert_eq!(trip.dir_id, "d1");
    }

    #[test]
    fn synthesized_file_copies_store_view() {
        let node = StoreNode {
            id: "/a/b.txt".into(),
            dir_id: "/a".into(),
            name: "b.txt".into(),
            path: LogicalPath::new("/a/b.txt"),
            kind: NodeKind::File { size: 42 },
            modified: None,
        };
        let doc = FileDoc::from_store_node(&node, "sha256:abc", 43);
        assert_eq!(doc.id, "/a/b.txt");
        assert_eq!(doc.dir_id, "/a");
        assert_eq!(doc.size, 43);
        assert_eq!(doc.checksum, "sha256:abc");
        assert!(!doc.trashed);
    }

    #[test]
    fn with_content_keeps_identity() {
        let doc = FileDoc::new("doc1", ROOT_DIR_ID, "a", "a1b2", 4);
        let at = Utc::now();
        let updated = doc.with_content("c3d4", 8, at);
        assert_eq!(updated.id, doc.id);
        assert_eq!(updated.created_at, doc.created_at);
        assert_eq!(updated.checksum, "c3d4");
        assert_eq!(updated.size, 8);
    }

    #[test]
    fn index_doc_serializes_with_type_tag() {
        let doc: IndexDoc = FileDoc::new("f", ROOT_DIR_ID, "a", "x", 1).into();
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["type"], "file");
        assert_eq!(json["id"], "f");
    }
}
