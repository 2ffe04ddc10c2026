//! Discrepancy records
//!
//! An [`FsckLog`] is created by the scanner, optionally mutated once by the
//! repair engine, and then reported. It is never persisted.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use vfs_fs::{LogicalPath, StoreNode};
use vfs_index::{FileDoc, IndexDoc};

/// The four ways the index and the store can disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    /// The index has a document and the store has nothing under its id
    FileMissing { doc: IndexDoc },
    /// The store has a node and the index has no document for it. The
    /// document is synthesized from the store observation.
    IndexMissing { doc: IndexDoc },
    /// Both sides know the id but disagree on file versus directory
    TypeMismatch {
        index_doc: IndexDoc,
        store_node: StoreNode,
    },
    /// Both sides have a file and the checksums differ. `new` is `old` with
    /// the store's content metadata.
    ContentMismatch { old: FileDoc, new: FileDoc },
}

/// Fieldless discriminant of [`Discrepancy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    FileMissing,
    IndexMissing,
    TypeMismatch,
    ContentMismatch,
}

impl fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FileMissing => "file missing",
            Self::IndexMissing => "index missing",
            Self::TypeMismatch => "type mismatch",
            Self::ContentMismatch => "content mismatch",
        };
        f.write_str(s)
    }
}

impl Discrepancy {
    pub fn kind(&self) -> DiscrepancyKind {
        match self {
            Self::FileMissing { .. } => DiscrepancyKind::FileMissing,
            Self::IndexMissing { .. } => DiscrepancyKind::IndexMissing,
            Self::TypeMismatch { .. } => DiscrepancyKind::TypeMismatch,
            Self::ContentMismatch { .. } => DiscrepancyKind::ContentMismatch,
        }
    }

    /// Whether the node is a file, as far as the index side believes.
    pub fn is_file(&self) -> bool {
        match self {
            Self::FileMissing { doc } | Self::IndexMissing { doc } => doc.is_file(),
            Self::TypeMismatch { index_doc, .. } => index_doc.is_file(),
            Self::ContentMismatch { .. } => true,
        }
    }

    /// Identifier shared by both stores.
    pub fn file_id(&self) -> &str {
        match self {
            Self::FileMissing { doc } | Self::IndexMissing { doc } => doc.id(),
            Self::TypeMismatch { index_doc, .. } => index_doc.id(),
            Self::ContentMismatch { new, .. } => &new.id,
        }
    }

    /// Fixed human-readable description.
    pub fn message(&self) -> &'static str {
        match (self.kind(), self.is_file()) {
            (DiscrepancyKind::FileMissing, true) => {
                "the file is present in the index but not on the filesystem"
            }
            (DiscrepancyKind::FileMissing, false) => {
                "the directory is present in the index but not on the filesystem"
            }
            (DiscrepancyKind::TypeMismatch, true) => {
                "it's a file in the index but a directory on the filesystem"
            }
            (DiscrepancyKind::TypeMismatch, false) => {
                "it's a directory in the index but a file on the filesystem"
            }
            (DiscrepancyKind::IndexMissing, _) => {
                "the document is present on the local filesystem but not in the index"
            }
            (DiscrepancyKind::ContentMismatch, _) => {
                "the document content does not match the store content checksum"
            }
        }
    }
}

/// One discrepancy and what repair made of it.
#[derive(Debug)]
pub struct FsckLog {
    pub discrepancy: Discrepancy,
    /// Logical path of the node, for display
    pub filename: LogicalPath,
    /// Repair attempted, empty when none
    pub prune_action: String,
    /// Why the repair failed
    pub prune_error: Option<vfs_index::Error>,
}

impl FsckLog {
    pub fn new(discrepancy: Discrepancy, filename: LogicalPath) -> Self {
        Self {
            discrepancy,
            filename,
            prune_action: String::new(),
            prune_error: None,
        }
    }

    pub fn kind(&self) -> DiscrepancyKind {
        self.discrepancy.kind()
    }

    pub fn is_file(&self) -> bool {
        self.discrepancy.is_file()
    }

    pub fn file_id(&self) -> &str {
        self.discrepancy.file_id()
    }

    pub fn message(&self) -> &'static str {
        self.discrepancy.message()
    }

    pub fn has_action(&self) -> bool {
        !self.prune_action.is_empty()
    }
}

impl fmt::Display for FsckLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Renders as `{filename, message, file_id}` plus `prune_action` when a
/// repair was attempted and `prune_error` when one failed.
impl Serialize for FsckLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 3 + usize::from(self.has_action()) + usize::from(self.prune_error.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("filename", self.filename.as_str())?;
        map.serialize_entry("message", self.message())?;
        map.serialize_entry("file_id", self.file_id())?;
        if self.has_action() {
            map.serialize_entry("prune_action", &self.prune_action)?;
        }
        if let Some(err) = &self.prune_error {
            map.serialize_entry("prune_error", &err.to_string())?;
        }
        map.end()
    }
}
