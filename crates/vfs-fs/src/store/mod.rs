//! Content store abstraction
//!
//! The content store is the physical side of the virtual filesystem. It is
//! addressed by the same identifiers as the metadata index and is never
//! mutated by the checker.

mod local;
mod memory;

pub use local::LocalStore;
pub use memory::MemStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::ROOT_DIR_ID;
use crate::{LogicalPath, Result};

/// What the store holds for a given identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Regular file with its byte length
    File { size: u64 },
    /// Directory
    Directory,
}

/// A node observed on the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreNode {
    /// Identifier shared with the index
    pub id: String,
    /// Identifier of the parent directory, empty for the root
    pub dir_id: String,
    /// Last path component
    pub name: String,
    /// Full logical path
    pub path: LogicalPath,
    /// File or directory
    pub kind: NodeKind,
    /// Last modification time, when the backend tracks one
    pub modified: Option<DateTime<Utc>>,
}

impl StoreNode {
    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory)
    }

    /// Byte length for files, zero for directories.
    pub fn size(&self) -> u64 {
        match self.kind {
            NodeKind::File { size } => size,
            NodeKind::Directory => 0,
        }
    }
}

/// Decision returned by a [`ContentStore::walk`] visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    /// Keep going, descending into the node if it is a directory
    Continue,
    /// Do not descend into this directory
    SkipSubtree,
    /// Abort the walk
    Stop,
}

/// Read access to the physical bytes of the virtual filesystem.
///
/// Implementations must be stable: two walks over an unchanged store visit
/// the same nodes in the same order.
pub trait ContentStore: Send + Sync {
    /// Observe a node: `None` when nothing is stored under `id`.
    fn stat(&self, id: &str) -> Result<Option<StoreNode>>;

    /// Direct children of a directory, ordered by name.
    fn children(&self, dir_id: &str) -> Result<Vec<StoreNode>>;

    /// Checksum of a file's current bytes and the byte count it covers.
    ///
    /// Both come from the same read, so they agree even when the file
    /// changes after a [`stat`](Self::stat).
    fn checksum(&self, id: &str) -> Result<(String, u64)>;

    /// Pre-order walk of the whole tree below the root, children ordered by
    /// name. The root itself is not visited.
    fn walk(&self, visit: &mut dyn FnMut(&StoreNode) -> WalkControl) -> Result<()> {
        let mut stack: Vec<StoreNode> = self.children(ROOT_DIR_ID)?.into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            match visit(&node) {
                WalkControl::Stop => return Ok(()),
                WalkControl::SkipSubtree => continue,
                WalkControl::Continue => {
                    if node.is_dir() {
                        stack.extend(self.children(&node.id)?.into_iter().rev());
                    }
                }
            }
        }
        Ok(())
    }
}
