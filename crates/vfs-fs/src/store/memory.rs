//! In-memory content store.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::{ContentStore, NodeKind, StoreNode};
use crate::checksum::compute_bytes_checksum;
use crate::constants::ROOT_DIR_ID;
use crate::{Error, LogicalPath, Result};

#[derive(Debug, Clone)]
enum MemKind {
    File { checksum: String, size: u64 },
    Directory,
}

#[derive(Debug, Clone)]
struct MemNode {
    dir_id: String,
    name: String,
    kind: MemKind,
}

/// Identifier-addressed store backed by a `RwLock<HashMap>`.
///
/// Used by tests and simulations to put the store into states that are
/// awkward to produce on a real disk (explicit checksums, type flips).
/// The tree is kept well-formed: every node except the root has an existing
/// directory as parent.
#[derive(Debug)]
pub struct MemStore {
    nodes: RwLock<HashMap<String, MemNode>>,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    /// Create a store holding only the root directory.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            ROOT_DIR_ID.to_string(),
            MemNode {
                dir_id: String::new(),
                name: String::new(),
                kind: MemKind::Directory,
            },
        );
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, MemNode>> {
        self.nodes.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, MemNode>> {
        self.nodes.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a directory.
    pub fn mkdir(&self, id: &str, dir_id: &str, name: &str) -> Result<()> {
        self.insert(id, dir_id, name, MemKind::Directory)
    }

    /// Store a file, computing its checksum from `content`.
    pub fn put_file(&self, id: &str, dir_id: &str, name: &str, content: &[u8]) -> Result<()> {
        let kind = MemKind::File {
            checksum: compute_bytes_checksum(content),
            size: content.len() as u64,
        };
        self.insert(id, dir_id, name, kind)
    }

    /// Store a file with an explicit checksum.
    pub fn put_file_with_checksum(
        &self,
        id: &str,
        dir_id: &str,
        name: &str,
        checksum: &str,
        size: u64,
    ) -> Result<()> {
        let kind = MemKind::File {
            checksum: checksum.to_string(),
            size,
        };
        self.insert(id, dir_id, name, kind)
    }

    /// Overwrite the bytes of an existing file.
    pub fn rewrite_file(&self, id: &str, content: &[u8]) -> Result<()> {
        self.set_checksum(id, &compute_bytes_checksum(content), content.len() as u64)
    }

    /// Overwrite the recorded checksum and size of an existing file.
    pub fn set_checksum(&self, id: &str, checksum: &str, size: u64) -> Result<()> {
        let mut nodes = self.write();
        let node = nodes.get_mut(id).ok_or_else(|| Error::NodeNotFound { id: id.into() })?;
        match &mut node.kind {
            MemKind::File {
                checksum: current,
                size: current_size,
            } => {
                *current = checksum.to_string();
                *current_size = size;
                Ok(())
            }
            MemKind::Directory => Err(Error::NotAFile { id: id.into() }),
        }
    }

    /// Remove a node and everything below it.
    pub fn remove(&self, id: &str) -> Result<()> {
        let mut nodes = self.write();
        if !nodes.contains_key(id) {
            return Err(Error::NodeNotFound { id: id.into() });
        }
        let mut pending = vec![id.to_string()];
        while let Some(current) = pending.pop() {
            nodes.remove(&current);
            pending.extend(
                nodes
                    .iter()
                    .filter(|(_, n)| n.dir_id == current)
                    .map(|(child, _)| child.clone()),
            );
        }
        debug!(%id, "removed subtree from memory store");
        Ok(())
    }

    /// Turn a node into an empty directory, dropping any descendants.
    pub fn replace_with_dir(&self, id: &str) -> Result<()> {
        let (dir_id, name) = self.location(id)?;
        self.remove(id)?;
        self.mkdir(id, &dir_id, &name)
    }

    /// Turn a node into a file with the given bytes, dropping any descendants.
    pub fn replace_with_file(&self, id: &str, content: &[u8]) -> Result<()> {
        let (dir_id, name) = self.location(id)?;
        self.remove(id)?;
        self.put_file(id, &dir_id, &name, content)
    }

    fn location(&self, id: &str) -> Result<(String, String)> {
        let nodes = self.read();
        let node = nodes.get(id).ok_or_else(|| Error::NodeNotFound { id: id.into() })?;
        Ok((node.dir_id.clone(), node.name.clone()))
    }

    fn insert(&self, id: &str, dir_id: &str, name: &str, kind: MemKind) -> Result<()> {
        let mut nodes = self.write();
        if nodes.contains_key(id) {
            return Err(Error::NodeExists { id: id.into() });
        }
        match nodes.get(dir_id) {
            Some(MemNode {
                kind: MemKind::Directory,
                ..
            }) => {}
            Some(_) => return Err(Error::NotADirectory { id: dir_id.into() }),
            None => return Err(Error::NodeNotFound { id: dir_id.into() }),
        }
        if nodes
            .values()
            .any(|n| n.dir_id == dir_id && n.name == name)
        {
            return Err(Error::NodeExists {
                id: format!("{dir_id}/{name}"),
            });
        }
        nodes.insert(
            id.to_string(),
            MemNode {
                dir_id: dir_id.to_string(),
                name: name.to_string(),
                kind,
            },
        );
        Ok(())
    }

    fn path_of(nodes: &HashMap<String, MemNode>, id: &str) -> LogicalPath {
        let mut names = Vec::new();
        let mut current = id;
        while let Some(node) = nodes.get(current) {
            if current == ROOT_DIR_ID {
                break;
            }
            names.push(node.name.as_str());
            current = &node.dir_id;
        }
        names.reverse();
        LogicalPath::new(format!("/{}", names.join("/")))
    }

    fn to_store_node(nodes: &HashMap<String, MemNode>, id: &str, node: &MemNode) -> StoreNode {
        let kind = match &node.kind {
            MemKind::File { size, .. } => NodeKind::File { size: *size },
            MemKind::Directory => NodeKind::Directory,
        };
        StoreNode {
            id: id.to_string(),
            dir_id: node.dir_id.clone(),
            name: node.name.clone(),
            path: Self::path_of(nodes, id),
            kind,
            modified: None,
        }
    }
}

impl ContentStore for MemStore {
    fn stat(&self, id: &str) -> Result<Option<StoreNode>> {
        let nodes = self.read();
        Ok(nodes.get(id).map(|node| Self::to_store_node(&nodes, id, node)))
    }

    fn children(&self, dir_id: &str) -> Result<Vec<StoreNode>> {
        let nodes = self.read();
        match nodes.get(dir_id) {
            Some(MemNode {
                kind: MemKind::Directory,
                ..
            }) => {}
            Some(_) => return Err(Error::NotADirectory { id: dir_id.into() }),
            None => return Err(Error::NodeNotFound { id: dir_id.into() }),
        }
        let mut children: Vec<StoreNode> = nodes
            .iter()
            .filter(|(id, n)| n.dir_id == dir_id && id.as_str() != ROOT_DIR_ID)
            .map(|(id, n)| Self::to_store_node(&nodes, id, n))
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(children)
    }

    fn checksum(&self, id: &str) -> Result<(String, u64)> {
        let nodes = self.read();
        match nodes.get(id).map(|n| &n.kind) {
            Some(MemKind::File { checksum, size }) => Ok((checksum.clone(), *size)),
            Some(MemKind::Directory) => Err(Error::NotAFile { id: id.into() }),
            None => Err(Error::NodeNotFound { id: id.into() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_reports_absent_nodes_as_none() {
        let store = MemStore::new();
        assert!(store.stat("missing").unwrap().is_none());
        assert!(store.stat(ROOT_DIR_ID).unwrap().unwrap().is_dir());
    }

    #[test]
    fn paths_follow_parents() {
        let store = MemStore::new();
        store.mkdir("d1", ROOT_DIR_ID, "docs").unwrap();
        store.put_file("f1", "d1", "a.txt", b"hello").unwrap();

        let node = store.stat("f1").unwrap().unwrap();
        assert_eq!(node.path.as_str(), "/docs/a.txt");
        assert_eq!(node.dir_id, "d1");
        assert_eq!(node.size(), 5);
    }

    #[test]
    fn put_requires_directory_parent() {
        let store = MemStore::new();
        store.put_file("f1", ROOT_DIR_ID, "a.txt", b"x").unwrap();
        let err = store.put_file("f2", "f1", "b.txt", b"y").unwrap_err();
        assert!(matches!(err, Error::NotADirectory { .. }));
        let err = store.put_file("f3", "nope", "c.txt", b"z").unwrap_err();
        assert!(matches!(err, Error::NodeNotFound { .. }));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let store = MemStore::new();
        store.put_file("f1", ROOT_DIR_ID, "a.txt", b"x").unwrap();
        let err = store.put_file("f2", ROOT_DIR_ID, "a.txt", b"y").unwrap_err();
        assert!(matches!(err, Error::NodeExists { .. }));
    }

    #[test]
    fn remove_drops_descendants() {
        let store = MemStore::new();
        store.mkdir("d1", ROOT_DIR_ID, "docs").unwrap();
        store.mkdir("d2", "d1", "deep").unwrap();
        store.put_file("f1", "d2", "a.txt", b"x").unwrap();

        store.remove("d1").unwrap();
        assert!(store.stat("d2").unwrap().is_none());
        assert!(store.stat("f1").unwrap().is_none());
    }

    #[test]
    fn replace_with_dir_keeps_location() {
        let store = MemStore::new();
        store.put_file("n1", ROOT_DIR_ID, "thing", b"x").unwrap();
        store.replace_with_dir("n1").unwrap();

        let node = store.stat("n1").unwrap().unwrap();
        assert!(node.is_dir());
        assert_eq!(node.path.as_str(), "/thing");
    }

    #[test]
    fn explicit_checksum_is_reported() {
        let store = MemStore::new();
        store
            .put_file_with_checksum("doc1", ROOT_DIR_ID, "a", "a1b2", 4)
            .unwrap();
        assert_eq!(store.checksum("doc1").unwrap(), ("a1b2".to_string(), 4));
        store.set_checksum("doc1", "c3d4", 7).unwrap();
        assert_eq!(store.checksum("doc1").unwrap(), ("c3d4".to_string(), 7));
    }
}
