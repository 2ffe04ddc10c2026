//! Content store backed by a directory on disk.

use std::fs::{self, Metadata};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, trace};
use walkdir::WalkDir;

use super::{ContentStore, NodeKind, StoreNode, WalkControl};
use crate::checksum::compute_file_checksum;
use crate::constants::ROOT_DIR_ID;
use crate::{Error, LogicalPath, Result};

/// A directory tree on the local disk.
///
/// Node identifiers are logical paths (`/photos/cat.jpg`), except the root
/// which uses [`ROOT_DIR_ID`] so it lines up with the index root. Symlinks
/// and special files are invisible to the store.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open a store rooted at an existing directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRoot`] if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::InvalidRoot { path: root });
        }
        debug!(root = %root.display(), "opened local content store");
        Ok(Self { root })
    }

    /// Native root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Identifier of the node stored at a logical path.
    pub fn id_for(path: &LogicalPath) -> String {
        if path.is_root() {
            ROOT_DIR_ID.to_string()
        } else {
            path.to_string()
        }
    }

    /// Logical path for an identifier, `None` for ids this store never hands
    /// out.
    pub fn path_for(id: &str) -> Option<LogicalPath> {
        if id == ROOT_DIR_ID {
            return Some(LogicalPath::root());
        }
        let path = LogicalPath::new(id);
        (!path.is_root() && path.as_str() == id).then_some(path)
    }

    fn native(&self, path: &LogicalPath) -> PathBuf {
        path.to_native_under(&self.root)
    }

    fn node(&self, path: &LogicalPath, metadata: &Metadata) -> Option<StoreNode> {
        let kind = if metadata.is_dir() {
            NodeKind::Directory
        } else if metadata.is_file() {
            NodeKind::File {
                size: metadata.len(),
            }
        } else {
            return None;
        };
        let dir_id = path.parent().map(|p| Self::id_for(&p)).unwrap_or_default();
        Some(StoreNode {
            id: Self::id_for(path),
            dir_id,
            name: path.name().to_string(),
            path: path.clone(),
            kind,
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    fn metadata(&self, native: &Path) -> Result<Option<Metadata>> {
        match fs::symlink_metadata(native) {
            Ok(metadata) => Ok(Some(metadata)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(native, e)),
        }
    }
}

impl ContentStore for LocalStore {
    fn stat(&self, id: &str) -> Result<Option<StoreNode>> {
        let Some(path) = Self::path_for(id) else {
            return Ok(None);
        };
        let native = self.native(&path);
        Ok(self
            .metadata(&native)?
            .and_then(|metadata| self.node(&path, &metadata)))
    }

    fn children(&self, dir_id: &str) -> Result<Vec<StoreNode>> {
        let path = Self::path_for(dir_id).ok_or_else(|| Error::NodeNotFound {
            id: dir_id.into(),
        })?;
        let native = self.native(&path);
        let entries = match fs::read_dir(&native) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NodeNotFound { id: dir_id.into() });
            }
            Err(e) if native.is_file() => {
                trace!(error = %e, "read_dir on a file");
                return Err(Error::NotADirectory { id: dir_id.into() });
            }
            Err(e) => return Err(Error::io(&native, e)),
        };

        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&native, e))?;
            let child = path.join(&entry.file_name().to_string_lossy());
            if let Some(metadata) = self.metadata(&entry.path())?
                && let Some(node) = self.node(&child, &metadata)
            {
                children.push(node);
            }
        }
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    fn checksum(&self, id: &str) -> Result<(String, u64)> {
        let path = Self::path_for(id).ok_or_else(|| Error::NodeNotFound { id: id.into() })?;
        let native = self.native(&path);
        match self.metadata(&native)? {
            Some(metadata) if metadata.is_file() => compute_file_checksum(&native),
            Some(_) => Err(Error::NotAFile { id: id.into() }),
            None => Err(Error::NodeNotFound { id: id.into() }),
        }
    }

    fn walk(&self, visit: &mut dyn FnMut(&StoreNode) -> WalkControl) -> Result<()> {
        let mut entries = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = entries.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.io_error().map(|io| io.kind()) == Some(ErrorKind::NotFound) => {
                    continue;
                }
                Err(e) => {
                    return Err(Error::Walk {
                        path: e
                            .path()
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|| self.root.clone()),
                        message: e.to_string(),
                    });
                }
            };
            let Some(path) = LogicalPath::from_native(&self.root, entry.path()) else {
                continue;
            };
            let Some(metadata) = self.metadata(entry.path())? else {
                continue;
            };
            let Some(node) = self.node(&path, &metadata) else {
                continue;
            };

            match visit(&node) {
                WalkControl::Stop => return Ok(()),
                WalkControl::SkipSubtree => {
                    if node.is_dir() {
                        entries.skip_current_dir();
                    }
                }
                WalkControl::Continue => {}
            }
        }
        Ok(())
    }
}
