//! Checker configuration
//!
//! One file, any of TOML, JSON or YAML (by extension). Every field is
//! optional; command-line flags override what the file says.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use vfs_fs::ConfigStore;

use crate::fsck::FsckOptions;
use crate::{CancellationToken, Error, Result};

/// Where the content store lives
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSection {
    /// Root directory of a local store
    #[serde(default)]
    pub root: Option<PathBuf>,
}

/// Where the metadata index lives
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSection {
    /// Index file; its extension picks the format
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Run behaviour
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsckSection {
    /// Describe repairs without applying them
    #[serde(default)]
    pub dry_run: bool,

    /// Run the repair policy after scanning
    #[serde(default)]
    pub repair: bool,

    /// Abort the run after this many seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Parsed checker configuration.
///
/// ```
/// use vfs_core::FsckConfig;
///
/// let config = FsckConfig::parse(r#"
/// [store]
/// root = "/srv/vfs/data"
///
/// [fsck]
/// repair = true
/// "#).unwrap();
///
/// assert!(config.fsck.repair);
/// assert!(config.index.path.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsckConfig {
    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub index: IndexSection,

    #[serde(default)]
    pub fsck: FsckSection,
}

impl FsckConfig {
    /// Parse TOML content.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(ConfigStore::new().parse(Path::new("vfsck.toml"), content)?)
    }

    /// Load a configuration file in whichever format its extension names.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let config: Self = ConfigStore::new().load(path)?;
        Ok(config.resolve_relative_to(path.parent().unwrap_or(Path::new(""))))
    }

    /// Make relative store and index paths relative to `base`.
    fn resolve_relative_to(mut self, base: &Path) -> Self {
        for path in [&mut self.store.root, &mut self.index.path]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.fsck.timeout_secs.map(Duration::from_secs)
    }

    /// Run options implied by the `[fsck]` section.
    pub fn options(&self) -> FsckOptions {
        FsckOptions {
            dry_run: self.fsck.dry_run,
            repair: self.fsck.repair,
            cancel: self
                .timeout()
                .map(CancellationToken::with_timeout)
                .unwrap_or_default(),
        }
    }

    /// Check that both collaborators are configured.
    pub fn require_paths(&self) -> Result<(&Path, &Path)> {
        let store = self.store.root.as_deref().ok_or_else(|| Error::InvalidConfig {
            message: "no store root configured".into(),
        })?;
        let index = self.index.path.as_deref().ok_or_else(|| Error::InvalidConfig {
            message: "no index path configured".into(),
        })?;
        Ok((store, index))
    }
}
