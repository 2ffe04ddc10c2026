//! Run context resolution
//!
//! Merges the configuration file with command-line overrides and opens the
//! store and index it names.

use std::path::{Path, PathBuf};
use tracing::debug;
use vfs_core::{FsckConfig, FsckOptions};
use vfs_fs::LocalStore;
use vfs_index::FileIndex;

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Looked for when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "vfsck.toml";

/// Resolved settings for one command.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: FsckConfig,
}

impl RunContext {
    /// Build the context for `cli`, relative to `cwd`.
    pub fn resolve(cli: &Cli, cwd: &Path) -> Result<Self> {
        let mut config = match config_path(cli, cwd) {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration");
                FsckConfig::load(&path)?
            }
            None => FsckConfig::default(),
        };

        if let Some(store) = &cli.store {
            config.store.root = Some(cwd.join(store));
        }
        if let Some(index) = &cli.index {
            config.index.path = Some(cwd.join(index));
        }
        if let Some(secs) = cli.timeout {
            config.fsck.timeout_secs = Some(secs);
        }
        Ok(Self { config })
    }

    pub fn store_root(&self) -> Result<&Path> {
        self.config
            .store
            .root
            .as_deref()
            .ok_or_else(|| CliError::user("No store configured. Pass --store or set [store] root."))
    }

    pub fn index_path(&self) -> Result<&Path> {
        self.config
            .index
            .path
            .as_deref()
            .ok_or_else(|| CliError::user("No index configured. Pass --index or set [index] path."))
    }

    pub fn open_store(&self) -> Result<LocalStore> {
        Ok(LocalStore::open(self.store_root()?)?)
    }

    pub fn open_index(&self) -> Result<FileIndex> {
        let path = self.index_path()?;
        if !path.exists() {
            return Err(CliError::user(format!(
                "Index file {} does not exist. Run 'vfsck init-index' first.",
                path.display()
            )));
        }
        Ok(FileIndex::open(path)?)
    }

    /// Options for a run, starting from the `[fsck]` section.
    pub fn options(&self, repair: bool, dry_run: bool) -> FsckOptions {
        let mut options = self.config.options();
        options.repair = repair;
        options.dry_run |= dry_run;
        options
    }
}

/// `--config` (or `VFSCK_CONFIG`), then `./vfsck.toml`, then the user
/// config directory.
fn config_path(cli: &Cli, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = &cli.config {
        return Some(cwd.join(path));
    }
    [Some(cwd.to_path_buf()), dirs::config_dir().map(|d| d.join("vfsck"))]
        .into_iter()
        .flatten()
        .map(|dir| dir.join(DEFAULT_CONFIG_FILE))
        .find(|path| path.is_file())
}
