//! Error types for vfs-core

use std::path::PathBuf;

/// Result type for vfs-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can end a check run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The run was cancelled or hit its deadline
    #[error("Check cancelled")]
    Cancelled,

    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration is readable but unusable
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // Transparent wrappers for underlying crate errors
    /// Content store error from vfs-fs
    #[error(transparent)]
    Fs(#[from] vfs_fs::Error),

    /// Metadata index error from vfs-index
    #[error(transparent)]
    Index(#[from] vfs_index::Error),
}

impl Error {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_errors_display_transparently() {
        let inner = vfs_index::Error::Conflict { id: "doc1".into() };
        let expected = inner.to_string();
        let error: Error = inner.into();
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn config_not_found_mentions_path() {
        let error = Error::ConfigNotFound {
            path: PathBuf::from("/etc/vfsck.toml"),
        };
        assert!(error.to_string().contains("/etc/vfsck.toml"));
    }
}
