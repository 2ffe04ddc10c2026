//! Error types for vfs-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from vfs-core
    #[error(transparent)]
    Core(#[from] vfs_core::Error),

    /// Error from vfs-fs
    #[error(transparent)]
    Fs(#[from] vfs_fs::Error),

    /// Error from vfs-index
    #[error(transparent)]
    Index(#[from] vfs_index::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
