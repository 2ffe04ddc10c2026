//! Error types for vfs-fs

use std::path::PathBuf;

/// Result type for vfs-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vfs-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} config for {path}: {message}")]
    ConfigSerialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Store root is not a directory: {path}")]
    InvalidRoot { path: PathBuf },

    #[error("Node not found in store: {id}")]
    NodeNotFound { id: String },

    #[error("Node is not a directory: {id}")]
    NotADirectory { id: String },

    #[error("Node is not a file: {id}")]
    NotAFile { id: String },

    #[error("Node already exists in store: {id}")]
    NodeExists { id: String },

    #[error("Failed to walk store tree at {path}: {message}")]
    Walk { path: PathBuf, message: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
