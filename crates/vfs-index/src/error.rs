//! Error types for vfs-index

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] vfs_fs::Error),

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Already exists: {what}")]
    AlreadyExists { what: String },

    #[error("Conflict on {id}: stored document does not match the expected revision")]
    Conflict { id: String },

    #[error("Parent directory not found: {dir_id}")]
    MissingParent { dir_id: String },

    #[error("Invalid document {id}: {reason}")]
    InvalidDoc { id: String, reason: String },
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Lookups that miss are control flow for callers, not failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
