//! Error types for the Soaris backing stores.

use thiserror::Error;

/// Result type alias for backing store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while reading or writing a blob.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("i/o error: {0}")]
    Io(String),

    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e.to_string())
    }
}
