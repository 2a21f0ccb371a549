//! Storage error types

use thiserror::Error;

/// Storage error type
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Stored value for '{key}' is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

/// Storage result type
pub type StorageResult<T> = Result<T, StorageError>;
