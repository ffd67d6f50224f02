//! Storage error types

use thiserror::Error;

/// Errors raised by the versioned store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Keys must be non-empty
    #[error("key must not be an empty string")]
    EmptyKey,

    /// The store has been closed
    #[error("store is closed")]
    Closed,
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

impl From<StorageError> for idledger_core::Error {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::EmptyKey => idledger_core::Error::Validation(e.to_string()),
            StorageError::Closed => idledger_core::Error::Query(e.to_string()),
        }
    }
}
