//! Storage error types.

use thiserror::Error;

/// Errors from a [`super::Storage`] backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Stored bytes could not be interpreted
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error (file system, database, lock poisoning)
    #[error("I/O error: {0}")]
    Io(String),
}
