//! Error types for preference-store operations.
//!
//! Decode failures are deliberately absent from this taxonomy: a stored
//! member that cannot be decoded is dropped during listing, not reported.
//! See [`crate::codec::Decoded`] for the observable form of that policy.

use thiserror::Error;

/// Errors that can occur against a preference store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store key is malformed (empty, too long, or contains forbidden characters).
    #[error("invalid store key: {0}")]
    InvalidKey(String),

    /// Cannot open or communicate with the storage backend.
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// An atomic edit could not be committed.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// Database error from SQLx.
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// I/O error.
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::ConnectionError(_) | StoreError::TransactionFailed(_)
        )
    }
}
