//! Session store errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No session under this id, or it expired
    #[error("Session '{0}' not found")]
    NotFound(String),

    /// Session id cannot be used as a storage key
    #[error("Invalid session id '{0}'")]
    InvalidKey(String),

    /// Optimistic concurrency check failed
    #[error("Version conflict on session '{session_id}': expected {expected}, found {actual}")]
    VersionConflict {
        session_id: String,
        expected: u64,
        actual: u64,
    },

    /// Backend failure; the caller may retry
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Stored record failed its integrity check
    #[error("Stored session corrupted: {0}")]
    Corrupted(String),
}
