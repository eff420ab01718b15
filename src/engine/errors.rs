//! # Diagnosis Errors
//!
//! Error taxonomy surfaced by the engine and the service layer.
//!
//! Only `ConcurrentModification` and `StoreUnavailable` are retryable. Every
//! other runtime error is shown to users as a request to restart the
//! diagnosis, without internal detail.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::store::StoreError;

/// Result type for engine and service operations
pub type DiagnosisResult<T> = Result<T, DiagnosisError>;

/// Message shown for any non-retryable failure
pub const RESTART_MESSAGE: &str = "Something went wrong. Please restart the diagnosis.";

/// Message shown when a concurrent submission won the race
pub const RETRY_MESSAGE: &str =
    "Your answer crossed with another one. Please reload and try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosisError {
    /// Answer outside QUESTIONING/CLARIFYING, stale question, or no category
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Question id not known for the session's category
    #[error("Unknown question '{0}'")]
    UnknownQuestion(String),

    /// Option value not offered by the question
    #[error("Unknown option '{option}' for question '{question}'")]
    UnknownOption { question: String, option: String },

    /// No live session under this id
    #[error("Unknown session '{0}'")]
    UnknownSession(String),

    /// Store version moved since the session was loaded
    #[error("Session '{session_id}' modified concurrently: expected {expected}, found {actual}")]
    ConcurrentModification {
        session_id: String,
        expected: u64,
        actual: u64,
    },

    /// Broken reference data, fatal at startup
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Session store transport failure
    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),
}

impl DiagnosisError {
    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosisError::InvalidState(_) => "DIAG_INVALID_STATE",
            DiagnosisError::UnknownQuestion(_) => "DIAG_UNKNOWN_QUESTION",
            DiagnosisError::UnknownOption { .. } => "DIAG_UNKNOWN_OPTION",
            DiagnosisError::UnknownSession(_) => "DIAG_UNKNOWN_SESSION",
            DiagnosisError::ConcurrentModification { .. } => "DIAG_CONCURRENT_MODIFICATION",
            DiagnosisError::Configuration(_) => "DIAG_CONFIGURATION",
            DiagnosisError::StoreUnavailable(_) => "DIAG_STORE_UNAVAILABLE",
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            DiagnosisError::UnknownQuestion(_) => 400,
            DiagnosisError::UnknownOption { .. } => 400,
            DiagnosisError::UnknownSession(_) => 404,
            DiagnosisError::InvalidState(_) => 409,
            DiagnosisError::ConcurrentModification { .. } => 409,
            DiagnosisError::Configuration(_) => 500,
            DiagnosisError::StoreUnavailable(_) => 503,
        }
    }

    /// Whether the caller may reload and try again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DiagnosisError::ConcurrentModification { .. } | DiagnosisError::StoreUnavailable(_)
        )
    }

    /// Text safe to show to an end user
    pub fn user_message(&self) -> &'static str {
        match self {
            DiagnosisError::ConcurrentModification { .. } => RETRY_MESSAGE,
            _ => RESTART_MESSAGE,
        }
    }
}

impl From<CatalogError> for DiagnosisError {
    fn from(err: CatalogError) -> Self {
        DiagnosisError::Configuration(err.to_string())
    }
}

impl From<StoreError> for DiagnosisError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => DiagnosisError::UnknownSession(id),
            StoreError::InvalidKey(id) => DiagnosisError::UnknownSession(id),
            StoreError::VersionConflict {
                session_id,
                expected,
                actual,
            } => DiagnosisError::ConcurrentModification {
                session_id,
                expected,
                actual,
            },
            StoreError::Unavailable(reason) => DiagnosisError::StoreUnavailable(reason),
            StoreError::Corrupted(reason) => DiagnosisError::StoreUnavailable(reason),
        }
    }
}
