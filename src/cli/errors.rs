//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::catalog::CatalogError;
use crate::engine::DiagnosisError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file missing, unreadable or invalid
    ConfigError,
    /// Catalog failed validation
    CatalogError,
    /// I/O error (stdin/stdout/files)
    IoError,
    /// Store or runtime could not be started
    BootFailed,
    /// Pipe request is not a known operation
    InvalidRequest,
    /// Interview ended on an engine error
    DiagnosisFailed,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "DIAG_CLI_CONFIG_ERROR",
            Self::CatalogError => "DIAG_CLI_CATALOG_ERROR",
            Self::IoError => "DIAG_CLI_IO_ERROR",
            Self::BootFailed => "DIAG_CLI_BOOT_FAILED",
            Self::InvalidRequest => "DIAG_CLI_INVALID_REQUEST",
            Self::DiagnosisFailed => "DIAG_CLI_DIAGNOSIS_FAILED",
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn catalog_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::CatalogError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidRequest, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        Self::catalog_error(e.to_string())
    }
}

impl From<DiagnosisError> for CliError {
    fn from(e: DiagnosisError) -> Self {
        Self::new(CliErrorCode::DiagnosisFailed, format!("{} ({})", e, e.code()))
    }
}

pub type CliResult<T> = Result<T, CliError>;
