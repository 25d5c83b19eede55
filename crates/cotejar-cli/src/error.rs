//! Error types for cotejar-cli

use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid model source or checkpoint format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation failed (structural mismatch)
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Cotejar library error
    #[error("Cotejar error: {0}")]
    Cotejar(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),
}

impl CliError {
    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound(_) => ExitCode::from(3),
            Self::InvalidFormat(_) => ExitCode::from(4),
            Self::ValidationFailed(_) => ExitCode::from(5),
            Self::Io(_) => ExitCode::from(7),
            Self::Cotejar(_) => ExitCode::from(1),
            Self::NetworkError(_) => ExitCode::from(10),
        }
    }
}

impl From<cotejar::CotejarError> for CliError {
    fn from(e: cotejar::CotejarError) -> Self {
        Self::Cotejar(e.to_string())
    }
}

impl From<cotejar::hub::HubError> for CliError {
    fn from(e: cotejar::hub::HubError) -> Self {
        match e {
            cotejar::hub::HubError::InvalidRepoId(_) => Self::InvalidFormat(e.to_string()),
            _ => Self::NetworkError(e.to_string()),
        }
    }
}
