//! Error types for the botdetect CLI.

use std::path::PathBuf;
use std::process::ExitCode;

use botdetect::error::BotDetectError;
use thiserror::Error;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// Input file not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Malformed CSV input
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Output could not be encoded as JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the detection library
    #[error(transparent)]
    Detect(#[from] BotDetectError),
}

impl CliError {
    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound(_) => ExitCode::from(3),
            Self::Csv(_) => ExitCode::from(4),
            Self::Json(_) | Self::Io(_) => ExitCode::from(7),
            Self::Detect(e) => match e {
                BotDetectError::Parse { .. } | BotDetectError::MissingField { .. } => {
                    ExitCode::from(4)
                }
                BotDetectError::InvalidHyperparameter { .. } => ExitCode::from(2),
                BotDetectError::InsufficientData { .. } => ExitCode::from(5),
                BotDetectError::ModelNotReady | BotDetectError::DimensionMismatch { .. } => {
                    ExitCode::from(6)
                }
                BotDetectError::Io(_) | BotDetectError::Format { .. } => ExitCode::from(8),
                BotDetectError::Other(_) => ExitCode::from(1),
            },
        }
    }
}
