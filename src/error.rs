//! Error types for bot-detection operations.
//!
//! Every fallible stage of the pipeline (row parsing, dataset assembly,
//! scaling, training, persistence) reports through [`BotDetectError`].

use std::fmt;

/// Main error type for botdetect operations.
///
/// # Examples
///
/// ```
/// use botdetect::error::BotDetectError;
///
/// let err = BotDetectError::Parse {
///     field: "age".to_string(),
///     value: "ten".to_string(),
/// };
/// assert!(err.to_string().contains("age"));
/// ```
#[derive(Debug)]
pub enum BotDetectError {
    /// A numeric field could not be parsed as a float.
    Parse {
        /// Column name
        field: String,
        /// Raw value that failed to parse
        value: String,
    },

    /// A required field is absent from the record.
    MissingField {
        /// Column name
        field: String,
    },

    /// One label class has no examples, so nothing can be trained.
    InsufficientData {
        /// Number of bot rows available
        bots: usize,
        /// Number of non-bot rows available
        humans: usize,
    },

    /// Prediction or evaluation was requested before `fit` or `import`.
    ModelNotReady,

    /// Matrix/vector dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// I/O error (file not found, permission denied, disk full).
    Io(std::io::Error),

    /// Persisted byte stream could not be encoded or decoded.
    Format {
        /// Error description
        message: String,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for BotDetectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotDetectError::Parse { field, value } => {
                write!(f, "Parse error: field '{field}' has non-numeric value '{value}'")
            }
            BotDetectError::MissingField { field } => {
                write!(f, "Parse error: required field '{field}' is missing")
            }
            BotDetectError::InsufficientData { bots, humans } => {
                write!(
                    f,
                    "Insufficient data: need both classes, got {bots} bot and {humans} non-bot rows"
                )
            }
            BotDetectError::ModelNotReady => {
                write!(f, "Model not ready: call fit() or import a trained model first")
            }
            BotDetectError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {expected}, got {actual}")
            }
            BotDetectError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            BotDetectError::Io(e) => write!(f, "I/O error: {e}"),
            BotDetectError::Format { message } => write!(f, "Invalid model format: {message}"),
            BotDetectError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for BotDetectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BotDetectError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BotDetectError {
    fn from(err: std::io::Error) -> Self {
        BotDetectError::Io(err)
    }
}

impl From<&str> for BotDetectError {
    fn from(msg: &str) -> Self {
        BotDetectError::Other(msg.to_string())
    }
}

impl From<String> for BotDetectError {
    fn from(msg: String) -> Self {
        BotDetectError::Other(msg)
    }
}

impl BotDetectError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an invalid hyperparameter error
    #[must_use]
    pub fn invalid_hyperparameter(param: &str, value: impl ToString, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }

    /// True for the errors a caller may skip on a per-row basis.
    #[must_use]
    pub fn is_row_error(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::MissingField { .. })
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, BotDetectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display() {
        let err = BotDetectError::Parse {
            field: "avg_tpd".to_string(),
            value: "n/a".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Parse error"));
        assert!(msg.contains("avg_tpd"));
        assert!(msg.contains("n/a"));
    }

    #[test]
    fn test_missing_field_display() {
        let err = BotDetectError::MissingField {
            field: "spam_ratio".to_string(),
        };
        assert!(err.to_string().contains("spam_ratio"));
    }

    #[test]
    fn test_insufficient_data_display() {
        let err = BotDetectError::InsufficientData { bots: 0, humans: 12 };
        let msg = err.to_string();
        assert!(msg.contains("Insufficient data"));
        assert!(msg.contains("0 bot"));
        assert!(msg.contains("12 non-bot"));
    }

    #[test]
    fn test_model_not_ready_display() {
        assert!(BotDetectError::ModelNotReady
            .to_string()
            .contains("Model not ready"));
    }

    #[test]
    fn test_invalid_hyperparameter_helper() {
        let err = BotDetectError::invalid_hyperparameter("n_trees", 0, ">= 1");
        let msg = err.to_string();
        assert!(msg.contains("n_trees"));
        assert!(msg.contains(">= 1"));
    }

    #[test]
    fn test_dimension_mismatch_helper() {
        let err = BotDetectError::dimension_mismatch("features", 13, 11);
        let msg = err.to_string();
        assert!(msg.contains("features=13"));
        assert!(msg.contains("11"));
    }

    #[test]
    fn test_from_io_error_keeps_source() {
        use std::error::Error;
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: BotDetectError = io_err.into();
        assert!(matches!(err, BotDetectError::Io(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_from_str_and_string() {
        let a: BotDetectError = "boom".into();
        let b: BotDetectError = "boom".to_string().into();
        assert_eq!(a.to_string(), "boom");
        assert_eq!(b.to_string(), "boom");
    }

    #[test]
    fn test_row_error_classification() {
        assert!(BotDetectError::MissingField {
            field: "age".into()
        }
        .is_row_error());
        assert!(!BotDetectError::ModelNotReady.is_row_error());
    }
}
