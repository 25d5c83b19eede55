//! Error types for Cotejar operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for Cotejar operations.
///
/// # Examples
///
/// ```
/// use cotejar::error::CotejarError;
///
/// let err = CotejarError::LengthMismatch {
///     expected: 100,
///     actual: 90,
/// };
/// assert!(err.to_string().contains("length mismatch"));
/// ```
#[derive(Debug)]
pub enum CotejarError {
    /// Flat weight vectors have different lengths.
    ///
    /// This is fatal: it means filtering or flattening diverged between the
    /// two models, which cannot happen when the structural check passed.
    LengthMismatch {
        /// Length of the base vector
        expected: usize,
        /// Length of the finetuned vector
        actual: usize,
    },

    /// Tensor shape does not match its data length.
    ShapeMismatch {
        /// Shape provided
        shape: Vec<usize>,
        /// Number of elements provided
        elements: usize,
    },

    /// Invalid or corrupt checkpoint format.
    FormatError {
        /// Error description
        message: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Serialization/deserialization error.
    Serialization(String),

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for CotejarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CotejarError::LengthMismatch { expected, actual } => {
                write!(
                    f,
                    "Flat vector length mismatch: base has {expected} weights, finetuned has {actual}"
                )
            }
            CotejarError::ShapeMismatch { shape, elements } => {
                write!(
                    f,
                    "Tensor shape mismatch: shape {shape:?} does not hold {elements} elements"
                )
            }
            CotejarError::FormatError { message } => {
                write!(f, "Invalid checkpoint format: {message}")
            }
            CotejarError::Io(e) => write!(f, "I/O error: {e}"),
            CotejarError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            CotejarError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CotejarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CotejarError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CotejarError {
    fn from(err: std::io::Error) -> Self {
        CotejarError::Io(err)
    }
}

impl From<&str> for CotejarError {
    fn from(msg: &str) -> Self {
        CotejarError::Other(msg.to_string())
    }
}

impl From<String> for CotejarError {
    fn from(msg: String) -> Self {
        CotejarError::Other(msg)
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, CotejarError>;
