//! Error types for the network engine and its data collaborators

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Errors raised by kernels, the network and the data/export helpers.
///
/// Kernel and layer-store errors signal caller mistakes and are never retried.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Operand dimensions do not line up
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Non-positive size, out-of-range label, mismatched target length, ...
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation not allowed in the network's current lifecycle state
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Input file missing, unreadable or without data rows
    #[error("file error: {path}: {message}")]
    FileError { path: String, message: String },

    /// Malformed row in a data file (1-based line number)
    #[error("parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Run configuration rejected by validation
    #[error("invalid configuration: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NetworkError {
    pub(crate) fn file(path: impl Into<String>, message: impl ToString) -> Self {
        NetworkError::FileError {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        NetworkError::ParseError {
            line,
            message: message.into(),
        }
    }
}
