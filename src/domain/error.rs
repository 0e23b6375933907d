//! Domain-level error types for reqfile-handler.
//!
//! All errors are typed with `thiserror` and provide meaningful context
//! without exposing internal details to end users.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level errors surfaced by every layer of the tool.
#[derive(Error, Debug)]
pub enum AppError {
    /// No manifest file found at or below the expected location.
    #[error("Manifest not found at: {path}")]
    ManifestNotFound { path: PathBuf },

    /// A line in a manifest could not be parsed.
    #[error("Parse error in {file} (line {line}): {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    /// Invalid or inconsistent data outside of line parsing.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// JSON serialization failed.
    #[error("JSON error: {message}")]
    JsonSerialize {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create a parse error for a specific manifest line.
    pub fn parse(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a JSON serialization error.
    pub fn json(err: serde_json::Error) -> Self {
        Self::JsonSerialize {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
