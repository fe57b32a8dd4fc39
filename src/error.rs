//! Crate error type.
//!
//! Only configuration and sink I/O can fail. Attaching context, masking and
//! binding errors to context are total functions.

use thiserror::Error;

/// Result type for logging operations.
pub type LogResult<T> = Result<T, LogError>;

/// Errors surfaced by configuration and by handlers writing records.
#[derive(Debug, Error)]
pub enum LogError {
    /// Format string other than `json` or `text`.
    #[error("unknown format {0:?} (expected 'json' or 'text')")]
    UnknownFormat(String),

    /// Level string that is neither a known name nor an integer.
    #[error("unknown level: {0:?}")]
    InvalidLevel(String),

    /// One or more semantic configuration problems.
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A previous writer panicked while holding the output lock.
    #[error("log writer poisoned")]
    WriterPoisoned,
}
