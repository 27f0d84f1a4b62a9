//! Error types for study-core.

use thiserror::Error;

/// Result type alias using ValidationError.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Errors raised when caller-supplied values fall outside the domain.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("review quality must be between 0 and 5, got {0}")]
    InvalidQuality(i64),

    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        min: i64,
        value: i64,
    },

    #[error("unknown session type: {0}")]
    UnknownSessionType(String),

    #[error("unknown question type: {0}")]
    UnknownQuestionType(String),
}
