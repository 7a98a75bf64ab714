//! Error types for text processing

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TextProcessingError {
    #[error("Invalid pattern '{pattern}' for category {category}: {message}")]
    InvalidPattern {
        category: String,
        pattern: String,
        message: String,
    },

    #[error("Duplicate category: {0}")]
    DuplicateCategory(String),
}

pub type Result<T> = std::result::Result<T, TextProcessingError>;

impl From<TextProcessingError> for triage_core::Error {
    fn from(err: TextProcessingError) -> Self {
        triage_core::Error::Configuration(err.to_string())
    }
}
