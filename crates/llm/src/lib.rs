//! LLM-backed classification oracle
//!
//! Features:
//! - Ollama chat backend with retry and exponential backoff
//! - Prompt construction for constrained, per-level classification
//! - Tolerant JSON verdict parsing
//!
//! Prompt text lives only in this crate; the core pipeline never sees it.

pub mod backend;
pub mod oracle;
pub mod prompt;

pub use backend::{FinishReason, GenerationResult, LlmBackend, LlmConfig, OllamaBackend};
pub use oracle::LlmOracle;
pub use prompt::{parse_verdict, ClassificationPrompt, Message, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for triage_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout => triage_core::Error::Timeout,
            LlmError::Configuration(msg) => triage_core::Error::Configuration(msg),
            other => triage_core::Error::Oracle(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        assert_eq!(triage_core::Error::from(LlmError::Timeout), triage_core::Error::Timeout);
        assert_eq!(
            triage_core::Error::from(LlmError::Api("model not found".into())),
            triage_core::Error::Oracle("API error: model not found".into())
        );
        assert!(triage_core::Error::from(LlmError::Network("reset".into())).is_oracle_failure());
    }
}
