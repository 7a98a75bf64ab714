//! Error types shared across the triage crates

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed or missing rule/hierarchy data. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The classification oracle failed to answer
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// The classification oracle did not answer in time
    #[error("Oracle timeout")]
    Timeout,
}

/// Result alias using the core error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error came from the oracle side (failure or timeout)
    pub fn is_oracle_failure(&self) -> bool {
        matches!(self, Error::Oracle(_) | Error::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_failure_classification() {
        assert!(Error::Timeout.is_oracle_failure());
        assert!(Error::Oracle("503".into()).is_oracle_failure());
        assert!(!Error::Configuration("empty hierarchy".into()).is_oracle_failure());
    }

    #[test]
    fn test_display() {
        let err = Error::Configuration("missing routing.yaml".into());
        assert_eq!(err.to_string(), "Configuration error: missing routing.yaml");
    }
}
