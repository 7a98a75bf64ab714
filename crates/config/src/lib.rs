//! Configuration management for the triage engine
//!
//! Supports loading configuration from:
//! - YAML files (config/default.yaml, config/{env}.yaml)
//! - Environment variables (TRIAGE_ prefix, `__` separator)
//!
//! # Domain Configuration
//!
//! Rule tables live in config/domains/{domain}/:
//! - routing.yaml - categories, keywords, patterns, intents, ambiguous keywords
//! - hierarchy.yaml - BusinessUnit → Product → Motive → Submotive tree
//! - escalation.yaml - escalation and frustration lexicon
//! - clarification.yaml - clarification rules and question templates
//!
//! Tables are loaded once at startup through [`DomainConfig::load_dir`] and
//! checked by [`ConfigValidator`] before the engine is built.

pub mod domain;
pub mod settings;

pub use settings::{
    load_settings, EngineSettings, LlmSettings, ObservabilityConfig, RuntimeEnvironment, Settings,
};

pub use domain::{
    AmbiguousKeyword, AmbiguousTerm, CategoryBoost, CategoryRules, ClarificationConfig,
    ConfigValidator, ContextBoostConfig, ContextTerm, DomainConfig, EscalationLexicon,
    HierarchyConfig, IntentRule, MissingDetailRule, PatternQuestions, RoutingRulesConfig,
    ValidationCategory, ValidationError, ValidationReport, ValidationSeverity,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Domain configuration rejected: {0}")]
    Validation(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<triage_core::Error> for ConfigError {
    fn from(err: triage_core::Error) -> Self {
        ConfigError::Validation(err.to_string())
    }
}

impl From<ConfigError> for triage_core::Error {
    fn from(err: ConfigError) -> Self {
        triage_core::Error::Configuration(err.to_string())
    }
}

/// Read a YAML file into `T`
pub(crate) fn read_yaml<T: serde::de::DeserializeOwned>(
    path: &std::path::Path,
) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
    serde_yaml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
}
