//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - validation warnings are only logged
    #[default]
    Development,
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Whether non-critical domain validation errors should fail startup
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Decision engine behaviour
    #[serde(default)]
    pub engine: EngineSettings,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Language-model oracle backend
    #[serde(default)]
    pub llm: LlmSettings,

    /// Directory holding routing.yaml, hierarchy.yaml, escalation.yaml and clarification.yaml
    #[serde(default = "default_domain_config_dir")]
    pub domain_config_dir: String,
}

fn default_domain_config_dir() -> String {
    "config/domains/payments".to_string()
}

/// Decision engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Do not plan clarification when the escalation signal recommends a handoff
    #[serde(default = "default_true")]
    pub skip_clarification_on_escalation: bool,
    /// Number of routed units kept in the session routing history
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

fn default_true() -> bool {
    true
}

fn default_history_window() -> usize {
    20
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            skip_clarification_on_escalation: true,
            history_window: default_history_window(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON log lines
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// LLM backend settings for the classification oracle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,
    /// Transport-level retries for transient network errors
    #[serde(default = "default_llm_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_llm_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
}

fn default_llm_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "qwen2.5:7b-instruct-q4_K_M".to_string()
}

fn default_llm_timeout_ms() -> u64 {
    30_000
}

fn default_llm_max_retries() -> u32 {
    2
}

fn default_llm_backoff_ms() -> u64 {
    200
}

fn default_llm_temperature() -> f32 {
    0.0
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: None,
            timeout_ms: default_llm_timeout_ms(),
            max_retries: default_llm_max_retries(),
            initial_backoff_ms: default_llm_backoff_ms(),
            temperature: default_llm_temperature(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domain_config_dir.trim().is_empty() {
            return Err(ConfigError::MissingField("domain_config_dir".to_string()));
        }

        if !LOG_LEVELS.contains(&self.observability.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "observability.log_level".to_string(),
                message: format!("expected one of {:?}", LOG_LEVELS),
            });
        }

        if self.engine.history_window == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.history_window".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        self.validate_llm()
    }

    /// Validate the LLM section
    pub fn validate_llm(&self) -> Result<(), ConfigError> {
        if self.llm.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.timeout_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "llm.temperature".to_string(),
                message: format!("{} is outside [0, 2]", self.llm.temperature),
            });
        }

        if self.llm.max_retries > 10 {
            return Err(ConfigError::InvalidValue {
                field: "llm.max_retries".to_string(),
                message: "must be at most 10".to_string(),
            });
        }

        if self.environment.is_production() && self.llm.endpoint.starts_with("http://localhost") {
            tracing::warn!(
                endpoint = %self.llm.endpoint,
                "Production environment is using a localhost LLM endpoint"
            );
        }

        Ok(())
    }
}

/// Load settings from files and environment
///
/// Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("TRIAGE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
