//! Classification oracle backed by an LLM
//!
//! Bridges [`LlmBackend`] to the core [`ClassificationOracle`] trait so the
//! pipeline can be driven by any chat model.

use std::sync::Arc;

use async_trait::async_trait;
use triage_config::LlmSettings;
use triage_core::{ClassificationOracle, OracleRequest, OracleVerdict, Result};

use crate::backend::{LlmBackend, LlmConfig, OllamaBackend};
use crate::prompt::{parse_verdict, ClassificationPrompt};
use crate::LlmError;

/// LLM classification oracle
///
/// # Example
///
/// ```ignore
/// let oracle = Arc::new(LlmOracle::from_settings(&settings.llm)?);
/// let pipeline = ClassificationPipeline::new(hierarchy, oracle);
/// ```
pub struct LlmOracle {
    backend: Arc<dyn LlmBackend>,
    name: String,
}

impl LlmOracle {
    pub fn new<B: LlmBackend + 'static>(backend: B) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    pub fn from_arc(backend: Arc<dyn LlmBackend>) -> Self {
        let name = format!("llm:{}", backend.model_name());
        Self { backend, name }
    }

    /// Ollama-backed oracle from application settings
    pub fn from_settings(settings: &LlmSettings) -> std::result::Result<Self, LlmError> {
        let backend = OllamaBackend::new(LlmConfig::from(settings))?;
        Ok(Self::new(backend))
    }

    pub fn backend(&self) -> &Arc<dyn LlmBackend> {
        &self.backend
    }
}

#[async_trait]
impl ClassificationOracle for LlmOracle {
    async fn classify(&self, request: OracleRequest) -> Result<OracleVerdict> {
        let messages = ClassificationPrompt::build(&request);
        let generation = self.backend.generate(&messages).await?;
        let verdict = parse_verdict(&generation.text, &request.valid_options)?;

        tracing::debug!(
            oracle = %self.name,
            level = %request.level,
            correction = request.is_correction(),
            choice = %verdict.choice,
            confidence = verdict.confidence,
            elapsed_ms = generation.total_time_ms,
            "LLM verdict"
        );
        Ok(verdict)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
