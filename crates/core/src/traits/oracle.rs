//! Classification oracle trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::typification::HierarchyLevel;
use crate::Result;

/// Context for a corrective call after a rejected choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionNote {
    /// Label the oracle proposed before
    pub rejected_choice: String,
    /// Why it was rejected
    pub reason: String,
}

/// One constrained classification request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleRequest {
    /// Full conversation transcript
    pub conversation_text: String,
    pub level: HierarchyLevel,
    /// The choice must be one of these, in this order
    pub valid_options: Vec<String>,
    /// Present only on the single corrective call
    #[serde(default)]
    pub correction: Option<CorrectionNote>,
}

impl OracleRequest {
    pub fn new(
        conversation_text: impl Into<String>,
        level: HierarchyLevel,
        valid_options: Vec<String>,
    ) -> Self {
        Self {
            conversation_text: conversation_text.into(),
            level,
            valid_options,
            correction: None,
        }
    }

    pub fn with_correction(mut self, note: CorrectionNote) -> Self {
        self.correction = Some(note);
        self
    }

    pub fn is_correction(&self) -> bool {
        self.correction.is_some()
    }

    /// Whether `choice` is among the allowed options
    pub fn allows(&self, choice: &str) -> bool {
        self.valid_options.iter().any(|o| o == choice)
    }
}

/// Oracle answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleVerdict {
    pub choice: String,
    /// In [0, 1]
    pub confidence: f32,
    #[serde(default)]
    pub rationale: String,
}

impl OracleVerdict {
    pub fn new(choice: impl Into<String>, confidence: f32, rationale: impl Into<String>) -> Self {
        Self {
            choice: choice.into(),
            confidence: confidence.clamp(0.0, 1.0),
            rationale: rationale.into(),
        }
    }
}

/// External classifier invoked once per hierarchy level
///
/// Implementations:
/// - `LlmOracle` - language-model backed (triage-llm crate)
/// - scripted mocks in tests
///
/// The oracle is expected to pick from `valid_options`; the pipeline does not
/// trust it to and treats an out-of-set choice like a validation failure.
///
/// # Example
///
/// ```ignore
/// let oracle: Arc<dyn ClassificationOracle> = Arc::new(LlmOracle::new(backend));
/// let request = OracleRequest::new(transcript, HierarchyLevel::BusinessUnit, options);
/// let verdict = oracle.classify(request).await?;
/// ```
#[async_trait]
pub trait ClassificationOracle: Send + Sync + 'static {
    /// Choose one option for the requested level
    async fn classify(&self, request: OracleRequest) -> Result<OracleVerdict>;

    /// Oracle name for logging
    fn name(&self) -> &str;
}
