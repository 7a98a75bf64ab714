//! Per-message decision logic
//!
//! - **Router**: lexical routing of inbound messages to a business unit
//! - **Escalation detection**: frustration and handoff signals
//! - **Clarification planning**: whether and what to ask before proceeding
//! - **Decision engine**: runs the three per turn and threads session state
//!
//! All components are immutable after construction and safe to share across
//! threads. Session state is passed in and returned, never held.
//!
//! # Example
//!
//! ```ignore
//! use triage_agent::{DecisionEngine, SessionState};
//! use triage_config::{DomainConfig, EngineSettings};
//!
//! let domain = DomainConfig::load_dir("config/domains/payments")?;
//! let engine = DecisionEngine::from_domain(&domain, EngineSettings::default())?;
//!
//! let (turn, state) = engine.assess("Quero antecipar minhas vendas", &SessionState::new());
//! assert_eq!(turn.routing.primary_unit, "acquiring");
//! ```

pub mod clarification;
pub mod engine;
pub mod escalation;
pub mod router;
pub mod telemetry;

pub use clarification::ClarificationPlanner;
pub use engine::{DecisionEngine, SessionState, TurnAssessment};
pub use escalation::{analyze_trend, EscalationDetector};
pub use router::Router;
pub use telemetry::init_tracing;

use thiserror::Error;
use triage_text_processing::TextProcessingError;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Text processing error: {0}")]
    TextProcessing(#[from] TextProcessingError),

    #[error("Invalid pattern '{pattern}' in {rule}: {message}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        message: String,
    },

    #[error("Telemetry initialization failed: {0}")]
    Telemetry(String),
}

impl From<AgentError> for triage_core::Error {
    fn from(err: AgentError) -> Self {
        triage_core::Error::Configuration(err.to_string())
    }
}
