//! Core traits and types for the triage engine
//!
//! This crate provides foundational types used across all other crates:
//! - The outcome hierarchy store (BusinessUnit → Product → Motive → Submotive)
//! - Routing, escalation and clarification result types
//! - Session context passed into the decision engine
//! - The classification oracle trait
//! - Error types

pub mod clarification;
pub mod error;
pub mod escalation;
pub mod hierarchy;
pub mod routing;
pub mod session;
pub mod traits;
pub mod typification;

pub use clarification::{ClarificationKind, ClarificationRequest, ANSWER_HINT_RATIO};
pub use error::{Error, Result};
pub use escalation::{EscalationSignal, EscalationTrend, RecommendedAction, MAX_ESCALATION_LEVEL};
pub use hierarchy::{Hierarchy, HierarchyNode};
pub use routing::{RoutingDecision, UNKNOWN_UNIT};
pub use session::SessionContext;
pub use typification::{HierarchyLevel, TypificationPath, ValidationResult, CONCLUSION};

// Trait re-exports
pub use traits::{ClassificationOracle, CorrectionNote, OracleRequest, OracleVerdict};
