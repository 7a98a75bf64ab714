//! Routing decision produced for every inbound message

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Primary unit reported when no category scored
pub const UNKNOWN_UNIT: &str = "unknown";

/// Where an inbound message should go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// Winning category, or [`UNKNOWN_UNIT`]
    pub primary_unit: String,
    /// Normalized top score in [0, 1]
    pub confidence: f32,
    /// Up to three runner-up categories with a positive score, best first
    pub alternative_units: Vec<String>,
    /// Whether the caller should ask a clarifying question
    pub requires_clarification: bool,
    pub detected_keywords: BTreeSet<String>,
    pub detected_intents: BTreeSet<String>,
    /// Ambiguous keywords whose weight was split across categories
    pub ambiguous_terms: BTreeSet<String>,
    /// Audit string; never used for control flow
    pub reasoning: String,
}

impl RoutingDecision {
    /// Decision for a message that matched nothing
    pub fn unknown(reasoning: impl Into<String>) -> Self {
        Self {
            primary_unit: UNKNOWN_UNIT.to_string(),
            confidence: 0.0,
            alternative_units: Vec::new(),
            requires_clarification: false,
            detected_keywords: BTreeSet::new(),
            detected_intents: BTreeSet::new(),
            ambiguous_terms: BTreeSet::new(),
            reasoning: reasoning.into(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.primary_unit == UNKNOWN_UNIT
    }
}
