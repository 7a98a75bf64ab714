//! Escalation signal types
//!
//! An escalation signal summarizes how frustrated or urgent a single message is
//! and whether a human operator should take over.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Highest escalation level
pub const MAX_ESCALATION_LEVEL: u8 = 3;

/// What the orchestration layer should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    /// Carry on with the normal flow
    Continue,
    /// Acknowledge the difficulty in the next reply
    Acknowledge,
    /// Respond with explicit empathy and simplify
    Empathize,
    /// Hand over to a human operator
    Escalate,
}

impl RecommendedAction {
    /// Action for an escalation level (levels above 3 saturate)
    pub fn for_level(level: u8) -> Self {
        match level {
            0 => RecommendedAction::Continue,
            1 => RecommendedAction::Acknowledge,
            2 => RecommendedAction::Empathize,
            _ => RecommendedAction::Escalate,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RecommendedAction::Continue => "Continue",
            RecommendedAction::Acknowledge => "Acknowledge",
            RecommendedAction::Empathize => "Empathize",
            RecommendedAction::Escalate => "Escalate",
        }
    }
}

/// Escalation signal for one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationSignal {
    /// 0..=3
    pub level: u8,
    /// Customer explicitly asked for a human
    pub explicit_request: bool,
    /// Customer said they are giving up
    pub giving_up: bool,
    pub detected_terms: BTreeSet<String>,
    pub emotional_indicators: BTreeSet<String>,
    pub recommended_action: RecommendedAction,
}

impl EscalationSignal {
    /// Signal with no frustration at all
    pub fn calm() -> Self {
        Self::from_level(0)
    }

    /// Signal whose action follows the level
    pub fn from_level(level: u8) -> Self {
        let level = level.min(MAX_ESCALATION_LEVEL);
        Self {
            level,
            explicit_request: false,
            giving_up: false,
            detected_terms: BTreeSet::new(),
            emotional_indicators: BTreeSet::new(),
            recommended_action: RecommendedAction::for_level(level),
        }
    }

    /// Customer asked for a human operator
    pub fn explicit(phrase: impl Into<String>) -> Self {
        let mut signal = Self::from_level(MAX_ESCALATION_LEVEL);
        signal.explicit_request = true;
        signal.detected_terms.insert(phrase.into());
        signal
    }

    /// Customer is giving up on the conversation
    pub fn giving_up(phrase: impl Into<String>) -> Self {
        let mut signal = Self::from_level(MAX_ESCALATION_LEVEL);
        signal.giving_up = true;
        signal.detected_terms.insert(phrase.into());
        signal
    }

    /// Whether a human should take over
    pub fn requires_handoff(&self) -> bool {
        self.recommended_action == RecommendedAction::Escalate
    }
}

/// Advisory trend over the most recent escalation levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationTrend {
    /// Last three levels are non-decreasing
    pub escalating: bool,
    /// Mean of the last three levels is at least 2
    pub consistently_high: bool,
}
