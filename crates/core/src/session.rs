//! Session context supplied by the orchestration layer
//!
//! The core never owns session state. Callers pass a snapshot in per call.

use serde::{Deserialize, Serialize};

/// Read-only session snapshot used by routing and clarification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Unit the previous message was routed to
    #[serde(default)]
    pub last_topic: Option<String>,
    /// Customer is a merchant (acquiring client)
    #[serde(default)]
    pub is_merchant: bool,
    /// Customer reported card problems recently
    #[serde(default)]
    pub recent_card_issues: bool,
    #[serde(default)]
    pub interaction_count: u32,
    #[serde(default)]
    pub failed_attempts: u32,
    /// Highest escalation level seen so far in the session
    #[serde(default)]
    pub frustration_level: u8,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_last_topic(mut self, topic: impl Into<String>) -> Self {
        self.last_topic = Some(topic.into());
        self
    }

    pub fn with_merchant(mut self, is_merchant: bool) -> Self {
        self.is_merchant = is_merchant;
        self
    }

    pub fn with_recent_card_issues(mut self, recent: bool) -> Self {
        self.recent_card_issues = recent;
        self
    }

    pub fn with_counters(mut self, interaction_count: u32, failed_attempts: u32) -> Self {
        self.interaction_count = interaction_count;
        self.failed_attempts = failed_attempts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let ctx = SessionContext::new()
            .with_last_topic("acquiring")
            .with_merchant(true)
            .with_counters(3, 1);

        assert_eq!(ctx.last_topic.as_deref(), Some("acquiring"));
        assert!(ctx.is_merchant);
        assert!(!ctx.recent_card_issues);
        assert_eq!(ctx.interaction_count, 3);
        assert_eq!(ctx.failed_attempts, 1);
    }

    #[test]
    fn test_deserialize_partial() {
        let ctx: SessionContext = serde_json::from_str(r#"{"is_merchant": true}"#).unwrap();
        assert!(ctx.is_merchant);
        assert_eq!(ctx.frustration_level, 0);
        assert!(ctx.last_topic.is_none());
    }
}
