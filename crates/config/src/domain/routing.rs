//! Routing Rules Configuration
//!
//! Keyword, pattern and intent rules per routing category, loaded from
//! routing.yaml. Categories are kept in file order.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Routing rules loaded from routing.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingRulesConfig {
    /// Category rule sets, in file order
    #[serde(default)]
    pub categories: Vec<CategoryRules>,
    /// Keywords shared by several categories
    #[serde(default)]
    pub ambiguous_keywords: Vec<AmbiguousKeyword>,
    /// Session-driven score boosts
    #[serde(default)]
    pub context_boosts: ContextBoostConfig,
}

impl RoutingRulesConfig {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        crate::read_yaml(path.as_ref())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Category by name
    pub fn category(&self, name: &str) -> Option<&CategoryRules> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// Display name for a category, falling back to its id
    pub fn display_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.category(name)
            .and_then(|c| c.display_name.as_deref())
            .unwrap_or(name)
    }
}

/// Rules for one routing category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRules {
    /// Category identifier (e.g. "acquiring")
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Business unit label in the outcome hierarchy
    #[serde(default)]
    pub business_unit: Option<String>,
    /// Matched by substring containment
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Regular expressions matched by search
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub intents: Vec<IntentRule>,
}

/// Intent matched when any trigger phrase is contained in the text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRule {
    pub name: String,
    pub triggers: Vec<String>,
}

/// Keyword whose weight is split across several categories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbiguousKeyword {
    pub keyword: String,
    pub categories: Vec<String>,
}

/// Named score boosts derived from session context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextBoostConfig {
    /// Added to the category the session was last routed to
    #[serde(default = "default_last_topic_boost")]
    pub last_topic: f32,
    /// Applied when the customer is a merchant
    #[serde(default)]
    pub merchant: Option<CategoryBoost>,
    /// Applied when the customer reported card issues recently
    #[serde(default)]
    pub recent_card_issues: Option<CategoryBoost>,
}

fn default_last_topic_boost() -> f32 {
    1.0
}

impl Default for ContextBoostConfig {
    fn default() -> Self {
        Self {
            last_topic: default_last_topic_boost(),
            merchant: None,
            recent_card_issues: None,
        }
    }
}

/// Additive boost for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBoost {
    pub category: String,
    pub boost: f32,
}
