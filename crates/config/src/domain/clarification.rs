//! Clarification Rules
//!
//! Question templates and trigger lists for the clarification planner.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Clarification rules loaded from clarification.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClarificationConfig {
    /// Fallback questions when no incomplete pattern matches
    #[serde(default)]
    pub generic_questions: Vec<String>,
    /// Very short messages, matched by regex
    #[serde(default)]
    pub incomplete_patterns: Vec<PatternQuestions>,
    /// Standalone terms too vague to route on
    #[serde(default)]
    pub ambiguous_terms: Vec<AmbiguousTerm>,
    /// Requests that lack a critical detail
    #[serde(default)]
    pub missing_detail_rules: Vec<MissingDetailRule>,
    /// Terms that need a modifier to be understood
    #[serde(default)]
    pub context_terms: Vec<ContextTerm>,
    /// Question asked when routing is ambiguous; `{first}` and `{second}` are unit names
    #[serde(default = "default_unit_choice_template")]
    pub unit_choice_template: String,
    /// Replies containing one of these answer a pending clarification
    #[serde(default = "default_yes_no_tokens")]
    pub yes_no_tokens: Vec<String>,
}

fn default_unit_choice_template() -> String {
    "Sua solicitação é sobre {first} ou {second}?".to_string()
}

fn default_yes_no_tokens() -> Vec<String> {
    ["sim", "não", "nao", "isso", "exato"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ClarificationConfig {
    fn default() -> Self {
        Self {
            generic_questions: Vec::new(),
            incomplete_patterns: Vec::new(),
            ambiguous_terms: Vec::new(),
            missing_detail_rules: Vec::new(),
            context_terms: Vec::new(),
            unit_choice_template: default_unit_choice_template(),
            yes_no_tokens: default_yes_no_tokens(),
        }
    }
}

impl ClarificationConfig {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        crate::read_yaml(path.as_ref())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Render the unit choice question
    pub fn unit_choice_question(&self, first: &str, second: &str) -> String {
        self.unit_choice_template
            .replace("{first}", first)
            .replace("{second}", second)
    }
}

/// Regex with the questions it triggers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternQuestions {
    pub pattern: String,
    pub questions: Vec<String>,
    #[serde(default)]
    pub hints: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbiguousTerm {
    pub term: String,
    pub questions: Vec<String>,
    #[serde(default)]
    pub hints: Vec<String>,
}

/// Fires when `trigger` matches and none of `satisfied_by` do
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingDetailRule {
    pub name: String,
    pub trigger: String,
    #[serde(default)]
    pub satisfied_by: Vec<String>,
    pub questions: Vec<String>,
    #[serde(default)]
    pub hints: Vec<String>,
}

/// Term that is unclear without one of its modifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextTerm {
    pub term: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub questions: Vec<String>,
    #[serde(default)]
    pub hints: Vec<String>,
}
