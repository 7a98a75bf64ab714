//! Escalation Lexicon
//!
//! Phrase lists used by the escalation detector. Phrases are matched against
//! lowercased, whitespace-normalized text.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Lexicon loaded from escalation.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EscalationLexicon {
    /// Explicit requests for a human agent; short-circuit to the top level
    #[serde(default)]
    pub explicit_requests: Vec<String>,
    /// Giving-up phrases; also short-circuit
    #[serde(default)]
    pub giving_up: Vec<String>,
    /// Weighted x3
    #[serde(default)]
    pub high_severity: Vec<String>,
    /// Weighted x2
    #[serde(default)]
    pub medium_severity: Vec<String>,
    /// Weighted x1
    #[serde(default)]
    pub low_severity: Vec<String>,
}

impl EscalationLexicon {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        crate::read_yaml(path.as_ref())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Weighted term tiers, heaviest first
    pub fn weighted_tiers(&self) -> [(&[String], u32); 3] {
        [
            (self.high_severity.as_slice(), 3),
            (self.medium_severity.as_slice(), 2),
            (self.low_severity.as_slice(), 1),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.explicit_requests.is_empty()
            && self.giving_up.is_empty()
            && self.high_severity.is_empty()
            && self.medium_severity.is_empty()
            && self.low_severity.is_empty()
    }

    /// Total number of phrases across all lists
    pub fn len(&self) -> usize {
        self.explicit_requests.len()
            + self.giving_up.len()
            + self.high_severity.len()
            + self.medium_severity.len()
            + self.low_severity.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_tiers() {
        let yaml = r#"
explicit_requests: ["atendente humano"]
giving_up: ["desisto"]
high_severity: ["absurdo", "procon"]
low_severity: ["problema"]
"#;
        let lexicon = EscalationLexicon::from_yaml_str(yaml).unwrap();
        assert_eq!(lexicon.len(), 5);
        assert!(!lexicon.is_empty());

        let tiers = lexicon.weighted_tiers();
        assert_eq!(tiers[0].1, 3);
        assert_eq!(tiers[0].0.len(), 2);
        assert!(tiers[1].0.is_empty());
        assert_eq!(tiers[2].0, &["problema".to_string()]);
    }

    #[test]
    fn test_default_is_empty() {
        assert!(EscalationLexicon::default().is_empty());
    }
}
