//! Domain Configuration
//!
//! Aggregates the rule tables of one domain directory. All four files are
//! required; a missing or malformed table fails startup.

use std::path::Path;

use triage_core::Hierarchy;

use super::{ClarificationConfig, EscalationLexicon, HierarchyConfig, RoutingRulesConfig};
use crate::ConfigError;

pub const ROUTING_FILE: &str = "routing.yaml";
pub const HIERARCHY_FILE: &str = "hierarchy.yaml";
pub const ESCALATION_FILE: &str = "escalation.yaml";
pub const CLARIFICATION_FILE: &str = "clarification.yaml";

/// All rule tables for one domain
#[derive(Debug, Clone, Default)]
pub struct DomainConfig {
    /// Directory name, e.g. "payments"
    pub domain_id: String,
    pub routing: RoutingRulesConfig,
    pub hierarchy: HierarchyConfig,
    pub escalation: EscalationLexicon,
    pub clarification: ClarificationConfig,
}

impl DomainConfig {
    /// Load every table from `dir`
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ConfigError::FileNotFound(dir.display().to_string()));
        }

        let domain_id = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let routing = RoutingRulesConfig::load(dir.join(ROUTING_FILE))?;
        tracing::info!(
            categories = routing.categories.len(),
            ambiguous_keywords = routing.ambiguous_keywords.len(),
            "Loaded routing rules"
        );

        let hierarchy = HierarchyConfig::load(dir.join(HIERARCHY_FILE))?;
        tracing::info!(
            business_units = hierarchy.business_units.len(),
            "Loaded outcome hierarchy"
        );

        let escalation = EscalationLexicon::load(dir.join(ESCALATION_FILE))?;
        tracing::info!(phrases = escalation.len(), "Loaded escalation lexicon");

        let clarification = ClarificationConfig::load(dir.join(CLARIFICATION_FILE))?;
        tracing::info!(
            ambiguous_terms = clarification.ambiguous_terms.len(),
            context_terms = clarification.context_terms.len(),
            "Loaded clarification rules"
        );

        Ok(Self {
            domain_id,
            routing,
            hierarchy,
            escalation,
            clarification,
        })
    }

    /// Load and run the startup validator
    ///
    /// Critical issues always fail; in strict mode (staging, production) plain
    /// errors fail too.
    pub fn load_validated(dir: impl AsRef<Path>, strict: bool) -> Result<Self, ConfigError> {
        let config = Self::load_dir(dir)?;
        let report = super::ConfigValidator::new().validate(&config);
        for issue in &report.errors {
            tracing::warn!(%issue, "Domain configuration issue");
        }
        if !report.passes(strict) {
            return Err(ConfigError::Validation(report.summary()));
        }
        Ok(config)
    }

    /// Build the hierarchy store from the loaded table
    pub fn build_hierarchy(&self) -> Result<Hierarchy, ConfigError> {
        self.hierarchy.build()
    }
}
