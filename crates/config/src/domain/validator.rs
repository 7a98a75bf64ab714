//! Config Validator for Domain Configuration
//!
//! Validates the rule tables at startup to catch errors early:
//! - Required tables are non-empty
//! - Regular expressions compile
//! - Cross-references (ambiguous keywords, context boosts, business units)
//! - Hierarchy shape
//!
//! # Example
//!
//! ```ignore
//! use triage_config::{ConfigValidator, DomainConfig};
//!
//! let config = DomainConfig::load_dir("config/domains/payments")?;
//! let report = ConfigValidator::new().validate(&config);
//! assert!(report.is_ok(), "{}", report.summary());
//! ```

use regex::Regex;
use std::collections::HashSet;

use super::DomainConfig;

/// Validation error with context
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: ValidationCategory,
    /// Source file
    pub source: String,
    /// Specific field or entry
    pub field: Option<String>,
    pub message: String,
    pub severity: ValidationSeverity,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let field_str = self.field.as_deref().unwrap_or("(root)");
        write!(
            f,
            "[{:?}] {}/{}: {}",
            self.severity, self.source, field_str, self.message
        )
    }
}

impl std::error::Error for ValidationError {}

/// Category of validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCategory {
    MissingRequired,
    InvalidReference,
    /// Regex that does not compile
    InvalidPattern,
    Duplicate,
    /// Hierarchy branch with an empty level
    SchemaMismatch,
    /// Rule that can never fire (warning)
    Unused,
}

/// Severity of validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Warning,
    Error,
    /// Will prevent startup
    Critical,
}

/// Outcome of validating one domain
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub domain: String,
}

impl ValidationReport {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            errors: Vec::new(),
            domain: domain.into(),
        }
    }

    fn push(
        &mut self,
        category: ValidationCategory,
        severity: ValidationSeverity,
        source: &str,
        field: Option<&str>,
        message: impl Into<String>,
    ) {
        self.errors.push(ValidationError {
            category,
            source: source.to_string(),
            field: field.map(str::to_string),
            message: message.into(),
            severity,
        });
    }

    pub fn add_critical(&mut self, source: &str, message: impl Into<String>) {
        self.push(
            ValidationCategory::MissingRequired,
            ValidationSeverity::Critical,
            source,
            None,
            message,
        );
    }

    pub fn add_reference_error(&mut self, source: &str, field: &str, message: impl Into<String>) {
        self.push(
            ValidationCategory::InvalidReference,
            ValidationSeverity::Error,
            source,
            Some(field),
            message,
        );
    }

    pub fn add_warning(&mut self, source: &str, field: &str, message: impl Into<String>) {
        self.push(
            ValidationCategory::Unused,
            ValidationSeverity::Warning,
            source,
            Some(field),
            message,
        );
    }

    /// No critical errors
    pub fn is_ok(&self) -> bool {
        !self
            .errors
            .iter()
            .any(|e| e.severity == ValidationSeverity::Critical)
    }

    /// Strict mode also rejects plain errors
    pub fn passes(&self, strict: bool) -> bool {
        if strict {
            self.errors_and_critical().is_empty()
        } else {
            self.is_ok()
        }
    }

    pub fn critical_errors(&self) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|e| e.severity == ValidationSeverity::Critical)
            .collect()
    }

    /// Errors and critical errors (not warnings)
    pub fn errors_and_critical(&self) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|e| e.severity >= ValidationSeverity::Error)
            .collect()
    }

    pub fn summary(&self) -> String {
        let count = |s: ValidationSeverity| self.errors.iter().filter(|e| e.severity == s).count();

        if self.errors.is_empty() {
            format!("Domain '{}': All validations passed", self.domain)
        } else {
            format!(
                "Domain '{}': {} critical, {} errors, {} warnings",
                self.domain,
                count(ValidationSeverity::Critical),
                count(ValidationSeverity::Error),
                count(ValidationSeverity::Warning)
            )
        }
    }
}

/// Startup validator for domain rule tables
pub struct ConfigValidator {
    include_warnings: bool,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    pub fn new() -> Self {
        Self {
            include_warnings: true,
        }
    }

    pub fn with_warnings(mut self, include: bool) -> Self {
        self.include_warnings = include;
        self
    }

    /// Validate a loaded domain
    pub fn validate(&self, config: &DomainConfig) -> ValidationReport {
        let mut report = ValidationReport::new(&config.domain_id);

        self.validate_routing(config, &mut report);
        self.validate_hierarchy(config, &mut report);
        self.validate_escalation(config, &mut report);
        self.validate_clarification(config, &mut report);
        self.validate_cross_references(config, &mut report);

        if !self.include_warnings {
            report
                .errors
                .retain(|e| e.severity != ValidationSeverity::Warning);
        }

        tracing::debug!(summary = %report.summary(), "Validated domain configuration");
        report
    }

    fn validate_routing(&self, config: &DomainConfig, report: &mut ValidationReport) {
        const SOURCE: &str = "routing.yaml";
        let routing = &config.routing;

        if routing.categories.is_empty() {
            report.add_critical(SOURCE, "No routing categories defined");
            return;
        }

        let mut seen = HashSet::new();
        for category in &routing.categories {
            if !seen.insert(category.name.as_str()) {
                report.push(
                    ValidationCategory::Duplicate,
                    ValidationSeverity::Critical,
                    SOURCE,
                    Some(&category.name),
                    "Duplicate category name",
                );
            }

            if category.keywords.is_empty()
                && category.patterns.is_empty()
                && category.intents.is_empty()
            {
                report.add_warning(SOURCE, &category.name, "Category has no rules and never scores");
            }

            for pattern in &category.patterns {
                check_regex(report, SOURCE, &category.name, pattern);
            }

            for intent in &category.intents {
                if intent.triggers.is_empty() {
                    report.add_warning(
                        SOURCE,
                        &format!("{}.{}", category.name, intent.name),
                        "Intent has no trigger phrases",
                    );
                }
            }
        }

        for ambiguous in &routing.ambiguous_keywords {
            if ambiguous.categories.len() < 2 {
                report.add_reference_error(
                    SOURCE,
                    &ambiguous.keyword,
                    "Ambiguous keyword must be shared by at least two categories",
                );
            }
            for name in &ambiguous.categories {
                if routing.category(name).is_none() {
                    report.add_reference_error(
                        SOURCE,
                        &ambiguous.keyword,
                        format!("References unknown category: {}", name),
                    );
                }
            }
        }

        let boosts = &routing.context_boosts;
        for (field, boost) in [
            ("context_boosts.merchant", &boosts.merchant),
            ("context_boosts.recent_card_issues", &boosts.recent_card_issues),
        ] {
            if let Some(boost) = boost {
                if routing.category(&boost.category).is_none() {
                    report.add_reference_error(
                        SOURCE,
                        field,
                        format!("References unknown category: {}", boost.category),
                    );
                }
            }
        }
    }

    fn validate_hierarchy(&self, config: &DomainConfig, report: &mut ValidationReport) {
        const SOURCE: &str = "hierarchy.yaml";
        let hierarchy = &config.hierarchy;

        if hierarchy.business_units.is_empty() {
            report.add_critical(SOURCE, "No business units defined");
            return;
        }

        for bu in &hierarchy.business_units {
            if bu.products.is_empty() {
                report.push(
                    ValidationCategory::SchemaMismatch,
                    ValidationSeverity::Critical,
                    SOURCE,
                    Some(&bu.label),
                    "Business unit has no products",
                );
            }
            for product in &bu.products {
                for motive in &product.motives {
                    if motive.submotives.is_empty() {
                        report.push(
                            ValidationCategory::SchemaMismatch,
                            ValidationSeverity::Critical,
                            SOURCE,
                            Some(&format!("{} > {} > {}", bu.label, product.label, motive.label)),
                            "Motive has no submotives",
                        );
                    }
                }
            }
        }

        // Catches duplicates, empty labels and empty product levels
        if let Err(e) = hierarchy.build() {
            report.push(
                ValidationCategory::SchemaMismatch,
                ValidationSeverity::Critical,
                SOURCE,
                None,
                e.to_string(),
            );
        }
    }

    fn validate_escalation(&self, config: &DomainConfig, report: &mut ValidationReport) {
        const SOURCE: &str = "escalation.yaml";
        let lexicon = &config.escalation;

        if lexicon.is_empty() {
            report.add_critical(SOURCE, "Escalation lexicon is empty");
            return;
        }
        if lexicon.explicit_requests.is_empty() {
            report.add_reference_error(
                SOURCE,
                "explicit_requests",
                "No explicit handoff phrases; customers cannot ask for a human",
            );
        }

        let mut seen = HashSet::new();
        for (tier, _) in lexicon.weighted_tiers() {
            for term in tier {
                if !seen.insert(term.to_lowercase()) {
                    report.add_warning(SOURCE, term, "Term listed in more than one tier");
                }
            }
        }
    }

    fn validate_clarification(&self, config: &DomainConfig, report: &mut ValidationReport) {
        const SOURCE: &str = "clarification.yaml";
        let clarification = &config.clarification;

        if clarification.generic_questions.is_empty() {
            report.add_reference_error(
                SOURCE,
                "generic_questions",
                "No generic fallback questions",
            );
        }
        if clarification.yes_no_tokens.is_empty() {
            report.add_warning(SOURCE, "yes_no_tokens", "Empty; only hint echoes answer a clarification");
        }
        if !clarification.unit_choice_template.contains("{first}")
            || !clarification.unit_choice_template.contains("{second}")
        {
            report.add_reference_error(
                SOURCE,
                "unit_choice_template",
                "Template must contain {first} and {second}",
            );
        }

        for rule in &clarification.incomplete_patterns {
            check_regex(report, SOURCE, "incomplete_patterns", &rule.pattern);
        }
        for rule in &clarification.missing_detail_rules {
            check_regex(report, SOURCE, &rule.name, &rule.trigger);
            for pattern in &rule.satisfied_by {
                check_regex(report, SOURCE, &rule.name, pattern);
            }
        }
        for term in &clarification.context_terms {
            if term.modifiers.is_empty() {
                report.add_warning(
                    SOURCE,
                    &term.term,
                    "Context term without modifiers always asks for clarification",
                );
            }
        }
    }

    fn validate_cross_references(&self, config: &DomainConfig, report: &mut ValidationReport) {
        let units: HashSet<&str> = config.hierarchy.business_unit_labels().into_iter().collect();

        for category in &config.routing.categories {
            match &category.business_unit {
                Some(unit) if !units.contains(unit.as_str()) => {
                    report.add_reference_error(
                        "routing.yaml",
                        &category.name,
                        format!("Business unit '{}' is not in hierarchy.yaml", unit),
                    );
                }
                None => {
                    report.add_warning(
                        "routing.yaml",
                        &category.name,
                        "Category is not mapped to a business unit",
                    );
                }
                _ => {}
            }
        }
    }
}

fn check_regex(report: &mut ValidationReport, source: &str, field: &str, pattern: &str) {
    if let Err(e) = Regex::new(pattern) {
        report.push(
            ValidationCategory::InvalidPattern,
            ValidationSeverity::Critical,
            source,
            Some(field),
            format!("Invalid regex '{}': {}", pattern, e),
        );
    }
}
