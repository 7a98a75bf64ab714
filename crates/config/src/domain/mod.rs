//! Domain rule tables
//!
//! Each table maps to one YAML file in the domain directory. Tables are
//! immutable once loaded and are shared read-only by the engine components.

mod clarification;
mod escalation;
mod hierarchy;
mod master;
mod routing;
mod validator;

pub use clarification::{
    AmbiguousTerm, ClarificationConfig, ContextTerm, MissingDetailRule, PatternQuestions,
};
pub use escalation::EscalationLexicon;
pub use hierarchy::{BusinessUnitEntry, HierarchyConfig, MotiveEntry, ProductEntry};
pub use master::{
    DomainConfig, CLARIFICATION_FILE, ESCALATION_FILE, HIERARCHY_FILE, ROUTING_FILE,
};
pub use routing::{
    AmbiguousKeyword, CategoryBoost, CategoryRules, ContextBoostConfig, IntentRule,
    RoutingRulesConfig,
};
pub use validator::{
    ConfigValidator, ValidationCategory, ValidationError, ValidationReport, ValidationSeverity,
};
