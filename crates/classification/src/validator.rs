//! Typification validator
//!
//! Walks a proposed path level by level against the hierarchy and reports the
//! first label that is not a child of its parent, together with the parent's
//! full set of valid children.

use std::sync::Arc;

use triage_core::{Hierarchy, HierarchyLevel, TypificationPath, ValidationResult};

/// Validates 4-label paths against a shared hierarchy
#[derive(Debug, Clone)]
pub struct TypificationValidator {
    hierarchy: Arc<Hierarchy>,
}

impl TypificationValidator {
    pub fn new(hierarchy: Arc<Hierarchy>) -> Self {
        Self { hierarchy }
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Check a path, reporting the first invalid level
    pub fn validate(&self, path: &TypificationPath) -> ValidationResult {
        for level in HierarchyLevel::ALL {
            // Earlier levels passed, so the prefix always resolves
            let options = self.hierarchy.options_for(path, level).unwrap_or_default();
            let label = path.get(level);

            if !options.iter().any(|o| o == label) {
                let message = rejection_message(path, level);
                tracing::debug!(
                    level = %level,
                    label = %label,
                    options = options.len(),
                    "Path rejected"
                );
                return ValidationResult::invalid(level, message, options);
            }
        }
        ValidationResult::valid()
    }

    /// Whether a path is fully valid
    pub fn is_valid(&self, path: &TypificationPath) -> bool {
        self.validate(path).valid
    }
}

fn rejection_message(path: &TypificationPath, level: HierarchyLevel) -> String {
    let label = path.get(level);
    let shown = if label.is_empty() { "<empty>" } else { label };
    match path.prefix(level).last() {
        Some(parent) => format!("'{}' is not a valid {} under '{}'", shown, level, parent),
        None => format!("'{}' is not a valid {}", shown, level),
    }
}
