//! Typification results
//!
//! [`DraftTypification`] accumulates oracle choices while the pipeline runs.
//! [`HierarchicalTypification`] can only be built from a draft whose path
//! exists in the hierarchy.

use std::collections::BTreeMap;

use serde::Serialize;
use triage_core::{HierarchyLevel, OracleVerdict, TypificationPath, ValidationResult, CONCLUSION};

use crate::validator::TypificationValidator;

/// Choices recorded so far, valid or not
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DraftTypification {
    pub path: TypificationPath,
    pub confidences: BTreeMap<HierarchyLevel, f32>,
    pub rationales: BTreeMap<HierarchyLevel, String>,
}

impl DraftTypification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the oracle's answer for a level
    pub fn record(&mut self, level: HierarchyLevel, verdict: OracleVerdict) {
        self.path.set(level, verdict.choice);
        self.confidences.insert(level, verdict.confidence);
        if verdict.rationale.is_empty() {
            self.rationales.remove(&level);
        } else {
            self.rationales.insert(level, verdict.rationale);
        }
    }

    /// Forget every choice strictly below `level`
    pub fn clear_below(&mut self, level: HierarchyLevel) {
        self.path.clear_below(level);
        self.confidences.retain(|l, _| *l <= level);
        self.rationales.retain(|l, _| *l <= level);
    }

    pub fn confidence(&self, level: HierarchyLevel) -> Option<f32> {
        self.confidences.get(&level).copied()
    }
}

/// Validated outcome of a finished conversation
///
/// The four labels always form a path that exists in the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchicalTypification {
    business_unit: String,
    product: String,
    motive: String,
    submotive: String,
    conclusion: &'static str,
    per_level_confidence: BTreeMap<HierarchyLevel, f32>,
    rationales: BTreeMap<HierarchyLevel, String>,
    retry_used: bool,
    original_values: Option<TypificationPath>,
}

impl HierarchicalTypification {
    /// Build from a draft, or return why its path is invalid
    ///
    /// `original_values` is the rejected path when a correction produced the
    /// draft; its presence marks the typification as retried.
    pub fn try_new(
        validator: &TypificationValidator,
        draft: DraftTypification,
        original_values: Option<TypificationPath>,
    ) -> Result<Self, ValidationResult> {
        let validation = validator.validate(&draft.path);
        if !validation.valid {
            return Err(validation);
        }

        let DraftTypification {
            path,
            confidences,
            rationales,
        } = draft;

        Ok(Self {
            business_unit: path.business_unit,
            product: path.product,
            motive: path.motive,
            submotive: path.submotive,
            conclusion: CONCLUSION,
            per_level_confidence: confidences,
            rationales,
            retry_used: original_values.is_some(),
            original_values,
        })
    }

    pub fn business_unit(&self) -> &str {
        &self.business_unit
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn motive(&self) -> &str {
        &self.motive
    }

    pub fn submotive(&self) -> &str {
        &self.submotive
    }

    /// Always [`CONCLUSION`]
    pub fn conclusion(&self) -> &'static str {
        self.conclusion
    }

    pub fn path(&self) -> TypificationPath {
        TypificationPath::new(
            &self.business_unit,
            &self.product,
            &self.motive,
            &self.submotive,
        )
    }

    /// Confidence per level, as reported (never averaged)
    pub fn per_level_confidence(&self) -> &BTreeMap<HierarchyLevel, f32> {
        &self.per_level_confidence
    }

    pub fn confidence(&self, level: HierarchyLevel) -> Option<f32> {
        self.per_level_confidence.get(&level).copied()
    }

    pub fn rationale(&self, level: HierarchyLevel) -> Option<&str> {
        self.rationales.get(&level).map(String::as_str)
    }

    pub fn retry_used(&self) -> bool {
        self.retry_used
    }

    /// Rejected path, present only when a correction was accepted
    pub fn original_values(&self) -> Option<&TypificationPath> {
        self.original_values.as_ref()
    }
}

/// Proposed path that could not be validated, even after correction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnvalidatedTypification {
    pub path: TypificationPath,
    pub confidences: BTreeMap<HierarchyLevel, f32>,
    pub validation: ValidationResult,
    /// Always false: a retry only counts when its result was accepted
    pub retry_used: bool,
    pub correction_failed: bool,
}

impl UnvalidatedTypification {
    pub fn new(draft: DraftTypification, validation: ValidationResult) -> Self {
        Self {
            path: draft.path,
            confidences: draft.confidences,
            validation,
            retry_used: false,
            correction_failed: true,
        }
    }
}

/// Result of a pipeline run that reached validation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Validated(HierarchicalTypification),
    Unvalidated(UnvalidatedTypification),
}

impl PipelineOutcome {
    pub fn is_validated(&self) -> bool {
        matches!(self, PipelineOutcome::Validated(_))
    }

    pub fn typification(&self) -> Option<&HierarchicalTypification> {
        match self {
            PipelineOutcome::Validated(t) => Some(t),
            PipelineOutcome::Unvalidated(_) => None,
        }
    }

    pub fn into_typification(self) -> Option<HierarchicalTypification> {
        match self {
            PipelineOutcome::Validated(t) => Some(t),
            PipelineOutcome::Unvalidated(_) => None,
        }
    }

    pub fn retry_used(&self) -> bool {
        match self {
            PipelineOutcome::Validated(t) => t.retry_used(),
            PipelineOutcome::Unvalidated(u) => u.retry_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use triage_core::{Hierarchy, HierarchyNode};

    fn validator() -> TypificationValidator {
        let hierarchy = Hierarchy::new(vec![HierarchyNode::new(
            "Adquirência",
            vec![HierarchyNode::new(
                "Recebimentos",
                vec![HierarchyNode::new(
                    "Antecipação",
                    vec![
                        HierarchyNode::leaf("Solicitar antecipação"),
                        HierarchyNode::leaf("Taxa de antecipação"),
                    ],
                )],
            )],
        )])
        .unwrap();
        TypificationValidator::new(Arc::new(hierarchy))
    }

    fn draft(submotive: &str) -> DraftTypification {
        let mut draft = DraftTypification::new();
        draft.record(HierarchyLevel::BusinessUnit, OracleVerdict::new("Adquirência", 0.9, "vendas"));
        draft.record(HierarchyLevel::Product, OracleVerdict::new("Recebimentos", 0.8, ""));
        draft.record(HierarchyLevel::Motive, OracleVerdict::new("Antecipação", 0.85, ""));
        draft.record(HierarchyLevel::Submotive, OracleVerdict::new(submotive, 0.7, ""));
        draft
    }

    #[test]
    fn test_valid_draft_builds() {
        let t = HierarchicalTypification::try_new(&validator(), draft("Solicitar antecipação"), None)
            .unwrap();
        assert_eq!(t.business_unit(), "Adquirência");
        assert_eq!(t.submotive(), "Solicitar antecipação");
        assert_eq!(t.conclusion(), CONCLUSION);
        assert_eq!(t.confidence(HierarchyLevel::Product), Some(0.8));
        assert_eq!(t.per_level_confidence().len(), 4);
        assert_eq!(t.rationale(HierarchyLevel::BusinessUnit), Some("vendas"));
        assert_eq!(t.rationale(HierarchyLevel::Motive), None);
        assert!(!t.retry_used());
        assert!(t.original_values().is_none());
    }

    #[test]
    fn test_invalid_draft_rejected() {
        let err = HierarchicalTypification::try_new(&validator(), draft("Cancelar"), None)
            .unwrap_err();
        assert_eq!(err.level_reached, 4);
        assert_eq!(
            err.suggested_corrections,
            vec!["Solicitar antecipação", "Taxa de antecipação"]
        );
    }

    #[test]
    fn test_original_values_mark_retry() {
        let original = draft("Cancelar").path;
        let t = HierarchicalTypification::try_new(
            &validator(),
            draft("Taxa de antecipação"),
            Some(original.clone()),
        )
        .unwrap();
        assert!(t.retry_used());
        assert_eq!(t.original_values(), Some(&original));
    }

    #[test]
    fn test_clear_below() {
        let mut d = draft("Cancelar");
        d.clear_below(HierarchyLevel::Product);
        assert_eq!(d.path.motive, "");
        assert_eq!(d.path.submotive, "");
        assert_eq!(d.confidences.len(), 2);
        assert_eq!(d.confidence(HierarchyLevel::Motive), None);
        assert_eq!(d.rationales.len(), 1);
    }

    #[test]
    fn test_outcome_serializes_with_status() {
        let t = HierarchicalTypification::try_new(&validator(), draft("Taxa de antecipação"), None)
            .unwrap();
        let json = serde_json::to_value(PipelineOutcome::Validated(t)).unwrap();
        assert_eq!(json["status"], "validated");
        assert_eq!(json["conclusion"], CONCLUSION);
        assert!(json["per_level_confidence"]["business_unit"].is_number());
    }
}
