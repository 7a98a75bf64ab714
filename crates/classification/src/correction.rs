//! Correction controller
//!
//! Gives a rejected path exactly one more oracle call, scoped to the failing
//! level's valid options. Levels below the corrected one are chosen again
//! because their options depend on it.

use std::sync::Arc;

use triage_core::{
    ClassificationOracle, CorrectionNote, HierarchyLevel, OracleRequest, OracleVerdict,
    ValidationResult,
};

use crate::error::CorrectionFailure;
use crate::metric_names::{CORRECTIONS_TOTAL, ORACLE_FAILURES_TOTAL};
use crate::pipeline::descend;
use crate::typification::{DraftTypification, HierarchicalTypification};
use crate::validator::TypificationValidator;

/// Multiplier applied to the corrected level's confidence
pub const CORRECTION_CONFIDENCE_FACTOR: f32 = 0.8;
/// Floor for the corrected level's confidence
pub const CORRECTION_CONFIDENCE_FLOOR: f32 = 0.6;

/// Confidence reported for an accepted correction
pub fn adjusted_confidence(original: f32) -> f32 {
    (original * CORRECTION_CONFIDENCE_FACTOR).max(CORRECTION_CONFIDENCE_FLOOR)
}

/// One-shot correction of an invalid typification
pub struct CorrectionController {
    oracle: Arc<dyn ClassificationOracle>,
    validator: TypificationValidator,
}

impl CorrectionController {
    pub fn new(oracle: Arc<dyn ClassificationOracle>, validator: TypificationValidator) -> Self {
        Self { oracle, validator }
    }

    /// Attempt the single correction for `draft`
    ///
    /// Never loops: whatever the corrective call returns is validated once and
    /// either accepted or reported as a failure.
    pub async fn correct(
        &self,
        transcript: &str,
        draft: &DraftTypification,
        validation: &ValidationResult,
    ) -> Result<HierarchicalTypification, CorrectionFailure> {
        let level = validation
            .failing_level()
            .ok_or(CorrectionFailure::NothingToCorrect)?;
        let options = validation.suggested_corrections.clone();
        if options.is_empty() {
            return Err(CorrectionFailure::NoOptions(level));
        }

        let rejected = draft.path.get(level).to_string();
        tracing::warn!(
            level = %level,
            rejected = %rejected,
            options = options.len(),
            "Requesting correction"
        );

        let result = self.attempt(transcript, draft, level, rejected, options, validation).await;

        let outcome = match &result {
            Ok(_) => "accepted",
            Err(CorrectionFailure::Oracle(_)) => "oracle_error",
            Err(_) => "rejected",
        };
        metrics::counter!(CORRECTIONS_TOTAL, "outcome" => outcome).increment(1);
        if let Err(failure) = &result {
            if failure.is_oracle_failure() {
                metrics::counter!(ORACLE_FAILURES_TOTAL, "phase" => "correction").increment(1);
            }
            tracing::warn!(level = %level, reason = %failure, "Correction failed");
        }
        result
    }

    async fn attempt(
        &self,
        transcript: &str,
        draft: &DraftTypification,
        level: HierarchyLevel,
        rejected: String,
        options: Vec<String>,
        validation: &ValidationResult,
    ) -> Result<HierarchicalTypification, CorrectionFailure> {
        let note = CorrectionNote {
            rejected_choice: rejected,
            reason: validation.error_message.clone().unwrap_or_default(),
        };
        let request = OracleRequest::new(transcript, level, options).with_correction(note);
        let offered = request.clone();
        let verdict = self.oracle.classify(request).await?;

        if !offered.allows(&verdict.choice) {
            return Err(CorrectionFailure::OutOfSet {
                level,
                choice: verdict.choice,
            });
        }

        // The reduction applies to the confidence of the rejected choice
        let original = draft.confidence(level).unwrap_or(verdict.confidence);
        let confidence = adjusted_confidence(original);
        let mut corrected = draft.clone();
        corrected.record(
            level,
            OracleVerdict::new(verdict.choice, confidence, verdict.rationale),
        );
        corrected.clear_below(level);

        if let Some(next) = level.next() {
            descend(
                self.oracle.as_ref(),
                self.validator.hierarchy(),
                transcript,
                &mut corrected,
                next,
            )
            .await
            .map_err(|(_, e)| CorrectionFailure::Oracle(e))?;
        }

        HierarchicalTypification::try_new(&self.validator, corrected, Some(draft.path.clone()))
            .map_err(CorrectionFailure::StillInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use triage_core::{Error, Hierarchy, HierarchyNode, Result, TypificationPath};

    /// Answers every request with the same verdict and counts calls
    struct Fixed {
        verdict: Result<OracleVerdict>,
        calls: Mutex<Vec<OracleRequest>>,
    }

    #[async_trait]
    impl ClassificationOracle for Fixed {
        async fn classify(&self, request: OracleRequest) -> Result<OracleVerdict> {
            self.calls.lock().push(request);
            self.verdict.clone()
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn fixed(verdict: Result<OracleVerdict>) -> Arc<Fixed> {
        Arc::new(Fixed {
            verdict,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn validator() -> TypificationValidator {
        let hierarchy = Hierarchy::new(vec![HierarchyNode::new(
            "Emissão",
            vec![HierarchyNode::new(
                "Cartão Pré-Pago",
                vec![HierarchyNode::new(
                    "Uso do cartão",
                    vec![HierarchyNode::leaf("Compra recusada"), HierarchyNode::leaf("Saque")],
                )],
            )],
        )])
        .unwrap();
        TypificationValidator::new(Arc::new(hierarchy))
    }

    fn invalid_draft() -> DraftTypification {
        let mut draft = DraftTypification::new();
        draft.record(HierarchyLevel::BusinessUnit, OracleVerdict::new("Emissão", 0.9, ""));
        draft.record(HierarchyLevel::Product, OracleVerdict::new("Cartão Pré-Pago", 0.9, ""));
        draft.record(HierarchyLevel::Motive, OracleVerdict::new("Uso do cartão", 0.9, ""));
        draft.record(HierarchyLevel::Submotive, OracleVerdict::new("Estorno", 0.9, ""));
        draft
    }

    #[test]
    fn test_adjusted_confidence() {
        assert!((adjusted_confidence(0.9) - 0.72).abs() < 1e-6);
        assert!((adjusted_confidence(1.0) - 0.8).abs() < 1e-6);
        assert_eq!(adjusted_confidence(0.5), 0.6);
        assert_eq!(adjusted_confidence(0.0), 0.6);
    }

    #[tokio::test]
    async fn test_correction_accepted() {
        let v = validator();
        let draft = invalid_draft();
        let validation = v.validate(&draft.path);
        let oracle = fixed(Ok(OracleVerdict::new("Saque", 0.5, "cliente quer sacar")));
        let controller = CorrectionController::new(oracle.clone(), v);

        let t = controller.correct("texto", &draft, &validation).await.unwrap();
        assert_eq!(t.submotive(), "Saque");
        assert!(t.retry_used());
        assert!((t.confidence(HierarchyLevel::Submotive).unwrap() - 0.72).abs() < 1e-6);
        assert_eq!(t.confidence(HierarchyLevel::Motive), Some(0.9));
        assert_eq!(t.original_values().unwrap().submotive, "Estorno");

        let calls = oracle.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].valid_options, vec!["Compra recusada", "Saque"]);
        let note = calls[0].correction.as_ref().unwrap();
        assert_eq!(note.rejected_choice, "Estorno");
    }

    #[tokio::test]
    async fn test_adjustment_uses_rejected_confidence() {
        let v = validator();
        let mut draft = invalid_draft();
        draft.record(HierarchyLevel::Submotive, OracleVerdict::new("Estorno", 0.95, ""));
        let validation = v.validate(&draft.path);
        let controller =
            CorrectionController::new(fixed(Ok(OracleVerdict::new("Saque", 0.5, ""))), v);

        let t = controller.correct("texto", &draft, &validation).await.unwrap();
        assert!((t.confidence(HierarchyLevel::Submotive).unwrap() - 0.76).abs() < 1e-6);

        // low original confidence is floored, never raised by the new answer
        let mut draft = invalid_draft();
        draft.record(HierarchyLevel::Submotive, OracleVerdict::new("Estorno", 0.5, ""));
        let validation = controller.validator.validate(&draft.path);
        let t = controller.correct("texto", &draft, &validation).await;
        assert_eq!(t.unwrap().confidence(HierarchyLevel::Submotive), Some(0.6));
    }

    #[tokio::test]
    async fn test_out_of_set_correction() {
        let v = validator();
        let draft = invalid_draft();
        let validation = v.validate(&draft.path);
        let oracle = fixed(Ok(OracleVerdict::new("Estorno", 0.9, "")));
        let controller = CorrectionController::new(oracle.clone(), v);

        let failure = controller.correct("texto", &draft, &validation).await.unwrap_err();
        assert!(matches!(failure, CorrectionFailure::OutOfSet { .. }));
        assert_eq!(oracle.calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_oracle_error_during_correction() {
        let v = validator();
        let draft = invalid_draft();
        let validation = v.validate(&draft.path);
        let controller = CorrectionController::new(fixed(Err(Error::Timeout)), v);

        let failure = controller.correct("texto", &draft, &validation).await.unwrap_err();
        assert_eq!(failure, CorrectionFailure::Oracle(Error::Timeout));
    }

    #[tokio::test]
    async fn test_valid_path_is_not_corrected() {
        let v = validator();
        let path = TypificationPath::new("Emissão", "Cartão Pré-Pago", "Uso do cartão", "Saque");
        let mut draft = DraftTypification::new();
        draft.path = path.clone();
        let validation = v.validate(&path);
        let oracle = fixed(Ok(OracleVerdict::new("Saque", 0.9, "")));
        let controller = CorrectionController::new(oracle.clone(), v);

        let failure = controller.correct("texto", &draft, &validation).await.unwrap_err();
        assert_eq!(failure, CorrectionFailure::NothingToCorrect);
        assert!(oracle.calls.lock().is_empty());
    }
}
