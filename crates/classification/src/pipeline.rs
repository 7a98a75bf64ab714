//! Classification pipeline
//!
//! Sequential state machine over the hierarchy levels:
//!
//! ```text
//! BusinessUnit → Product → Motive → Submotive → Validated
//!                                      │
//!                                      └─ invalid → one correction → Validated | Unvalidated
//! ```
//!
//! Each level's options depend on the label chosen above it, so the oracle
//! calls for one conversation never overlap. Independent conversations share
//! one pipeline and run concurrently. Dropping the future between stages
//! leaves nothing behind.

use std::sync::Arc;

use triage_core::{
    ClassificationOracle, Error, Hierarchy, HierarchyLevel, OracleRequest,
};

use crate::correction::CorrectionController;
use crate::error::PipelineError;
use crate::metric_names::{ORACLE_FAILURES_TOTAL, TYPIFICATIONS_TOTAL};
use crate::typification::{
    DraftTypification, HierarchicalTypification, PipelineOutcome, UnvalidatedTypification,
};
use crate::validator::TypificationValidator;

/// Upper bound on oracle calls per conversation: four levels plus one correction
pub const MAX_ORACLE_CALLS: usize = HierarchyLevel::ALL.len() + 1;

/// Hierarchical typification pipeline
pub struct ClassificationPipeline {
    oracle: Arc<dyn ClassificationOracle>,
    validator: TypificationValidator,
    corrections: CorrectionController,
}

impl ClassificationPipeline {
    pub fn new(hierarchy: Arc<Hierarchy>, oracle: Arc<dyn ClassificationOracle>) -> Self {
        let validator = TypificationValidator::new(hierarchy);
        let corrections = CorrectionController::new(Arc::clone(&oracle), validator.clone());
        Self {
            oracle,
            validator,
            corrections,
        }
    }

    pub fn validator(&self) -> &TypificationValidator {
        &self.validator
    }

    /// Typify a finished conversation
    ///
    /// An oracle failure during the initial descent aborts the run. Anything
    /// that reaches validation yields an outcome, validated or not.
    pub async fn run(&self, transcript: &str) -> Result<PipelineOutcome, PipelineError> {
        let mut draft = DraftTypification::new();

        if let Err((failed_level, source)) = descend(
            self.oracle.as_ref(),
            self.validator.hierarchy(),
            transcript,
            &mut draft,
            HierarchyLevel::BusinessUnit,
        )
        .await
        {
            metrics::counter!(ORACLE_FAILURES_TOTAL, "phase" => "descent").increment(1);
            metrics::counter!(TYPIFICATIONS_TOTAL, "outcome" => "error").increment(1);
            tracing::warn!(
                oracle = self.oracle.name(),
                level = %failed_level,
                error = %source,
                "Classification aborted"
            );
            return Err(PipelineError {
                failed_level,
                partial: draft.path,
                confidences: draft.confidences,
                source,
            });
        }

        let validation =
            match HierarchicalTypification::try_new(&self.validator, draft.clone(), None) {
                Ok(typification) => {
                    metrics::counter!(TYPIFICATIONS_TOTAL, "outcome" => "validated").increment(1);
                    tracing::info!(
                        path = %typification.path(),
                        retry_used = false,
                        "Typification validated"
                    );
                    return Ok(PipelineOutcome::Validated(typification));
                }
                Err(validation) => validation,
            };

        match self.corrections.correct(transcript, &draft, &validation).await {
            Ok(typification) => {
                metrics::counter!(TYPIFICATIONS_TOTAL, "outcome" => "corrected").increment(1);
                tracing::info!(
                    path = %typification.path(),
                    retry_used = true,
                    "Typification validated"
                );
                Ok(PipelineOutcome::Validated(typification))
            }
            Err(failure) => {
                metrics::counter!(TYPIFICATIONS_TOTAL, "outcome" => "unvalidated").increment(1);
                tracing::warn!(
                    path = %draft.path,
                    level_reached = validation.level_reached,
                    reason = %failure,
                    "Typification left unvalidated"
                );
                Ok(PipelineOutcome::Unvalidated(UnvalidatedTypification::new(
                    draft, validation,
                )))
            }
        }
    }
}

/// Ask the oracle for every level from `from` down to the submotive
///
/// Stops early, without error, when the oracle picks a label outside the
/// offered options; validation reports that level. Returns the failing level
/// on an oracle error.
pub(crate) async fn descend(
    oracle: &dyn ClassificationOracle,
    hierarchy: &Hierarchy,
    transcript: &str,
    draft: &mut DraftTypification,
    from: HierarchyLevel,
) -> Result<(), (HierarchyLevel, Error)> {
    for level in HierarchyLevel::ALL.into_iter().filter(|l| *l >= from) {
        let options = match hierarchy.options_for(&draft.path, level) {
            Some(options) if !options.is_empty() => options,
            _ => break,
        };

        let request = OracleRequest::new(transcript, level, options);
        let offered = request.clone();
        let verdict = oracle.classify(request).await.map_err(|e| (level, e))?;
        let allowed = offered.allows(&verdict.choice);

        tracing::debug!(
            level = %level,
            choice = %verdict.choice,
            confidence = verdict.confidence,
            allowed,
            "Oracle answered"
        );
        draft.record(level, verdict);

        if !allowed {
            tracing::warn!(level = %level, "Oracle chose outside the offered options");
            break;
        }
    }
    Ok(())
}
