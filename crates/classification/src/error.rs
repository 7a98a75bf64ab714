//! Classification errors

use std::collections::BTreeMap;

use thiserror::Error;
use triage_core::{HierarchyLevel, TypificationPath, ValidationResult};

/// Oracle failure during the initial descent
///
/// Carries whatever was chosen before the failure so the caller can still
/// open a clearly marked unvalidated ticket.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Classification aborted at {failed_level}: {source}")]
pub struct PipelineError {
    /// Level whose oracle call failed
    pub failed_level: HierarchyLevel,
    /// Labels chosen before the failure; lower levels are empty
    pub partial: TypificationPath,
    pub confidences: BTreeMap<HierarchyLevel, f32>,
    pub source: triage_core::Error,
}

impl PipelineError {
    /// Last level whose oracle call succeeded, if any
    pub fn last_completed_level(&self) -> Option<HierarchyLevel> {
        HierarchyLevel::from_number(self.failed_level.number() - 1)
    }

    /// Whether the oracle timed out rather than failed
    pub fn is_timeout(&self) -> bool {
        matches!(self.source, triage_core::Error::Timeout)
    }
}

impl From<PipelineError> for triage_core::Error {
    fn from(err: PipelineError) -> Self {
        err.source
    }
}

/// Why the single correction attempt did not produce a valid path
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrectionFailure {
    #[error("Path is already valid")]
    NothingToCorrect,

    #[error("No valid options at {0}")]
    NoOptions(HierarchyLevel),

    #[error("Oracle failed during correction: {0}")]
    Oracle(#[from] triage_core::Error),

    #[error("Corrected {level} '{choice}' is not among the offered options")]
    OutOfSet { level: HierarchyLevel, choice: String },

    #[error("Corrected path still invalid at level {}", .0.level_reached)]
    StillInvalid(ValidationResult),
}

impl CorrectionFailure {
    pub fn is_oracle_failure(&self) -> bool {
        matches!(self, CorrectionFailure::Oracle(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_completed_level() {
        let err = PipelineError {
            failed_level: HierarchyLevel::Motive,
            partial: TypificationPath::new("Emissão", "Cartão Pré-Pago", "", ""),
            confidences: BTreeMap::new(),
            source: triage_core::Error::Timeout,
        };
        assert_eq!(err.last_completed_level(), Some(HierarchyLevel::Product));
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Classification aborted at motive: Oracle timeout");

        let first = PipelineError {
            failed_level: HierarchyLevel::BusinessUnit,
            ..err
        };
        assert_eq!(first.last_completed_level(), None);
        assert_eq!(triage_core::Error::from(first), triage_core::Error::Timeout);
    }

    #[test]
    fn test_correction_failure_display() {
        let failure = CorrectionFailure::OutOfSet {
            level: HierarchyLevel::Submotive,
            choice: "Outro".into(),
        };
        assert_eq!(
            failure.to_string(),
            "Corrected submotive 'Outro' is not among the offered options"
        );
        assert!(!failure.is_oracle_failure());
        assert!(CorrectionFailure::from(triage_core::Error::Timeout).is_oracle_failure());
    }
}
