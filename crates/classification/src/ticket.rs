//! Ticket descriptor
//!
//! Flat record handed to the external ticketing collaborator. Every pipeline
//! result maps to one, including failures, which are clearly marked as not
//! validated.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use triage_core::{HierarchyLevel, TypificationPath};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::typification::{HierarchicalTypification, PipelineOutcome, UnvalidatedTypification};

/// Status shown when a conversation could not be typified automatically
pub const FALLBACK_MESSAGE: &str =
    "Não foi possível classificar o atendimento automaticamente. O ticket foi aberto para revisão manual.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketDescriptor {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub business_unit: String,
    pub product: String,
    pub motive: String,
    pub submotive: String,
    /// Empty unless validated
    pub conclusion: String,
    pub confidence_scores: BTreeMap<HierarchyLevel, f32>,
    pub retry_used: bool,
    pub validated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

impl TicketDescriptor {
    fn base(path: &TypificationPath, confidence_scores: BTreeMap<HierarchyLevel, f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            business_unit: path.business_unit.clone(),
            product: path.product.clone(),
            motive: path.motive.clone(),
            submotive: path.submotive.clone(),
            conclusion: String::new(),
            confidence_scores,
            retry_used: false,
            validated: false,
            status_message: Some(FALLBACK_MESSAGE.to_string()),
        }
    }

    pub fn from_typification(typification: &HierarchicalTypification) -> Self {
        let mut ticket = Self::base(
            &typification.path(),
            typification.per_level_confidence().clone(),
        );
        ticket.conclusion = typification.conclusion().to_string();
        ticket.retry_used = typification.retry_used();
        ticket.validated = true;
        ticket.status_message = None;
        ticket
    }

    /// Proposed labels as-is, marked unvalidated
    pub fn from_unvalidated(unvalidated: &UnvalidatedTypification) -> Self {
        Self::base(&unvalidated.path, unvalidated.confidences.clone())
    }

    /// Labels chosen before the failure; the rest stay empty
    pub fn from_error(err: &PipelineError) -> Self {
        Self::base(&err.partial, err.confidences.clone())
    }

    pub fn from_outcome(outcome: &PipelineOutcome) -> Self {
        match outcome {
            PipelineOutcome::Validated(t) => Self::from_typification(t),
            PipelineOutcome::Unvalidated(u) => Self::from_unvalidated(u),
        }
    }

    /// Ticket for whatever the pipeline returned
    pub fn from_result(result: &Result<PipelineOutcome, PipelineError>) -> Self {
        match result {
            Ok(outcome) => Self::from_outcome(outcome),
            Err(err) => Self::from_error(err),
        }
    }

    pub fn path(&self) -> TypificationPath {
        TypificationPath::new(
            &self.business_unit,
            &self.product,
            &self.motive,
            &self.submotive,
        )
    }
}
