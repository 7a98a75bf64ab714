//! Hierarchical outcome classification
//!
//! At the end of a conversation the transcript is classified one hierarchy
//! level at a time, each oracle call constrained to the valid children of the
//! path chosen so far:
//!
//! ```text
//! BusinessUnit → Product → Motive → Submotive → Validated
//! ```
//!
//! The proposed path is validated against the hierarchy. A failing path gets
//! exactly one corrective oracle call scoped to the failing level's valid
//! options. Only paths that exist in the hierarchy become a
//! [`HierarchicalTypification`]; everything else is reported as an
//! [`UnvalidatedTypification`] or a [`PipelineError`].

pub mod correction;
pub mod error;
pub mod pipeline;
pub mod ticket;
pub mod typification;
pub mod validator;

pub use correction::{adjusted_confidence, CorrectionController};
pub use error::{CorrectionFailure, PipelineError};
pub use pipeline::ClassificationPipeline;
pub use ticket::{TicketDescriptor, FALLBACK_MESSAGE};
pub use typification::{
    DraftTypification, HierarchicalTypification, PipelineOutcome, UnvalidatedTypification,
};
pub use validator::TypificationValidator;

/// Counter names emitted through the `metrics` facade
pub mod metric_names {
    /// Finished pipeline runs, labelled by `outcome`
    pub const TYPIFICATIONS_TOTAL: &str = "triage_typifications_total";
    /// Correction attempts, labelled by `outcome`
    pub const CORRECTIONS_TOTAL: &str = "triage_corrections_total";
    /// Failed or timed out oracle calls, labelled by `phase`
    pub const ORACLE_FAILURES_TOTAL: &str = "triage_oracle_failures_total";
}
