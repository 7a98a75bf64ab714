//! Core traits for the triage engine
//!
//! External collaborators plug in through these traits so they can be swapped
//! or mocked without touching the decision logic.
//!
//! ```text
//! Classification:
//!   - ClassificationOracle: picks one label among constrained options
//! ```

mod oracle;

pub use oracle::{ClassificationOracle, CorrectionNote, OracleRequest, OracleVerdict};
