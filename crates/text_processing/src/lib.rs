//! Text processing for the triage engine
//!
//! - **Normalization**: lowercase and whitespace-collapse inbound messages
//! - **Lexical scoring**: keyword, pattern and intent rules per routing category
//!
//! # Example
//!
//! ```
//! use triage_text_processing::{LexicalScorer, ScoringRule};
//!
//! let rule = ScoringRule::new("acquiring").with_keywords(["maquininha"]);
//! let scorer = LexicalScorer::new(vec![rule], Vec::new()).unwrap();
//!
//! let scores = scorer.score("Minha MAQUININHA não liga", &[]);
//! assert_eq!(scores.score_of("acquiring"), 1.0);
//! ```

pub mod normalize;
pub mod scorer;

mod error;

pub use error::{Result, TextProcessingError};
pub use normalize::{contains_phrase, normalize, word_count};
pub use scorer::{
    AmbiguousRule, IntentTrigger, LexicalScorer, LexicalScores, ScoreAdjustment, ScoringRule,
    AMBIGUOUS_WEIGHT, INTENT_WEIGHT, KEYWORD_WEIGHT, PATTERN_WEIGHT,
};
