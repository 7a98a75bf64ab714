//! Clarification request types

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Share of context hints a reply must echo to count as an answer.
///
/// Tunable heuristic, not a derived invariant.
pub const ANSWER_HINT_RATIO: f32 = 0.5;

/// Maximum number of questions in one request
pub const MAX_QUESTIONS: usize = 2;

/// Why clarification is needed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClarificationKind {
    AmbiguousTopic,
    MissingDetails,
    MultipleIntents,
    UnclearReference,
    IncompleteInformation,
}

/// Questions to ask before proceeding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarificationRequest {
    /// `None` when no clarification is needed
    pub kind: Option<ClarificationKind>,
    /// At most [`MAX_QUESTIONS`]
    pub questions: Vec<String>,
    /// Words a reply is expected to echo
    pub context_hints: BTreeSet<String>,
    pub confidence: f32,
}

impl ClarificationRequest {
    /// No clarification needed
    pub fn none() -> Self {
        Self {
            kind: None,
            questions: Vec::new(),
            context_hints: BTreeSet::new(),
            confidence: 1.0,
        }
    }

    pub fn new<I, S>(kind: ClarificationKind, questions: Vec<String>, hints: I, confidence: f32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut questions = questions;
        questions.truncate(MAX_QUESTIONS);
        Self {
            kind: Some(kind),
            questions,
            context_hints: hints.into_iter().map(|h| h.into().to_lowercase()).collect(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn is_needed(&self) -> bool {
        self.kind.is_some() && !self.questions.is_empty()
    }

    /// Whether `reply` answers this request
    ///
    /// A reply answers when it contains one of the yes/no tokens, or echoes at
    /// least [`ANSWER_HINT_RATIO`] of the context hints.
    pub fn is_answered_by(&self, reply: &str, yes_no_tokens: &[String]) -> bool {
        let reply = reply.to_lowercase();
        let words: BTreeSet<&str> = reply
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let has_yes_no = yes_no_tokens.iter().any(|token| {
            let token = token.to_lowercase();
            if token.contains(' ') {
                reply.contains(&token)
            } else {
                words.contains(token.as_str())
            }
        });
        if has_yes_no {
            return true;
        }

        if self.context_hints.is_empty() {
            return false;
        }
        let echoed = self
            .context_hints
            .iter()
            .filter(|hint| reply.contains(hint.as_str()))
            .count();
        echoed as f32 / self.context_hints.len() as f32 >= ANSWER_HINT_RATIO
    }
}
