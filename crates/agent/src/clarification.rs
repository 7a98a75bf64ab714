//! Clarification Planner
//!
//! Decides whether to ask the customer something before proceeding, and what.
//! Rules are checked in a fixed order and the first match wins:
//!
//! 1. Two words or fewer (and no known ambiguous term): incomplete information
//! 2. Known ambiguous standalone term, four words or fewer: ambiguous topic
//! 3. Missing critical detail, five words or fewer: missing details
//! 4. Router flagged the decision: choose between candidate units
//! 5. Context term without any of its modifiers: unclear reference

use regex::Regex;

use triage_config::{ClarificationConfig, RoutingRulesConfig};
use triage_core::{ClarificationKind, ClarificationRequest, RoutingDecision, SessionContext};
use triage_text_processing::{contains_phrase, normalize, word_count};

use crate::AgentError;

pub const INCOMPLETE_MAX_WORDS: usize = 2;
pub const AMBIGUOUS_MAX_WORDS: usize = 4;
pub const MISSING_DETAIL_MAX_WORDS: usize = 5;

pub const INCOMPLETE_CONFIDENCE: f32 = 0.2;
pub const AMBIGUOUS_CONFIDENCE: f32 = 0.3;
pub const MISSING_DETAIL_CONFIDENCE: f32 = 0.5;
pub const UNCLEAR_REFERENCE_CONFIDENCE: f32 = 0.6;

/// Frustration level from which only one question is asked
pub const TERSE_FRUSTRATION_LEVEL: u8 = 2;

struct QuestionSet {
    questions: Vec<String>,
    hints: Vec<String>,
}

struct CompiledIncomplete {
    regex: Regex,
    set: QuestionSet,
}

struct CompiledAmbiguousTerm {
    term: String,
    set: QuestionSet,
}

struct CompiledMissingDetail {
    name: String,
    trigger: Regex,
    satisfied_by: Vec<Regex>,
    set: QuestionSet,
}

struct CompiledContextTerm {
    term: String,
    modifiers: Vec<String>,
    set: QuestionSet,
}

/// Rule-based clarification planner
pub struct ClarificationPlanner {
    config: ClarificationConfig,
    routing: RoutingRulesConfig,
    incomplete: Vec<CompiledIncomplete>,
    ambiguous: Vec<CompiledAmbiguousTerm>,
    missing: Vec<CompiledMissingDetail>,
    context_terms: Vec<CompiledContextTerm>,
}

impl ClarificationPlanner {
    /// Compile the rules; `routing` supplies unit display names
    pub fn new(
        config: &ClarificationConfig,
        routing: &RoutingRulesConfig,
    ) -> Result<Self, AgentError> {
        let incomplete = config
            .incomplete_patterns
            .iter()
            .map(|p| -> Result<CompiledIncomplete, AgentError> {
                Ok(CompiledIncomplete {
                    regex: compile("incomplete_patterns", &p.pattern)?,
                    set: question_set(&p.questions, &p.hints),
                })
            })
            .collect::<Result<Vec<_>, AgentError>>()?;

        let missing = config
            .missing_detail_rules
            .iter()
            .map(|r| -> Result<CompiledMissingDetail, AgentError> {
                Ok(CompiledMissingDetail {
                    name: r.name.clone(),
                    trigger: compile(&r.name, &r.trigger)?,
                    satisfied_by: r
                        .satisfied_by
                        .iter()
                        .map(|p| compile(&r.name, p))
                        .collect::<Result<Vec<_>, _>>()?,
                    set: question_set(&r.questions, &r.hints),
                })
            })
            .collect::<Result<Vec<_>, AgentError>>()?;

        let ambiguous = config
            .ambiguous_terms
            .iter()
            .map(|t| CompiledAmbiguousTerm {
                term: normalize(&t.term),
                set: question_set(&t.questions, &t.hints),
            })
            .collect();

        let context_terms = config
            .context_terms
            .iter()
            .map(|t| CompiledContextTerm {
                term: normalize(&t.term),
                modifiers: t.modifiers.iter().map(|m| normalize(m)).collect(),
                set: question_set(&t.questions, &t.hints),
            })
            .collect();

        Ok(Self {
            config: config.clone(),
            routing: routing.clone(),
            incomplete,
            ambiguous,
            missing,
            context_terms,
        })
    }

    /// Plan clarification for one message
    pub fn plan(
        &self,
        text: &str,
        routing: &RoutingDecision,
        session: &SessionContext,
    ) -> ClarificationRequest {
        let normalized = normalize(text);
        let words = word_count(&normalized);
        let ambiguous_term = self
            .ambiguous
            .iter()
            .find(|a| contains_phrase(&normalized, &a.term));

        let incomplete = (words <= INCOMPLETE_MAX_WORDS && ambiguous_term.is_none())
            .then(|| self.incomplete_request(&normalized));

        let request = incomplete
            .or_else(|| {
                ambiguous_term
                    .filter(|_| words <= AMBIGUOUS_MAX_WORDS)
                    .map(|a| {
                        from_set(
                            ClarificationKind::AmbiguousTopic,
                            &a.set,
                            AMBIGUOUS_CONFIDENCE,
                        )
                    })
            })
            .or_else(|| {
                if words > MISSING_DETAIL_MAX_WORDS {
                    return None;
                }
                self.missing
                    .iter()
                    .find(|r| {
                        r.trigger.is_match(&normalized)
                            && !r.satisfied_by.iter().any(|s| s.is_match(&normalized))
                    })
                    .map(|r| {
                        tracing::debug!(rule = %r.name, "Missing critical detail");
                        from_set(
                            ClarificationKind::MissingDetails,
                            &r.set,
                            MISSING_DETAIL_CONFIDENCE,
                        )
                    })
            })
            .or_else(|| {
                routing
                    .requires_clarification
                    .then(|| self.unit_choice_request(routing, session))
            })
            .or_else(|| {
                self.context_terms
                    .iter()
                    .find(|t| {
                        normalized.contains(t.term.as_str())
                            && !t.modifiers.iter().any(|m| normalized.contains(m.as_str()))
                    })
                    .map(|t| {
                        from_set(
                            ClarificationKind::UnclearReference,
                            &t.set,
                            UNCLEAR_REFERENCE_CONFIDENCE,
                        )
                    })
            });

        let Some(mut request) = request else {
            return ClarificationRequest::none();
        };

        if session.frustration_level >= TERSE_FRUSTRATION_LEVEL {
            request.questions.truncate(1);
        }

        tracing::debug!(
            kind = ?request.kind,
            questions = request.questions.len(),
            confidence = request.confidence,
            "Clarification planned"
        );
        request
    }

    /// Whether `reply` answers a pending request
    pub fn is_answered(&self, request: &ClarificationRequest, reply: &str) -> bool {
        request.is_answered_by(reply, &self.config.yes_no_tokens)
    }

    fn incomplete_request(&self, normalized: &str) -> ClarificationRequest {
        match self.incomplete.iter().find(|p| p.regex.is_match(normalized)) {
            Some(pattern) => from_set(
                ClarificationKind::IncompleteInformation,
                &pattern.set,
                INCOMPLETE_CONFIDENCE,
            ),
            None => ClarificationRequest::new(
                ClarificationKind::IncompleteInformation,
                self.config.generic_questions.clone(),
                Vec::<String>::new(),
                INCOMPLETE_CONFIDENCE,
            ),
        }
    }

    /// Ask which of the candidate units the customer means
    fn unit_choice_request(
        &self,
        routing: &RoutingDecision,
        session: &SessionContext,
    ) -> ClarificationRequest {
        let kind = if routing.detected_intents.len() > 1 {
            ClarificationKind::MultipleIntents
        } else {
            ClarificationKind::AmbiguousTopic
        };

        let mut candidates: Vec<&str> = Vec::new();
        if !routing.is_unknown() {
            candidates.push(&routing.primary_unit);
        }
        candidates.extend(routing.alternative_units.iter().map(String::as_str));

        // The unit the session was last routed to is offered first
        if let Some(topic) = &session.last_topic {
            if let Some(pos) = candidates.iter().position(|c| *c == topic.as_str()) {
                let topic = candidates.remove(pos);
                candidates.insert(0, topic);
            }
        }

        let names: Vec<&str> = candidates
            .iter()
            .map(|c| self.routing.display_name(c))
            .collect();
        let questions = match names.as_slice() {
            [first, second, ..] => vec![self.config.unit_choice_question(first, second)],
            _ => self.config.generic_questions.clone(),
        };

        ClarificationRequest::new(
            kind,
            questions,
            names.iter().map(|n| n.to_lowercase()),
            routing.confidence,
        )
    }
}

fn from_set(kind: ClarificationKind, set: &QuestionSet, confidence: f32) -> ClarificationRequest {
    ClarificationRequest::new(kind, set.questions.clone(), set.hints.iter(), confidence)
}

fn question_set(questions: &[String], hints: &[String]) -> QuestionSet {
    QuestionSet {
        questions: questions.to_vec(),
        hints: hints.to_vec(),
    }
}

fn compile(rule: &str, pattern: &str) -> Result<Regex, AgentError> {
    Regex::new(pattern).map_err(|e| AgentError::InvalidPattern {
        rule: rule.to_string(),
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}
