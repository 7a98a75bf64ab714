//! Lexical Scorer
//!
//! Scores free text against keyword, pattern and intent rules per category.
//! Every category is scored independently, so one message may score for
//! several categories at once; the router relies on that to detect ambiguity.
//!
//! Scoring is a pure function of the text, the compiled rules and the
//! adjustments passed in. Rules are compiled once and shared read-only.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::normalize::normalize;
use crate::{Result, TextProcessingError};

pub const KEYWORD_WEIGHT: f32 = 1.0;
pub const PATTERN_WEIGHT: f32 = 2.0;
pub const INTENT_WEIGHT: f32 = 1.5;
/// Split evenly across all categories sharing the keyword
pub const AMBIGUOUS_WEIGHT: f32 = 0.5;

/// Named intent with its trigger phrases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentTrigger {
    pub name: String,
    pub phrases: Vec<String>,
}

/// Rules for one category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub category: String,
    pub keywords: Vec<String>,
    pub patterns: Vec<String>,
    pub intents: Vec<IntentTrigger>,
}

impl ScoringRule {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_intent<I, S>(mut self, name: impl Into<String>, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.intents.push(IntentTrigger {
            name: name.into(),
            phrases: phrases.into_iter().map(Into::into).collect(),
        });
        self
    }
}

/// Keyword shared by several categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbiguousRule {
    pub keyword: String,
    pub categories: Vec<String>,
}

/// Additive boost applied after lexical scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreAdjustment {
    pub category: String,
    pub boost: f32,
    /// Short label for reasoning strings, e.g. "last_topic"
    pub reason: String,
}

impl ScoreAdjustment {
    pub fn new(category: impl Into<String>, boost: f32, reason: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            boost,
            reason: reason.into(),
        }
    }
}

/// Result of scoring one message
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LexicalScores {
    /// Per-category totals, in rule order
    pub scores: Vec<(String, f32)>,
    pub matched_keywords: BTreeSet<String>,
    pub matched_patterns: BTreeSet<String>,
    pub matched_intents: BTreeSet<String>,
    /// Ambiguous keywords found in the text
    pub ambiguous_terms: BTreeSet<String>,
    /// Adjustments that hit a known category
    pub applied_adjustments: Vec<ScoreAdjustment>,
}

impl LexicalScores {
    pub fn score_of(&self, category: &str) -> f32 {
        self.scores
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, s)| *s)
            .unwrap_or(0.0)
    }

    /// Categories sorted by score, highest first
    ///
    /// The sort is stable: equal scores keep rule order.
    pub fn ranked(&self) -> Vec<(&str, f32)> {
        let mut ranked: Vec<(&str, f32)> =
            self.scores.iter().map(|(c, s)| (c.as_str(), *s)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    pub fn has_ambiguity(&self) -> bool {
        !self.ambiguous_terms.is_empty()
    }
}

struct CompiledPattern {
    source: String,
    regex: Regex,
}

struct CompiledRule {
    category: String,
    keywords: Vec<String>,
    patterns: Vec<CompiledPattern>,
    intents: Vec<IntentTrigger>,
}

/// Compiled rule table
pub struct LexicalScorer {
    rules: Vec<CompiledRule>,
    ambiguous: Vec<AmbiguousRule>,
}

impl LexicalScorer {
    /// Compile rules; fails on an invalid regex or a duplicate category
    pub fn new(rules: Vec<ScoringRule>, ambiguous: Vec<AmbiguousRule>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(rules.len());

        for rule in rules {
            if !seen.insert(rule.category.clone()) {
                return Err(TextProcessingError::DuplicateCategory(rule.category));
            }

            let patterns = rule
                .patterns
                .iter()
                .map(|p| {
                    Regex::new(p)
                        .map(|regex| CompiledPattern {
                            source: p.clone(),
                            regex,
                        })
                        .map_err(|e| TextProcessingError::InvalidPattern {
                            category: rule.category.clone(),
                            pattern: p.clone(),
                            message: e.to_string(),
                        })
                })
                .collect::<Result<Vec<_>>>()?;

            compiled.push(CompiledRule {
                keywords: rule.keywords.iter().map(|k| normalize(k)).collect(),
                intents: rule
                    .intents
                    .into_iter()
                    .map(|i| IntentTrigger {
                        name: i.name,
                        phrases: i.phrases.iter().map(|p| normalize(p)).collect(),
                    })
                    .collect(),
                category: rule.category,
                patterns,
            });
        }

        let ambiguous = ambiguous
            .into_iter()
            .map(|a| AmbiguousRule {
                keyword: normalize(&a.keyword),
                categories: a.categories,
            })
            .collect();

        Ok(Self {
            rules: compiled,
            ambiguous,
        })
    }

    /// Category names in rule order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.category.as_str())
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.rules.iter().any(|r| r.category == category)
    }

    /// Score `text` against every category
    pub fn score(&self, text: &str, adjustments: &[ScoreAdjustment]) -> LexicalScores {
        let text = normalize(text);
        let mut result = LexicalScores {
            scores: self
                .rules
                .iter()
                .map(|r| (r.category.clone(), 0.0))
                .collect(),
            ..Default::default()
        };

        if text.is_empty() {
            return result;
        }

        for (index, rule) in self.rules.iter().enumerate() {
            let mut score = 0.0;

            for keyword in &rule.keywords {
                if !keyword.is_empty() && text.contains(keyword.as_str()) {
                    score += KEYWORD_WEIGHT;
                    result.matched_keywords.insert(keyword.clone());
                }
            }

            for pattern in &rule.patterns {
                if pattern.regex.is_match(&text) {
                    score += PATTERN_WEIGHT;
                    result.matched_patterns.insert(pattern.source.clone());
                }
            }

            for intent in &rule.intents {
                let triggered = intent
                    .phrases
                    .iter()
                    .any(|p| !p.is_empty() && text.contains(p.as_str()));
                if triggered {
                    score += INTENT_WEIGHT;
                    result.matched_intents.insert(intent.name.clone());
                }
            }

            result.scores[index].1 = score;
        }

        for ambiguous in &self.ambiguous {
            if ambiguous.keyword.is_empty()
                || ambiguous.categories.is_empty()
                || !text.contains(ambiguous.keyword.as_str())
            {
                continue;
            }
            let share = AMBIGUOUS_WEIGHT / ambiguous.categories.len() as f32;
            for category in &ambiguous.categories {
                if let Some(entry) = result.scores.iter_mut().find(|(c, _)| c == category) {
                    entry.1 += share;
                }
            }
            result.ambiguous_terms.insert(ambiguous.keyword.clone());
        }

        for adjustment in adjustments {
            if let Some(entry) = result
                .scores
                .iter_mut()
                .find(|(c, _)| *c == adjustment.category)
            {
                entry.1 += adjustment.boost;
                result.applied_adjustments.push(adjustment.clone());
            }
        }

        tracing::trace!(
            scores = ?result.scores,
            keywords = result.matched_keywords.len(),
            intents = result.matched_intents.len(),
            ambiguous = result.ambiguous_terms.len(),
            "Scored message"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> LexicalScorer {
        LexicalScorer::new(
            vec![
                ScoringRule::new("card_issuing")
                    .with_keywords(["cartão", "recarga"])
                    .with_patterns([r"recarga\s+n[aã]o\s+caiu"]),
                ScoringRule::new("digital_account")
                    .with_keywords(["pix", "conta"])
                    .with_intent("pix_transfer", ["fazer um pix", "mandar um pix"]),
                ScoringRule::new("acquiring").with_keywords(["maquininha"]),
            ],
            vec![
                AmbiguousRule {
                    keyword: "problema".into(),
                    categories: vec![
                        "card_issuing".into(),
                        "digital_account".into(),
                        "acquiring".into(),
                    ],
                },
                AmbiguousRule {
                    keyword: "limite".into(),
                    categories: vec!["card_issuing".into(), "digital_account".into()],
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_keyword_and_pattern_weights() {
        let scores = scorer().score("Minha recarga não caiu no cartão", &[]);
        // two keywords + one pattern
        assert_eq!(scores.score_of("card_issuing"), 4.0);
        assert_eq!(scores.score_of("digital_account"), 0.0);
        assert!(scores.matched_keywords.contains("recarga"));
        assert_eq!(scores.matched_patterns.len(), 1);
    }

    #[test]
    fn test_intent_counts_once() {
        let scores = scorer().score("quero fazer um pix, mandar um pix agora", &[]);
        // keyword "pix" + one intent, even with two triggers present
        assert_eq!(scores.score_of("digital_account"), 1.0 + INTENT_WEIGHT);
        assert_eq!(
            scores.matched_intents.iter().collect::<Vec<_>>(),
            vec!["pix_transfer"]
        );
    }

    #[test]
    fn test_ambiguous_split() {
        let scores = scorer().score("estou com um problema no limite", &[]);
        let third = AMBIGUOUS_WEIGHT / 3.0;
        let half = AMBIGUOUS_WEIGHT / 2.0;
        assert!((scores.score_of("card_issuing") - (third + half)).abs() < 1e-6);
        assert!((scores.score_of("digital_account") - (third + half)).abs() < 1e-6);
        assert!((scores.score_of("acquiring") - third).abs() < 1e-6);
        assert!(scores.has_ambiguity());
        assert!(scores.matched_keywords.is_empty());
    }

    #[test]
    fn test_multiple_categories_score() {
        let scores = scorer().score("pix caiu na conta mas a maquininha travou", &[]);
        assert_eq!(scores.score_of("digital_account"), 2.0);
        assert_eq!(scores.score_of("acquiring"), 1.0);
    }

    #[test]
    fn test_adjustments() {
        let adjustments = vec![
            ScoreAdjustment::new("acquiring", 1.0, "merchant"),
            ScoreAdjustment::new("insurance", 5.0, "unknown category"),
        ];
        let scores = scorer().score("maquininha", &adjustments);
        assert_eq!(scores.score_of("acquiring"), 2.0);
        assert_eq!(scores.applied_adjustments.len(), 1);
    }

    #[test]
    fn test_ranked_is_stable() {
        let scores = scorer().score("problema", &[]);
        let ranked: Vec<&str> = scores.ranked().into_iter().map(|(c, _)| c).collect();
        assert_eq!(ranked, vec!["card_issuing", "digital_account", "acquiring"]);
    }

    #[test]
    fn test_empty_and_punctuation_input() {
        let s = scorer();
        for text in ["", "   ", "?!?!", "..."] {
            let scores = s.score(text, &[]);
            assert!(scores.scores.iter().all(|(_, v)| *v == 0.0), "{text:?}");
        }
    }

    #[test]
    fn test_invalid_pattern() {
        let result = LexicalScorer::new(
            vec![ScoringRule::new("card_issuing").with_patterns(["(unclosed"])],
            Vec::new(),
        );
        assert!(matches!(
            result,
            Err(TextProcessingError::InvalidPattern { category, .. }) if category == "card_issuing"
        ));
    }

    #[test]
    fn test_duplicate_category() {
        let result = LexicalScorer::new(
            vec![ScoringRule::new("acquiring"), ScoringRule::new("acquiring")],
            Vec::new(),
        );
        assert!(matches!(result, Err(TextProcessingError::DuplicateCategory(_))));
    }

    #[test]
    fn test_rules_normalized() {
        let scorer = LexicalScorer::new(
            vec![ScoringRule::new("acquiring").with_keywords(["  Maquininha  "])],
            Vec::new(),
        )
        .unwrap();
        assert_eq!(scorer.score("MAQUININHA", &[]).score_of("acquiring"), 1.0);
        assert_eq!(scorer.categories().collect::<Vec<_>>(), vec!["acquiring"]);
    }
}
