//! Message Router
//!
//! Picks the business unit for an inbound message from lexical scores plus
//! session context boosts, and flags when the caller should ask a clarifying
//! question instead of trusting the pick.

use std::fmt::Write as _;

use triage_config::{ContextBoostConfig, RoutingRulesConfig};
use triage_core::{RoutingDecision, SessionContext, UNKNOWN_UNIT};
use triage_text_processing::{
    AmbiguousRule, IntentTrigger, LexicalScorer, LexicalScores, ScoreAdjustment, ScoringRule,
};

use crate::AgentError;

/// Top score that maps to confidence 1.0
pub const CONFIDENCE_SCALE: f32 = 10.0;
/// Ambiguous matches below this confidence require clarification
pub const AMBIGUITY_CONFIDENCE_THRESHOLD: f32 = 0.7;
/// Top two scores closer than this are a near tie
pub const NEAR_TIE_MARGIN: f32 = 1.0;
pub const MAX_ALTERNATIVES: usize = 3;

/// Lexical router over the configured categories
pub struct Router {
    scorer: LexicalScorer,
    boosts: ContextBoostConfig,
    /// (category, business unit label) in rule order
    business_units: Vec<(String, Option<String>)>,
}

impl Router {
    pub fn new(scorer: LexicalScorer, boosts: ContextBoostConfig) -> Self {
        let business_units = scorer.categories().map(|c| (c.to_string(), None)).collect();
        Self {
            scorer,
            boosts,
            business_units,
        }
    }

    /// Compile the routing table
    pub fn from_config(config: &RoutingRulesConfig) -> Result<Self, AgentError> {
        let rules = config
            .categories
            .iter()
            .map(|c| ScoringRule {
                category: c.name.clone(),
                keywords: c.keywords.clone(),
                patterns: c.patterns.clone(),
                intents: c
                    .intents
                    .iter()
                    .map(|i| IntentTrigger {
                        name: i.name.clone(),
                        phrases: i.triggers.clone(),
                    })
                    .collect(),
            })
            .collect();

        let ambiguous = config
            .ambiguous_keywords
            .iter()
            .map(|a| AmbiguousRule {
                keyword: a.keyword.clone(),
                categories: a.categories.clone(),
            })
            .collect();

        let scorer = LexicalScorer::new(rules, ambiguous)?;
        let business_units = config
            .categories
            .iter()
            .map(|c| (c.name.clone(), c.business_unit.clone()))
            .collect();

        tracing::debug!(
            categories = config.categories.len(),
            ambiguous_keywords = config.ambiguous_keywords.len(),
            "Router compiled"
        );

        Ok(Self {
            scorer,
            boosts: config.context_boosts.clone(),
            business_units,
        })
    }

    /// Business unit label configured for a category
    pub fn business_unit_for(&self, category: &str) -> Option<&str> {
        self.business_units
            .iter()
            .find(|(c, _)| c == category)
            .and_then(|(_, unit)| unit.as_deref())
    }

    /// Score boosts derived from the session snapshot
    pub fn context_adjustments(&self, context: &SessionContext) -> Vec<ScoreAdjustment> {
        let mut adjustments = Vec::new();

        if let Some(topic) = &context.last_topic {
            if self.scorer.has_category(topic) {
                adjustments.push(ScoreAdjustment::new(
                    topic.clone(),
                    self.boosts.last_topic,
                    "last_topic",
                ));
            }
        }
        if context.is_merchant {
            if let Some(boost) = &self.boosts.merchant {
                adjustments.push(ScoreAdjustment::new(&boost.category, boost.boost, "merchant"));
            }
        }
        if context.recent_card_issues {
            if let Some(boost) = &self.boosts.recent_card_issues {
                adjustments.push(ScoreAdjustment::new(
                    &boost.category,
                    boost.boost,
                    "recent_card_issues",
                ));
            }
        }

        adjustments
    }

    /// Route one message
    pub fn route(&self, text: &str, context: Option<&SessionContext>) -> RoutingDecision {
        let adjustments = context
            .map(|c| self.context_adjustments(c))
            .unwrap_or_default();
        let scores = self.scorer.score(text, &adjustments);
        let ranked = scores.ranked();

        let (primary, top_score) = match ranked.first() {
            Some((category, score)) if *score > 0.0 => (category.to_string(), *score),
            _ => {
                let mut decision = RoutingDecision::unknown(reasoning(&scores, UNKNOWN_UNIT, 0.0));
                decision.ambiguous_terms = scores.ambiguous_terms;
                return decision;
            }
        };

        let confidence = (top_score / CONFIDENCE_SCALE).clamp(0.0, 1.0);

        let alternative_units: Vec<String> = ranked
            .iter()
            .skip(1)
            .filter(|(_, score)| *score > 0.0)
            .take(MAX_ALTERNATIVES)
            .map(|(category, _)| category.to_string())
            .collect();

        let near_tie = ranked
            .get(1)
            .is_some_and(|(_, second)| *second > 0.0 && top_score - second < NEAR_TIE_MARGIN);
        let ambiguous = scores.has_ambiguity() && confidence < AMBIGUITY_CONFIDENCE_THRESHOLD;
        let requires_clarification = ambiguous || near_tie;

        tracing::debug!(
            primary = %primary,
            confidence,
            near_tie,
            ambiguous,
            alternatives = alternative_units.len(),
            "Routed message"
        );

        RoutingDecision {
            reasoning: reasoning(&scores, &primary, top_score),
            primary_unit: primary,
            confidence,
            alternative_units,
            requires_clarification,
            detected_keywords: scores.matched_keywords,
            detected_intents: scores.matched_intents,
            ambiguous_terms: scores.ambiguous_terms,
        }
    }
}

/// Deterministic audit string for a decision
fn reasoning(scores: &LexicalScores, primary: &str, top_score: f32) -> String {
    let join = |set: &std::collections::BTreeSet<String>| {
        if set.is_empty() {
            "none".to_string()
        } else {
            set.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    };

    let mut out = format!("primary={} top_score={:.2}", primary, top_score);
    let _ = write!(out, "; keywords: {}", join(&scores.matched_keywords));
    let _ = write!(out, "; patterns: {}", scores.matched_patterns.len());
    let _ = write!(out, "; intents: {}", join(&scores.matched_intents));
    let _ = write!(out, "; ambiguous: {}", join(&scores.ambiguous_terms));
    if !scores.applied_adjustments.is_empty() {
        let boosts: Vec<String> = scores
            .applied_adjustments
            .iter()
            .map(|a| format!("{}(+{:.1} {})", a.reason, a.boost, a.category))
            .collect();
        let _ = write!(out, "; boosts: {}", boosts.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_config::{AmbiguousKeyword, CategoryBoost, CategoryRules, IntentRule};

    fn category(name: &str, keywords: &[&str]) -> CategoryRules {
        CategoryRules {
            name: name.to_string(),
            display_name: None,
            business_unit: None,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            patterns: Vec::new(),
            intents: Vec::new(),
        }
    }

    fn router() -> Router {
        let mut acquiring = category("acquiring", &["maquininha", "vendas"]);
        acquiring.business_unit = Some("Adquirência".to_string());
        acquiring.intents.push(IntentRule {
            name: "anticipation".to_string(),
            triggers: vec!["antecipar".to_string()],
        });

        let config = RoutingRulesConfig {
            categories: vec![
                category("card_issuing", &["cartão", "recarga"]),
                category("digital_account", &["pix", "conta"]),
                acquiring,
            ],
            ambiguous_keywords: vec![AmbiguousKeyword {
                keyword: "problema".to_string(),
                categories: vec![
                    "card_issuing".to_string(),
                    "digital_account".to_string(),
                    "acquiring".to_string(),
                ],
            }],
            context_boosts: ContextBoostConfig {
                last_topic: 1.0,
                merchant: Some(CategoryBoost {
                    category: "acquiring".to_string(),
                    boost: 1.0,
                }),
                recent_card_issues: None,
            },
        };
        Router::from_config(&config).unwrap()
    }

    #[test]
    fn test_dominant_category() {
        let decision = router().route("quero antecipar as vendas da maquininha", None);
        assert_eq!(decision.primary_unit, "acquiring");
        assert!((decision.confidence - 0.35).abs() < 1e-6);
        assert!(!decision.requires_clarification);
        assert!(decision.alternative_units.is_empty());
        assert!(decision.detected_intents.contains("anticipation"));
    }

    #[test]
    fn test_near_tie_requires_clarification() {
        let decision = router().route("pix do cartão", None);
        assert!(decision.requires_clarification);
        // equal scores keep rule order
        assert_eq!(decision.primary_unit, "card_issuing");
        assert_eq!(decision.alternative_units, vec!["digital_account"]);
    }

    #[test]
    fn test_ambiguous_keyword() {
        let decision = router().route("problema", None);
        assert!(decision.requires_clarification);
        assert!(decision.ambiguous_terms.contains("problema"));
        assert_eq!(decision.alternative_units.len(), 2);
        assert!(decision.confidence < AMBIGUITY_CONFIDENCE_THRESHOLD);
    }

    #[test]
    fn test_unknown() {
        for text in ["", "   ", "bom dia", "!!!"] {
            let decision = router().route(text, None);
            assert!(decision.is_unknown(), "{text:?}");
            assert_eq!(decision.confidence, 0.0);
            assert!(!decision.requires_clarification);
            assert!(decision.alternative_units.is_empty());
        }
    }

    #[test]
    fn test_context_boosts() {
        let context = SessionContext::new().with_merchant(true);
        let decision = router().route("problema no pix", Some(&context));
        // pix (1.0) + share vs merchant boost (1.0) + share: tie broken by rule order
        assert_eq!(decision.primary_unit, "digital_account");
        assert_eq!(decision.alternative_units[0], "acquiring");
        assert!(decision.reasoning.contains("merchant"));

        let context = SessionContext::new().with_last_topic("card_issuing");
        let adjustments = router().context_adjustments(&context);
        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].category, "card_issuing");
    }

    #[test]
    fn test_unknown_last_topic_ignored() {
        let context = SessionContext::new().with_last_topic("insurance");
        assert!(router().context_adjustments(&context).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let r = router();
        let text = "Minha maquininha não liga e o pix não caiu na conta";
        assert_eq!(r.route(text, None), r.route(text, None));
    }

    #[test]
    fn test_business_unit_lookup() {
        let r = router();
        assert_eq!(r.business_unit_for("acquiring"), Some("Adquirência"));
        assert_eq!(r.business_unit_for("card_issuing"), None);
    }

    #[test]
    fn test_confidence_saturates() {
        let text = "maquininha vendas antecipar maquininha vendas ".repeat(5);
        let decision = router().route(&text, None);
        assert!(decision.confidence <= 1.0);
    }
}
