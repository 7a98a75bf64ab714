//! Escalation Detector
//!
//! Scores a message for frustration and urgency and decides whether a human
//! should take over. Explicit requests and giving-up phrases short-circuit to
//! the top level; everything else is a weighted sum mapped to four buckets.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use triage_config::EscalationLexicon;
use triage_core::{EscalationSignal, EscalationTrend};
use triage_text_processing::normalize;

/// Interaction count above which one point is added
pub const LONG_CONVERSATION_THRESHOLD: u32 = 5;
/// Failed attempts above which one point is added
pub const FAILED_ATTEMPTS_THRESHOLD: u32 = 2;
/// Number of recent levels considered by [`analyze_trend`]
pub const TREND_WINDOW: usize = 3;

pub const INDICATOR_ALL_CAPS: &str = "all_caps";
pub const INDICATOR_REPEATED_PUNCTUATION: &str = "repeated_punctuation";
pub const INDICATOR_ELONGATED_WORD: &str = "elongated_word";

/// Two consecutive all-caps words; a lone acronym such as "PIX" is not shouting
static ALL_CAPS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\p{Lu}{2,}\b[^\p{L}\p{N}]+\b\p{Lu}{2,}\b").expect("valid all-caps regex")
});
static REPEATED_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[!?]{2,}").expect("valid punctuation regex"));

/// Lexicon-driven escalation detector
pub struct EscalationDetector {
    lexicon: EscalationLexicon,
}

impl EscalationDetector {
    pub fn new(lexicon: EscalationLexicon) -> Self {
        let lexicon = EscalationLexicon {
            explicit_requests: normalize_all(&lexicon.explicit_requests),
            giving_up: normalize_all(&lexicon.giving_up),
            high_severity: normalize_all(&lexicon.high_severity),
            medium_severity: normalize_all(&lexicon.medium_severity),
            low_severity: normalize_all(&lexicon.low_severity),
        };
        Self { lexicon }
    }

    /// Escalation signal for one message
    pub fn detect(&self, text: &str, interaction_count: u32, failed_attempts: u32) -> EscalationSignal {
        let normalized = normalize(text);

        if let Some(phrase) = first_match(&normalized, &self.lexicon.explicit_requests) {
            tracing::info!(phrase = %phrase, "Explicit human handoff request");
            return EscalationSignal::explicit(phrase);
        }
        if let Some(phrase) = first_match(&normalized, &self.lexicon.giving_up) {
            tracing::info!(phrase = %phrase, "Customer is giving up");
            return EscalationSignal::giving_up(phrase);
        }

        let mut score = 0u32;
        let mut detected_terms = BTreeSet::new();
        for (terms, weight) in self.lexicon.weighted_tiers() {
            for term in terms {
                if !term.is_empty() && normalized.contains(term.as_str()) {
                    score += weight;
                    detected_terms.insert(term.clone());
                }
            }
        }

        // Indicators need the original casing and punctuation
        let emotional_indicators = emotional_indicators(text);
        score += emotional_indicators.len() as u32;

        if interaction_count > LONG_CONVERSATION_THRESHOLD {
            score += 1;
        }
        if failed_attempts > FAILED_ATTEMPTS_THRESHOLD {
            score += 1;
        }

        let mut signal = EscalationSignal::from_level(level_for_score(score));
        signal.detected_terms = detected_terms;
        signal.emotional_indicators = emotional_indicators;

        tracing::debug!(
            score,
            level = signal.level,
            action = signal.recommended_action.display_name(),
            "Escalation scored"
        );
        signal
    }
}

/// Map a weighted score to a level in 0..=3
pub fn level_for_score(score: u32) -> u8 {
    match score {
        s if s >= 6 => 3,
        s if s >= 4 => 2,
        s if s >= 2 => 1,
        _ => 0,
    }
}

/// Advisory trend over a session's escalation levels, oldest first
///
/// Both flags need at least [`TREND_WINDOW`] levels.
pub fn analyze_trend(levels: &[u8]) -> EscalationTrend {
    if levels.len() < TREND_WINDOW {
        return EscalationTrend::default();
    }
    let recent = &levels[levels.len() - TREND_WINDOW..];
    let escalating = recent.windows(2).all(|w| w[0] <= w[1]);
    let mean = recent.iter().map(|&l| f32::from(l)).sum::<f32>() / TREND_WINDOW as f32;

    EscalationTrend {
        escalating,
        consistently_high: mean >= 2.0,
    }
}

/// Distinct emotional indicators in the raw text
fn emotional_indicators(text: &str) -> BTreeSet<String> {
    let mut indicators = BTreeSet::new();
    if ALL_CAPS.is_match(text) {
        indicators.insert(INDICATOR_ALL_CAPS.to_string());
    }
    if REPEATED_PUNCTUATION.is_match(text) {
        indicators.insert(INDICATOR_REPEATED_PUNCTUATION.to_string());
    }
    if has_elongated_word(text) {
        indicators.insert(INDICATOR_ELONGATED_WORD.to_string());
    }
    indicators
}

/// Three or more identical letters in a row, e.g. "nãooo"
fn has_elongated_word(text: &str) -> bool {
    let mut previous: Option<char> = None;
    let mut run = 0;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphabetic() && Some(c) == previous {
            run += 1;
            if run >= 3 {
                return true;
            }
        } else {
            run = 1;
        }
        previous = Some(c);
    }
    false
}

fn first_match(text: &str, phrases: &[String]) -> Option<String> {
    phrases
        .iter()
        .find(|p| !p.is_empty() && text.contains(p.as_str()))
        .cloned()
}

fn normalize_all(phrases: &[String]) -> Vec<String> {
    phrases.iter().map(|p| normalize(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::RecommendedAction;

    fn detector() -> EscalationDetector {
        EscalationDetector::new(EscalationLexicon {
            explicit_requests: vec!["atendente humano".into(), "falar com alguém".into()],
            giving_up: vec!["desisto".into()],
            high_severity: vec!["absurdo".into(), "procon".into()],
            medium_severity: vec!["irritado".into(), "de novo".into()],
            low_severity: vec!["problema".into(), "ainda".into()],
        })
    }

    #[test]
    fn test_explicit_request_short_circuits() {
        for count in [0, 3, 50] {
            let signal = detector().detect("Quero falar com um ATENDENTE HUMANO!!!", count, 0);
            assert_eq!(signal.level, 3);
            assert!(signal.explicit_request);
            assert!(!signal.giving_up);
            assert_eq!(signal.recommended_action, RecommendedAction::Escalate);
            // no further scoring
            assert!(signal.emotional_indicators.is_empty());
        }
    }

    #[test]
    fn test_giving_up() {
        let signal = detector().detect("Desisto, sério", 0, 0);
        assert_eq!(signal.level, 3);
        assert!(signal.giving_up);
        assert!(signal.requires_handoff());
    }

    #[test]
    fn test_weighted_levels() {
        let d = detector();
        assert_eq!(d.detect("tudo certo, obrigado", 0, 0).level, 0);
        // low x1 twice
        assert_eq!(d.detect("ainda com problema", 0, 0).level, 1);
        // high x3 + medium x2
        let signal = d.detect("isso é um absurdo, estou irritado", 0, 0);
        assert_eq!(signal.level, 2);
        assert_eq!(signal.recommended_action, RecommendedAction::Empathize);
        assert_eq!(signal.detected_terms.len(), 2);
        // 3 + 3 = 6
        assert_eq!(d.detect("absurdo, vou no procon", 0, 0).level, 3);
    }

    #[test]
    fn test_session_counters() {
        let d = detector();
        assert_eq!(d.detect("problema", 0, 0).level, 0);
        assert_eq!(d.detect("problema", 6, 0).level, 1);
        assert_eq!(d.detect("problema", 6, 3).level, 1);
        assert_eq!(d.detect("ainda com problema", 6, 3).level, 2);
        // thresholds are strict
        assert_eq!(d.detect("problema", 5, 2).level, 0);
    }

    #[test]
    fn test_emotional_indicators() {
        let signal = detector().detect("NÃO FUNCIONA??? nãooo", 0, 0);
        assert_eq!(
            signal.emotional_indicators,
            [
                INDICATOR_ALL_CAPS,
                INDICATOR_ELONGATED_WORD,
                INDICATOR_REPEATED_PUNCTUATION
            ]
            .iter()
            .map(|s| s.to_string())
            .collect::<BTreeSet<String>>()
        );
        assert_eq!(signal.level, 1);
    }

    #[test]
    fn test_indicator_edge_cases() {
        assert!(emotional_indicators("PIX").is_empty());
        assert!(emotional_indicators("meu PIX e CPF não batem").is_empty());
        assert!(emotional_indicators("ABSURDO, VOU NO PROCON").contains(INDICATOR_ALL_CAPS));
        assert!(emotional_indicators("o app NÃO FUNCIONA").contains(INDICATOR_ALL_CAPS));
        assert!(emotional_indicators("Oi, tudo bem?").is_empty());
        assert!(emotional_indicators("ok?!").contains(INDICATOR_REPEATED_PUNCTUATION));
        assert!(!has_elongated_word("arroz 111"));
        assert!(has_elongated_word("Socorrrro"));
    }

    #[test]
    fn test_level_bounds() {
        let d = detector();
        for text in ["", "   ", "?", "ABSURDO!!! PROCON!!! DE NOVO!!! irritadooo"] {
            let signal = d.detect(text, u32::MAX, u32::MAX);
            assert!(signal.level <= 3, "{text:?}");
        }
        assert_eq!(d.detect("", 0, 0), EscalationSignal::calm());
    }

    #[test]
    fn test_level_for_score() {
        assert_eq!(level_for_score(0), 0);
        assert_eq!(level_for_score(1), 0);
        assert_eq!(level_for_score(2), 1);
        assert_eq!(level_for_score(4), 2);
        assert_eq!(level_for_score(6), 3);
        assert_eq!(level_for_score(40), 3);
    }

    #[test]
    fn test_trend() {
        assert_eq!(analyze_trend(&[]), EscalationTrend::default());
        assert_eq!(analyze_trend(&[2, 3]), EscalationTrend::default());

        let trend = analyze_trend(&[3, 0, 1, 1]);
        assert!(trend.escalating);
        assert!(!trend.consistently_high);

        let trend = analyze_trend(&[3, 2, 2]);
        assert!(!trend.escalating);
        assert!(trend.consistently_high);

        assert!(analyze_trend(&[1, 2, 3]).consistently_high);
    }
}
