//! End-to-end checks against the shipped payments domain

use std::sync::Arc;

use triage_agent::{DecisionEngine, EscalationDetector, Router, SessionState};
use triage_config::{DomainConfig, EngineSettings};
use triage_core::{ClarificationKind, RecommendedAction, SessionContext};

const DOMAIN_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/domains/payments");

fn domain() -> DomainConfig {
    DomainConfig::load_validated(DOMAIN_DIR, true).expect("shipped domain loads")
}

fn engine() -> DecisionEngine {
    DecisionEngine::from_domain(&domain(), EngineSettings::default()).unwrap()
}

const SAMPLES: &[&str] = &[
    "",
    "   ",
    "?!?!",
    "problema",
    "Quero antecipar minhas vendas da máquina",
    "meu pix não caiu na conta",
    "minha recarga não caiu no cartão pré-pago",
    "a maquininha não liga de novo!!!",
    "ABSURDO, VOU NO PROCON",
    "quero falar com um atendente humano",
    "senha",
    "limite",
    "taxa de crédito",
];

#[test]
fn test_dominant_category_needs_no_clarification() {
    let router = Router::from_config(&domain().routing).unwrap();
    let decision = router.route("Quero antecipar minhas vendas da máquina", None);

    assert_eq!(decision.primary_unit, "acquiring");
    assert_eq!(router.business_unit_for(&decision.primary_unit), Some("Adquirência"));
    assert!(decision.confidence > 0.0);
    assert!(!decision.requires_clarification);
    assert!(decision.ambiguous_terms.is_empty());
    assert!(decision.detected_intents.contains("anticipation"));
}

#[test]
fn test_single_ambiguous_word() {
    let (turn, _) = engine().assess("problema", &SessionState::new());

    assert!(turn.routing.requires_clarification);
    let clarification = turn.clarification.expect("clarification planned");
    assert_eq!(clarification.kind, Some(ClarificationKind::AmbiguousTopic));
    assert!(!clarification.questions.is_empty());
    assert!(clarification.questions.len() <= 2);
}

#[test]
fn test_explicit_handoff_request() {
    let detector = EscalationDetector::new(domain().escalation);
    for interaction_count in [0, 1, 10, 100] {
        let signal = detector.detect("quero falar com um atendente humano", interaction_count, 0);
        assert_eq!(signal.level, 3);
        assert!(signal.explicit_request);
        assert_eq!(signal.recommended_action, RecommendedAction::Escalate);
    }
}

#[test]
fn test_routing_is_idempotent() {
    let router = Router::from_config(&domain().routing).unwrap();
    for text in SAMPLES {
        assert_eq!(router.route(text, None), router.route(text, None), "{text:?}");
    }
}

#[test]
fn test_bounds_hold_for_all_inputs() {
    let engine = engine();
    let context = SessionContext::new()
        .with_merchant(true)
        .with_recent_card_issues(true)
        .with_last_topic("digital_account")
        .with_counters(50, 10);
    let state = SessionState::with_context(context);

    for text in SAMPLES {
        let (turn, _) = engine.assess(text, &state);
        assert!((0.0..=1.0).contains(&turn.routing.confidence), "{text:?}");
        assert!(turn.escalation.level <= 3, "{text:?}");
        assert!(turn.routing.alternative_units.len() <= 3, "{text:?}");
        if let Some(c) = &turn.clarification {
            assert!(c.questions.len() <= 2, "{text:?}");
        }
    }
}

#[test]
fn test_empty_input_degrades_gracefully() {
    let (turn, state) = engine().assess("", &SessionState::new());
    assert!(turn.routing.is_unknown());
    assert_eq!(turn.routing.confidence, 0.0);
    assert_eq!(turn.escalation.level, 0);
    assert!(!turn.handoff);
    assert!(state.context.last_topic.is_none());
}

#[test]
fn test_independent_sessions_in_parallel() {
    let engine = Arc::new(engine());
    let expected: Vec<_> = SAMPLES
        .iter()
        .map(|t| engine.assess(t, &SessionState::new()).0)
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                scope.spawn(move || {
                    SAMPLES
                        .iter()
                        .map(|t| engine.assess(t, &SessionState::new()).0)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_escalating_conversation() {
    let engine = engine();
    let mut state = SessionState::new();
    let messages = [
        "meu pix não caiu",
        "ainda não caiu, que demora",
        "isso é um absurdo, ninguém resolve!!!",
    ];

    let mut last = None;
    for message in messages {
        let (turn, next) = engine.assess(message, &state);
        state = next;
        last = Some(turn);
    }

    let turn = last.unwrap();
    assert!(turn.trend.escalating);
    assert_eq!(state.escalation_history.len(), 3);
    assert_eq!(state.frustration_level(), turn.escalation.level);
}
