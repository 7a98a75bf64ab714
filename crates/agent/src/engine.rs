//! Decision Engine
//!
//! Runs routing, escalation detection and clarification planning for one
//! inbound message. Session state goes in by reference and the next state
//! comes back by value, so one engine can serve any number of concurrent
//! sessions without locking.

use serde::{Deserialize, Serialize};

use triage_config::{DomainConfig, EngineSettings, Settings};
use triage_core::{
    ClarificationRequest, EscalationSignal, EscalationTrend, RoutingDecision, SessionContext,
};

use crate::clarification::ClarificationPlanner;
use crate::escalation::{analyze_trend, EscalationDetector};
use crate::router::Router;
use crate::AgentError;

/// Session state owned by the orchestration layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Snapshot handed to routing and clarification
    pub context: SessionContext,
    /// Escalation level per message, oldest first
    #[serde(default)]
    pub escalation_history: Vec<u8>,
    /// Routed unit per message, oldest first
    #[serde(default)]
    pub routing_history: Vec<String>,
    /// Clarification asked on the previous turn, if any
    #[serde(default)]
    pub pending_clarification: Option<ClarificationRequest>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(context: SessionContext) -> Self {
        Self {
            context,
            ..Default::default()
        }
    }

    /// Record an attempt the orchestration layer considers failed
    pub fn record_failed_attempt(&mut self) {
        self.context.failed_attempts = self.context.failed_attempts.saturating_add(1);
    }

    pub fn frustration_level(&self) -> u8 {
        self.context.frustration_level
    }
}

/// Everything decided for one message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnAssessment {
    pub routing: RoutingDecision,
    pub escalation: EscalationSignal,
    pub trend: EscalationTrend,
    /// Present only when a question should be asked
    pub clarification: Option<ClarificationRequest>,
    /// The message answered the clarification asked on the previous turn
    pub answered_pending: bool,
    /// Hand the conversation to a human
    pub handoff: bool,
}

/// Per-message decision facade
pub struct DecisionEngine {
    router: Router,
    detector: EscalationDetector,
    planner: ClarificationPlanner,
    settings: EngineSettings,
}

impl DecisionEngine {
    pub fn new(
        router: Router,
        detector: EscalationDetector,
        planner: ClarificationPlanner,
        settings: EngineSettings,
    ) -> Self {
        Self {
            router,
            detector,
            planner,
            settings,
        }
    }

    /// Build all components from a loaded domain
    pub fn from_domain(domain: &DomainConfig, settings: EngineSettings) -> Result<Self, AgentError> {
        let router = Router::from_config(&domain.routing)?;
        let detector = EscalationDetector::new(domain.escalation.clone());
        let planner = ClarificationPlanner::new(&domain.clarification, &domain.routing)?;

        tracing::info!(domain = %domain.domain_id, "Decision engine ready");
        Ok(Self::new(router, detector, planner, settings))
    }

    /// Load the configured domain and build the engine
    ///
    /// Validation warnings fail startup in strict environments.
    pub fn from_settings(settings: &Settings) -> Result<Self, AgentError> {
        let domain = DomainConfig::load_validated(
            &settings.domain_config_dir,
            settings.environment.is_strict(),
        )
        .map_err(|e| AgentError::Configuration(e.to_string()))?;
        Self::from_domain(&domain, settings.engine.clone())
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn detector(&self) -> &EscalationDetector {
        &self.detector
    }

    pub fn planner(&self) -> &ClarificationPlanner {
        &self.planner
    }

    /// Assess one message and return the next session state
    pub fn assess(&self, text: &str, state: &SessionState) -> (TurnAssessment, SessionState) {
        let mut next = state.clone();
        // The counter includes the current message
        next.context.interaction_count = state.context.interaction_count.saturating_add(1);

        let answered_pending = state
            .pending_clarification
            .as_ref()
            .is_some_and(|pending| self.planner.is_answered(pending, text));

        let routing = self.router.route(text, Some(&state.context));
        let escalation = self.detector.detect(
            text,
            next.context.interaction_count,
            next.context.failed_attempts,
        );

        push_bounded(
            &mut next.escalation_history,
            escalation.level,
            self.settings.history_window,
        );
        let trend = analyze_trend(&next.escalation_history);

        let handoff = escalation.requires_handoff();
        let clarification = if handoff && self.settings.skip_clarification_on_escalation {
            None
        } else {
            let request = self.planner.plan(text, &routing, &state.context);
            request.is_needed().then_some(request)
        };

        // Frustration never decreases within a session
        next.context.frustration_level = state.context.frustration_level.max(escalation.level);
        // An unsettled decision's primary is only the rule-order pick
        if !routing.is_unknown() && !routing.requires_clarification {
            next.context.last_topic = Some(routing.primary_unit.clone());
        }
        push_bounded(
            &mut next.routing_history,
            routing.primary_unit.clone(),
            self.settings.history_window,
        );
        next.pending_clarification = clarification.clone();

        tracing::debug!(
            unit = %routing.primary_unit,
            confidence = routing.confidence,
            escalation_level = escalation.level,
            handoff,
            clarify = clarification.is_some(),
            "Turn assessed"
        );

        (
            TurnAssessment {
                routing,
                escalation,
                trend,
                clarification,
                answered_pending,
                handoff,
            },
            next,
        )
    }
}

fn push_bounded<T>(history: &mut Vec<T>, value: T, window: usize) {
    history.push(value);
    if history.len() > window {
        let excess = history.len() - window;
        history.drain(..excess);
    }
}
