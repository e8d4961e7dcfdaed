//! Integration test: data-domain chat flow through the dual-agent fallback.
//!
//! ## Scenarios
//! 1. Primary knows the answer: purple ENTIDADES label, secondary never called.
//! 2. Primary answers with the sentinel: green BOM DE BIAN 12 label, one secondary call.
//! 3. Primary transport failure: local fallback text, no escalation.
//! 4. Repeated questions produce independent message pairs.

use async_trait::async_trait;
use portal_core::orchestrator::{PRIMARY_ERROR_TEXT, PRIMARY_LABEL, SECONDARY_LABEL};
use portal_core::{
    AgentClient, AgentError, AgentResult, ChatSession, ChatWidget, EndpointSelector,
    FallbackOrchestrator, Sender,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Helper: an agent pair answering from a question -> reply table
// ---------------------------------------------------------------------------

#[derive(Default)]
struct AgentPair {
    primary: HashMap<String, AgentResult<String>>,
    secondary: HashMap<String, AgentResult<String>>,
    calls: Mutex<Vec<(EndpointSelector, String)>>,
}

impl AgentPair {
    fn primary(mut self, question: &str, reply: AgentResult<&str>) -> Self {
        self.primary
            .insert(question.to_string(), reply.map(str::to_string));
        self
    }

    fn secondary(mut self, question: &str, reply: AgentResult<&str>) -> Self {
        self.secondary
            .insert(question.to_string(), reply.map(str::to_string));
        self
    }

    fn calls_to(&self, selector: EndpointSelector) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == selector)
            .count()
    }
}

#[async_trait]
impl AgentClient for AgentPair {
    async fn ask(&self, selector: EndpointSelector, question: &str) -> AgentResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((selector, question.to_string()));
        let table = match selector {
            EndpointSelector::Primary => &self.primary,
            EndpointSelector::Secondary => &self.secondary,
        };
        table
            .get(question)
            .cloned()
            .unwrap_or(Err(AgentError::MissingAnswer))
    }
}

const KNOWN: &str = "¿Qué es Data Domain?";
const UNKNOWN: &str = "¿Cuál es el clima en Marte?";
const OFFLINE: &str = "¿Hay alguien?";

fn agents() -> AgentPair {
    AgentPair::default()
        .primary(KNOWN, Ok("Es un dominio de datos."))
        .primary(UNKNOWN, Ok("NO_SÉ: fuera de alcance"))
        .secondary(UNKNOWN, Ok("No tengo información sobre el clima."))
        .primary(OFFLINE, Err(AgentError::Transport("connection refused".into())))
        .secondary(OFFLINE, Ok("should never be asked"))
}

#[tokio::test]
async fn known_question_is_answered_by_primary() {
    let orch = FallbackOrchestrator::new(agents());
    let text = orch.answer(KNOWN).await;

    assert!(text.starts_with(PRIMARY_LABEL));
    assert!(text.contains("ENTIDADES"));
    assert!(text.ends_with("Es un dominio de datos."));
    assert_eq!(orch.client().calls_to(EndpointSelector::Secondary), 0);
}

#[tokio::test]
async fn sentinel_answer_escalates_to_secondary() {
    let orch = FallbackOrchestrator::new(agents());
    let text = orch.answer(UNKNOWN).await;

    assert!(text.starts_with(SECONDARY_LABEL));
    assert!(text.contains("BOM DE BIAN 12"));
    assert!(text.ends_with("No tengo información sobre el clima."));
    assert_eq!(orch.client().calls_to(EndpointSelector::Primary), 1);
    assert_eq!(orch.client().calls_to(EndpointSelector::Secondary), 1);
}

#[tokio::test]
async fn primary_transport_failure_never_escalates() {
    let orch = FallbackOrchestrator::new(agents());
    let text = orch.answer(OFFLINE).await;

    assert_eq!(text, format!("{PRIMARY_LABEL}{PRIMARY_ERROR_TEXT}"));
    assert_eq!(orch.client().calls_to(EndpointSelector::Secondary), 0);
}

#[tokio::test]
async fn chat_history_records_each_exchange_in_order() {
    let orch = Arc::new(FallbackOrchestrator::new(agents()));
    let session = Arc::new(ChatSession::new(ChatWidget::DataDomain));

    for question in [KNOWN, UNKNOWN, KNOWN] {
        session.send(Arc::clone(&orch), question).await.unwrap();
    }

    let history = session.history().await;
    assert_eq!(history.len(), 7);
    let senders: Vec<Sender> = history.iter().map(|m| m.sender).collect();
    assert_eq!(
        senders,
        vec![
            Sender::Ai,
            Sender::User,
            Sender::Ai,
            Sender::User,
            Sender::Ai,
            Sender::User,
            Sender::Ai
        ]
    );
    assert!(history[4].text.starts_with(SECONDARY_LABEL));
    // Same question twice: same content, distinct messages.
    assert_eq!(history[2].text, history[6].text);
    assert_ne!(history[2].id, history[6].id);
    assert_eq!(orch.client().calls_to(EndpointSelector::Primary), 3);
    assert_eq!(orch.client().calls_to(EndpointSelector::Secondary), 1);
}
