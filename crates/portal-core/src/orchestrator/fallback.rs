//! Dual-agent fallback: ask the primary agent, escalate to the secondary agent only
//! when the primary answer contains the sentinel marker.
//!
//! ```text
//! START -> CALL_PRIMARY -> SENTINEL_FOUND -> CALL_SECONDARY -> DONE
//!                       \-> NO_SENTINEL -> DONE
//! ```
//!
//! A failed primary call never escalates; only sentinel content does.

use super::traits::Responder;
use crate::client::AgentClient;
use crate::config::DEFAULT_SENTINEL_MARKER;
use crate::error::{AgentError, AgentResult};
use crate::shared::{scalar_as_text, EndpointSelector};
use async_trait::async_trait;

/// Attribution prepended to answers from the primary (Confluence entities) agent.
pub const PRIMARY_LABEL: &str = "**<span style=\"color: #8B5CF6; font-weight: bold;\">ENTIDADES - CONFLUENCE RIPLEY</span>**\n\n";
/// Attribution prepended to answers from the secondary (BIAN 12) agent.
pub const SECONDARY_LABEL: &str = "**<span style=\"color: #10B981; font-weight: bold;\">BOM DE BIAN 12</span>**\n\n";

pub const PRIMARY_NO_ANSWER_TEXT: &str = "No se recibió una respuesta válida del agente principal.";
pub const PRIMARY_ERROR_TEXT: &str = "Error al comunicarse con el agente principal.";
pub const SECONDARY_NO_ANSWER_TEXT: &str = "No se recibió una respuesta válida del agente secundario.";
pub const SECONDARY_ERROR_TEXT: &str =
    "Error al comunicarse con el agente secundario. Por favor, intenta de nuevo.";
pub const AGENT_SYSTEM_ERROR_TEXT: &str = "Error en el sistema de agentes. Por favor, intenta de nuevo.";

/// Result of one agent call as seen by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentTurn {
    Answered(String),
    /// The call failed or carried no usable answer; local fallback text is shown instead.
    Fallback(AgentError),
}

impl AgentTurn {
    fn from_result(result: AgentResult<String>) -> Self {
        match result {
            Ok(answer) => Self::Answered(answer),
            Err(reason) => Self::Fallback(reason),
        }
    }

    /// Text for this turn, substituting the local fallback text for the given agent.
    pub fn text(&self, selector: EndpointSelector) -> &str {
        match (self, selector) {
            (Self::Answered(answer), _) => answer.as_str(),
            (Self::Fallback(reason), EndpointSelector::Primary) if reason.is_empty_reply() => {
                PRIMARY_NO_ANSWER_TEXT
            }
            (Self::Fallback(_), EndpointSelector::Primary) => PRIMARY_ERROR_TEXT,
            (Self::Fallback(reason), EndpointSelector::Secondary) if reason.is_empty_reply() => {
                SECONDARY_NO_ANSWER_TEXT
            }
            (Self::Fallback(_), EndpointSelector::Secondary) => SECONDARY_ERROR_TEXT,
        }
    }
}

/// How a question was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackOutcome {
    /// Primary agent is authoritative: it answered without the sentinel, or its call failed.
    Primary(AgentTurn),
    /// Primary agent signalled it does not know; the secondary agent was consulted once.
    Escalated {
        primary_answer: String,
        secondary: AgentTurn,
    },
    /// The primary reply could not be inspected for the sentinel.
    Aborted(AgentError),
}

impl FallbackOutcome {
    /// The single message displayed in the chat.
    pub fn render(&self) -> String {
        match self {
            Self::Primary(turn) => {
                format!("{}{}", PRIMARY_LABEL, turn.text(EndpointSelector::Primary))
            }
            Self::Escalated { secondary, .. } => {
                format!("{}{}", SECONDARY_LABEL, secondary.text(EndpointSelector::Secondary))
            }
            Self::Aborted(_) => AGENT_SYSTEM_ERROR_TEXT.to_string(),
        }
    }

    pub fn escalated(&self) -> bool {
        matches!(self, Self::Escalated { .. })
    }
}

/// Runs the primary/secondary fallback for one question at a time. Holds no per-question state.
pub struct FallbackOrchestrator<C> {
    client: C,
    sentinel: String,
}

impl<C: AgentClient> FallbackOrchestrator<C> {
    pub fn new(client: C) -> Self {
        Self::with_sentinel(client, DEFAULT_SENTINEL_MARKER)
    }

    pub fn with_sentinel(client: C, sentinel: impl Into<String>) -> Self {
        Self {
            client,
            sentinel: sentinel.into(),
        }
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Resolve a question into a classified outcome. At most two agent calls.
    pub async fn resolve(&self, question: &str) -> FallbackOutcome {
        let primary = match self.client.ask(EndpointSelector::Primary, question).await {
            Err(reason) if reason.is_malformed_answer() => {
                tracing::error!(target: "portal::orchestrator", %reason, "Primary agent answer is not text");
                return FallbackOutcome::Aborted(reason);
            }
            Err(reason) => {
                tracing::warn!(target: "portal::orchestrator", %reason, "Primary agent call failed");
                return FallbackOutcome::Primary(AgentTurn::Fallback(reason));
            }
            Ok(answer) => answer,
        };

        if !primary.contains(self.sentinel.as_str()) {
            tracing::debug!(target: "portal::orchestrator", "Primary agent answered");
            return FallbackOutcome::Primary(AgentTurn::Answered(primary));
        }

        tracing::info!(
            target: "portal::orchestrator",
            sentinel = %self.sentinel,
            "Primary agent does not know, escalating to secondary"
        );
        let secondary = scalar_as_text(self.client.ask(EndpointSelector::Secondary, question).await);
        if let Err(ref reason) = secondary {
            tracing::warn!(target: "portal::orchestrator", %reason, "Secondary agent call failed");
        }
        FallbackOutcome::Escalated {
            primary_answer: primary,
            secondary: AgentTurn::from_result(secondary),
        }
    }

    /// Resolve and render. Always yields displayable text.
    pub async fn answer(&self, question: &str) -> String {
        self.resolve(question).await.render()
    }
}

#[async_trait]
impl<C: AgentClient> Responder for FallbackOrchestrator<C> {
    async fn respond(&self, question: &str) -> String {
        self.answer(question).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replies per selector from a fixed script and records every call.
    struct Scripted {
        primary: AgentResult<String>,
        secondary: AgentResult<String>,
        calls: Mutex<Vec<EndpointSelector>>,
    }

    impl Scripted {
        fn new(primary: AgentResult<String>, secondary: AgentResult<String>) -> Self {
            Self {
                primary,
                secondary,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<EndpointSelector> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AgentClient for Scripted {
        async fn ask(&self, selector: EndpointSelector, _question: &str) -> AgentResult<String> {
            self.calls.lock().unwrap().push(selector);
            match selector {
                EndpointSelector::Primary => self.primary.clone(),
                EndpointSelector::Secondary => self.secondary.clone(),
            }
        }
    }

    #[tokio::test]
    async fn primary_answer_without_sentinel_is_labelled_primary() {
        let orch = FallbackOrchestrator::new(Scripted::new(
            Ok("Es un dominio de datos.".into()),
            Ok("unused".into()),
        ));
        let text = orch.answer("¿Qué es Data Domain?").await;
        assert_eq!(text, format!("{PRIMARY_LABEL}Es un dominio de datos."));
        assert_eq!(orch.client().calls(), vec![EndpointSelector::Primary]);
    }

    #[tokio::test]
    async fn sentinel_escalates_exactly_once() {
        let orch = FallbackOrchestrator::new(Scripted::new(
            Ok("NO_SÉ: fuera de alcance".into()),
            Ok("No tengo información sobre el clima.".into()),
        ));
        let outcome = orch.resolve("¿Cuál es el clima en Marte?").await;
        assert!(outcome.escalated());
        assert_eq!(
            outcome.render(),
            format!("{SECONDARY_LABEL}No tengo información sobre el clima.")
        );
        assert_eq!(
            orch.client().calls(),
            vec![EndpointSelector::Primary, EndpointSelector::Secondary]
        );
    }

    #[tokio::test]
    async fn sentinel_match_is_case_sensitive() {
        let orch = FallbackOrchestrator::new(Scripted::new(
            Ok("no_sé: tal vez".into()),
            Ok("unused".into()),
        ));
        let outcome = orch.resolve("q").await;
        assert!(!outcome.escalated());
        assert_eq!(orch.client().calls().len(), 1);
    }

    #[tokio::test]
    async fn primary_failure_does_not_escalate() {
        let orch = FallbackOrchestrator::new(Scripted::new(
            Err(AgentError::UpstreamStatus(502)),
            Ok("unused".into()),
        ));
        let text = orch.answer("q").await;
        assert_eq!(text, format!("{PRIMARY_LABEL}{PRIMARY_ERROR_TEXT}"));
        assert_eq!(orch.client().calls(), vec![EndpointSelector::Primary]);
    }

    #[tokio::test]
    async fn primary_without_answer_uses_no_answer_text() {
        let orch = FallbackOrchestrator::new(Scripted::new(
            Err(AgentError::MissingAnswer),
            Ok("unused".into()),
        ));
        assert_eq!(orch.answer("q").await, format!("{PRIMARY_LABEL}{PRIMARY_NO_ANSWER_TEXT}"));
    }

    #[tokio::test]
    async fn secondary_failure_keeps_secondary_label() {
        let orch = FallbackOrchestrator::new(Scripted::new(
            Ok("NO_SÉ: nada".into()),
            Err(AgentError::Transport("connection refused".into())),
        ));
        assert_eq!(orch.answer("q").await, format!("{SECONDARY_LABEL}{SECONDARY_ERROR_TEXT}"));

        let orch = FallbackOrchestrator::new(Scripted::new(
            Ok("NO_SÉ: nada".into()),
            Err(AgentError::MissingAnswer),
        ));
        assert_eq!(
            orch.answer("q").await,
            format!("{SECONDARY_LABEL}{SECONDARY_NO_ANSWER_TEXT}")
        );
    }

    #[tokio::test]
    async fn non_text_primary_answer_aborts() {
        let orch = FallbackOrchestrator::new(Scripted::new(
            Err(AgentError::NonTextAnswer),
            Ok("unused".into()),
        ));
        let outcome = orch.resolve("q").await;
        assert_eq!(outcome, FallbackOutcome::Aborted(AgentError::NonTextAnswer));
        assert_eq!(outcome.render(), AGENT_SYSTEM_ERROR_TEXT);
        assert_eq!(orch.client().calls().len(), 1);
    }

    #[tokio::test]
    async fn scalar_primary_answer_aborts() {
        let orch = FallbackOrchestrator::new(Scripted::new(
            Err(AgentError::ScalarAnswer("42".into())),
            Ok("unused".into()),
        ));
        assert_eq!(orch.answer("q").await, AGENT_SYSTEM_ERROR_TEXT);
        assert_eq!(orch.client().calls(), vec![EndpointSelector::Primary]);
    }

    #[tokio::test]
    async fn scalar_secondary_answer_is_shown_after_label() {
        let orch = FallbackOrchestrator::new(Scripted::new(
            Ok("NO_SÉ: nada".into()),
            Err(AgentError::ScalarAnswer("42".into())),
        ));
        assert_eq!(orch.answer("q").await, format!("{SECONDARY_LABEL}42"));

        let orch = FallbackOrchestrator::new(Scripted::new(
            Ok("NO_SÉ: nada".into()),
            Err(AgentError::NonTextAnswer),
        ));
        assert_eq!(orch.answer("q").await, format!("{SECONDARY_LABEL}{SECONDARY_ERROR_TEXT}"));
    }

    #[tokio::test]
    async fn custom_sentinel_is_honoured() {
        let orch = FallbackOrchestrator::with_sentinel(
            Scripted::new(Ok("UNKNOWN: out of scope".into()), Ok("fallback".into())),
            "UNKNOWN:",
        );
        assert_eq!(orch.sentinel(), "UNKNOWN:");
        assert_eq!(orch.answer("q").await, format!("{SECONDARY_LABEL}fallback"));
    }
}
