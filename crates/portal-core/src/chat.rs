//! Chat sessions: append-only message history plus a single in-flight slot per widget.

use crate::error::ChatError;
use crate::orchestrator::{Responder, AGENT_SYSTEM_ERROR_TEXT, SERVICES_ERROR_TEXT};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The two chat widgets of the portal. Each owns an independent session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChatWidget {
    /// Data-domain agent with primary/secondary fallback.
    DataDomain,
    /// Services-catalog agent, single endpoint.
    #[serde(rename = "services-catalog")]
    Services,
}

impl ChatWidget {
    pub const ALL: [ChatWidget; 2] = [ChatWidget::DataDomain, ChatWidget::Services];

    pub fn slug(&self) -> &'static str {
        match self {
            Self::DataDomain => "data-domain",
            Self::Services => "services-catalog",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.slug() == slug)
    }

    pub fn greeting(&self) -> &'static str {
        match self {
            Self::DataDomain => {
                "¡Hola! Soy tu agente IA especializado en Data Domain. ¿En qué puedo ayudarte hoy?"
            }
            Self::Services => {
                "¡Hola! Soy tu agente IA especializado en el Catálogo de Servicios. ¿En qué puedo ayudarte hoy?"
            }
        }
    }

    /// Reply shown when the responder itself breaks down.
    pub fn failure_text(&self) -> &'static str {
        match self {
            Self::DataDomain => AGENT_SYSTEM_ERROR_TEXT,
            Self::Services => SERVICES_ERROR_TEXT,
        }
    }

    /// Whether agent text in this widget is rendered as markup (see [`crate::render_ai_text`]).
    pub fn renders_markup(&self) -> bool {
        matches!(self, Self::DataDomain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// One chat line. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }

    /// `HH:MM`, as shown under each bubble.
    pub fn display_time(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// The user message and the reply appended by one successful [`ChatSession::send`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatExchange {
    pub user: ChatMessage,
    pub reply: ChatMessage,
}

/// In-memory conversation for one widget.
pub struct ChatSession {
    widget: ChatWidget,
    messages: RwLock<Vec<ChatMessage>>,
    in_flight: AtomicBool,
}

/// Owned by the exchange task; clears the in-flight flag when the task ends.
struct InFlight(Arc<ChatSession>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::Release);
    }
}

impl ChatSession {
    pub fn new(widget: ChatWidget) -> Self {
        Self {
            widget,
            messages: RwLock::new(vec![ChatMessage::new(Sender::Ai, widget.greeting())]),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn widget(&self) -> ChatWidget {
        self.widget
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Snapshot of the ordered history.
    pub async fn history(&self) -> Vec<ChatMessage> {
        self.messages.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    /// Append the user's message, ask `responder`, append its reply.
    ///
    /// Empty (after trim) input and a send while another is in flight are rejected
    /// without touching the history. The exchange runs on its own task: once accepted it
    /// completes and appends its reply even if the caller stops waiting, so the history
    /// always alternates user/ai.
    pub async fn send<R>(
        self: &Arc<Self>,
        responder: Arc<R>,
        text: &str,
    ) -> Result<ChatExchange, ChatError>
    where
        R: Responder + ?Sized + 'static,
    {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(target: "portal::chat", widget = self.widget.slug(), "Rejected send while busy");
            return Err(ChatError::Busy);
        }

        let guard = InFlight(Arc::clone(self));
        let question = text.to_string();
        let exchange = tokio::spawn(async move {
            let session = &guard.0;
            let user = ChatMessage::new(Sender::User, question.as_str());
            session.messages.write().await.push(user.clone());

            let answering = tokio::spawn(async move { responder.respond(&question).await });
            let reply_text = match answering.await {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(target: "portal::chat", widget = session.widget.slug(), error = %e, "Responder failed");
                    session.widget.failure_text().to_string()
                }
            };
            let reply = ChatMessage::new(Sender::Ai, reply_text);
            session.messages.write().await.push(reply.clone());

            tracing::info!(target: "portal::chat", widget = session.widget.slug(), "Exchange appended");
            ChatExchange { user, reply }
        });

        exchange.await.map_err(|e| {
            tracing::error!(target: "portal::chat", widget = self.widget.slug(), error = %e, "Exchange task failed");
            ChatError::Interrupted
        })
    }
}

/// Lazily created sessions, one per widget.
#[derive(Default)]
pub struct ChatSessions {
    sessions: DashMap<ChatWidget, Arc<ChatSession>>,
}

impl ChatSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, widget: ChatWidget) -> Arc<ChatSession> {
        self.sessions
            .entry(widget)
            .or_insert_with(|| Arc::new(ChatSession::new(widget)))
            .value()
            .clone()
    }
}
