//! Chat routes: one server-side session per widget (`data-domain`, `services-catalog`).
//!
//! The data-domain widget answers through the fallback orchestrator; the services widget
//! through the single services agent. A session accepts one question at a time.

use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use portal_core::{render_ai_text, ChatError, ChatMessage, ChatWidget, Responder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct ChatSendRequest {
    #[serde(default)]
    message: String,
}

/// A message as the widget displays it.
#[derive(Debug, Serialize)]
pub(crate) struct ChatMessageView {
    #[serde(flatten)]
    message: ChatMessage,
    display_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<String>,
}

impl ChatMessageView {
    fn new(widget: ChatWidget, message: ChatMessage) -> Self {
        let html = widget
            .renders_markup()
            .then(|| render_ai_text(&message.text));
        Self {
            display_time: message.display_time(),
            message,
            html,
        }
    }
}

type ChatResponse = (StatusCode, Json<serde_json::Value>);

fn unknown_widget(slug: &str) -> ChatResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": format!("Unknown chat widget: {}", slug) })),
    )
}

/// GET /api/v1/chat/:widget – ordered history of the widget's session.
pub(crate) async fn chat_history_get(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ChatResponse {
    let Some(widget) = ChatWidget::from_slug(&slug) else {
        return unknown_widget(&slug);
    };
    let session = state.sessions.get(widget);
    let messages: Vec<ChatMessageView> = session
        .history()
        .await
        .into_iter()
        .map(|m| ChatMessageView::new(widget, m))
        .collect();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "widget": widget.slug(),
            "in_flight": session.is_in_flight(),
            "messages": messages,
        })),
    )
}

/// POST /api/v1/chat/:widget – send a message and wait for the agent reply.
///
/// A client that disconnects early does not cancel the exchange; the reply still lands in history.
pub(crate) async fn chat_send_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<ChatSendRequest>,
) -> ChatResponse {
    let Some(widget) = ChatWidget::from_slug(&slug) else {
        return unknown_widget(&slug);
    };
    let responder: Arc<dyn Responder> = match widget {
        ChatWidget::DataDomain => state.fallback.clone(),
        ChatWidget::Services => state.services.clone(),
    };

    let session = state.sessions.get(widget);
    match session.send(responder, &body.message).await {
        Ok(exchange) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "user": ChatMessageView::new(widget, exchange.user),
                "reply": ChatMessageView::new(widget, exchange.reply),
            })),
        ),
        Err(e) => {
            let status = match e {
                ChatError::EmptyMessage => StatusCode::BAD_REQUEST,
                ChatError::Busy => StatusCode::CONFLICT,
                ChatError::Interrupted => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(serde_json::json!({ "error": e.to_string() })))
        }
    }
}
