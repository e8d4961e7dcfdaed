//! Proxy routes: `POST /api/ai-agent` and `POST /api/services-agent`.
//!
//! Upstream JSON is relayed with 200. Any failure (unparseable body, transport error,
//! upstream non-2xx, upstream non-JSON) becomes 500 with a fixed payload; the upstream
//! status is logged, never returned.

use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use portal_core::{AgentError, AgentResult, ProxyRequest, PROXY_ERROR_MESSAGE};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct ServicesRequest {
    #[serde(default)]
    question: Option<String>,
}

/// POST /api/ai-agent – forward `{question}` to the agent picked by `endpoint`.
pub(crate) async fn ai_agent_post(State(state): State<AppState>, body: Bytes) -> Response {
    let result = match serde_json::from_slice::<ProxyRequest>(&body) {
        Ok(request) => state.gateway.forward(&request).await,
        Err(e) => Err(AgentError::InvalidRequest(e.to_string())),
    };
    relay("ai-agent", result)
}

/// POST /api/services-agent – forward `{question}` to the services-catalog agent.
pub(crate) async fn services_agent_post(State(state): State<AppState>, body: Bytes) -> Response {
    let result = match serde_json::from_slice::<ServicesRequest>(&body) {
        Ok(request) => state.gateway.forward_services(request.question.as_deref()).await,
        Err(e) => Err(AgentError::InvalidRequest(e.to_string())),
    };
    relay("services-agent", result)
}

fn relay(route: &'static str, result: AgentResult<serde_json::Value>) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => {
            tracing::error!(target: "portal::proxy", route, error = %e, "Proxy error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": PROXY_ERROR_MESSAGE })),
            )
                .into_response()
        }
    }
}
