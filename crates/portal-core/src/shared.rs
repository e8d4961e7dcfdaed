//! Wire types shared by the gateway, the clients and the orchestrator.

use crate::error::{AgentError, AgentResult};
use serde::{Deserialize, Serialize};

/// Which upstream agent a proxied question targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointSelector {
    Primary,
    Secondary,
}

impl EndpointSelector {
    /// Parse the `endpoint` field of a proxy request.
    ///
    /// Only the exact string `"primary"` selects the primary agent. Everything else,
    /// including a missing field or an unknown value, routes to the secondary agent.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("primary") => Self::Primary,
            Some("secondary") => Self::Secondary,
            other => {
                tracing::debug!(
                    target: "portal::proxy",
                    endpoint = ?other,
                    "Unrecognized endpoint selector, routing to secondary"
                );
                Self::Secondary
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl std::fmt::Display for EndpointSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/ai-agent`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl ProxyRequest {
    pub fn new(question: impl Into<String>, selector: EndpointSelector) -> Self {
        Self {
            question: Some(question.into()),
            endpoint: Some(selector.as_str().to_string()),
        }
    }

    pub fn selector(&self) -> EndpointSelector {
        EndpointSelector::from_wire(self.endpoint.as_deref())
    }
}

/// Body forwarded to an upstream agent. A missing question is omitted, not sent as null.
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamQuestion<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<&'a str>,
}

/// Pull the `answer` text out of an agent response.
///
/// A non-empty string is an answer. Absent, null, false, zero or empty answers count as
/// "no answer". Other numbers and `true` come back as [`AgentError::ScalarAnswer`] so callers
/// that display them verbatim can; objects and arrays are malformed.
pub fn extract_answer(body: &serde_json::Value) -> AgentResult<String> {
    use serde_json::Value;

    match body.get("answer") {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        None | Some(Value::Null) | Some(Value::Bool(false)) | Some(Value::String(_)) => {
            Err(AgentError::MissingAnswer)
        }
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Err(AgentError::MissingAnswer),
        Some(scalar @ (Value::Number(_) | Value::Bool(true))) => {
            Err(AgentError::ScalarAnswer(scalar.to_string()))
        }
        Some(_) => Err(AgentError::NonTextAnswer),
    }
}

/// Accept a bare scalar answer as display text, as the widgets interpolate it.
pub(crate) fn scalar_as_text(result: AgentResult<String>) -> AgentResult<String> {
    match result {
        Err(AgentError::ScalarAnswer(text)) => Ok(text),
        other => other,
    }
}
