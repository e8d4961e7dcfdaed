//! Classified failures for agent calls and chat sessions.

use thiserror::Error;

/// Result type alias for agent and proxy operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// Why an agent call (or a proxied upstream call) did not produce an answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("invalid request body: {0}")]
    InvalidRequest(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned HTTP {0}")]
    UpstreamStatus(u16),

    #[error("upstream body is not valid JSON: {0}")]
    InvalidBody(String),

    #[error("response carries no answer")]
    MissingAnswer,

    /// A number or `true` where text was expected. Carries the value rendered as text.
    #[error("response answer is a bare scalar: {0}")]
    ScalarAnswer(String),

    #[error("response answer is not text")]
    NonTextAnswer,

    #[error("not configured: {0}")]
    NotConfigured(&'static str),
}

impl AgentError {
    /// True when the call reached an agent that replied without a usable answer,
    /// as opposed to the call itself failing.
    pub fn is_empty_reply(&self) -> bool {
        matches!(self, AgentError::MissingAnswer)
    }

    /// True when the agent replied with something other than a string in `answer`.
    pub fn is_malformed_answer(&self) -> bool {
        matches!(self, AgentError::ScalarAnswer(_) | AgentError::NonTextAnswer)
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AgentError::InvalidBody(err.to_string())
        } else if let Some(status) = err.status() {
            AgentError::UpstreamStatus(status.as_u16())
        } else {
            AgentError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::InvalidBody(err.to_string())
    }
}

/// Rejections from a [`crate::ChatSession`] before any agent is consulted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("a question is already in flight for this chat")]
    Busy,

    #[error("chat exchange was interrupted")]
    Interrupted,
}
