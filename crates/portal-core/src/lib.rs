//! portal-core: agent proxy, dual-agent fallback and chat sessions for the Data Domain portal.
//!
//! The gateway binary (`portal-gateway`) wires these into HTTP routes; everything here is
//! usable in process as well.

mod chat;
mod client;
mod config;
mod error;
mod format;
mod probe;
mod proxy;
mod shared;
mod upstream;
pub mod orchestrator;

pub use chat::{ChatExchange, ChatMessage, ChatSession, ChatSessions, ChatWidget, Sender};
pub use client::{AgentClient, GatewayClient, ServicesClient, AI_AGENT_PATH, SERVICES_AGENT_PATH};
pub use config::{PortalConfig, DEFAULT_PRIMARY_URL, DEFAULT_SECONDARY_URL, DEFAULT_SENTINEL_MARKER};
pub use error::{AgentError, AgentResult, ChatError};
pub use format::render_ai_text;
pub use orchestrator::{
    AgentTurn, FallbackOrchestrator, FallbackOutcome, Responder, ServicesResponder,
};
pub use probe::{probe_endpoints, ProbeReport, PROBE_QUESTION};
pub use proxy::ProxyGateway;
pub use shared::{extract_answer, EndpointSelector, ProxyRequest, UpstreamQuestion};
pub use upstream::UpstreamClient;

/// Fixed payload returned by the proxy routes on any failure.
pub const PROXY_ERROR_MESSAGE: &str = "Error en el servidor proxy";
