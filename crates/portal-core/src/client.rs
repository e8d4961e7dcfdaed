//! Agent clients: the seam between the orchestrators and whatever reaches the agents.
//!
//! [`crate::ProxyGateway`] answers in process; [`GatewayClient`] goes over HTTP to a
//! running gateway, the same way the browser widgets do.

use crate::error::AgentResult;
use crate::shared::{extract_answer, EndpointSelector, ProxyRequest, UpstreamQuestion};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Asks one of the two fallback agents a question.
#[async_trait]
pub trait AgentClient: Send + Sync {
    async fn ask(&self, selector: EndpointSelector, question: &str) -> AgentResult<String>;
}

/// Asks the services-catalog agent a question.
#[async_trait]
pub trait ServicesClient: Send + Sync {
    async fn ask_services(&self, question: &str) -> AgentResult<String>;
}

pub const AI_AGENT_PATH: &str = "/api/ai-agent";
pub const SERVICES_AGENT_PATH: &str = "/api/services-agent";

/// HTTP client for a running portal gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: String,
    client: reqwest::Client,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            client: builder.build().unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_for_answer<B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> AgentResult<String> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?
            .error_for_status()?;

        let bytes = res.bytes().await?;
        let data: serde_json::Value = serde_json::from_slice(&bytes)?;
        extract_answer(&data)
    }
}

#[async_trait]
impl AgentClient for GatewayClient {
    async fn ask(&self, selector: EndpointSelector, question: &str) -> AgentResult<String> {
        self.post_for_answer(AI_AGENT_PATH, &ProxyRequest::new(question, selector))
            .await
    }
}

#[async_trait]
impl ServicesClient for GatewayClient {
    async fn ask_services(&self, question: &str) -> AgentResult<String> {
        self.post_for_answer(
            SERVICES_AGENT_PATH,
            &UpstreamQuestion {
                question: Some(question),
            },
        )
        .await
    }
}
