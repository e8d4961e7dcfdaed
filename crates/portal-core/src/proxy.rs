//! Proxy Gateway: routes a question to one of the configured upstream agents and
//! relays the upstream JSON untouched.

use crate::client::{AgentClient, ServicesClient};
use crate::config::PortalConfig;
use crate::error::{AgentError, AgentResult};
use crate::shared::{extract_answer, EndpointSelector, ProxyRequest};
use crate::upstream::UpstreamClient;
use async_trait::async_trait;

/// Resolves selectors to upstream URLs and forwards questions. One upstream call per invocation.
#[derive(Debug, Clone)]
pub struct ProxyGateway {
    upstream: UpstreamClient,
    primary_url: String,
    secondary_url: String,
    services_url: Option<String>,
}

impl ProxyGateway {
    pub fn new(
        upstream: UpstreamClient,
        primary_url: impl Into<String>,
        secondary_url: impl Into<String>,
    ) -> Self {
        Self {
            upstream,
            primary_url: primary_url.into(),
            secondary_url: secondary_url.into(),
            services_url: None,
        }
    }

    pub fn from_config(config: &PortalConfig) -> Self {
        Self::new(
            UpstreamClient::new(config.upstream_timeout()),
            config.primary_url.trim(),
            config.secondary_url.trim(),
        )
        .with_services_url(config.services_url.as_deref().map(str::trim))
    }

    pub fn with_services_url(mut self, url: Option<&str>) -> Self {
        self.services_url = url.filter(|u| !u.is_empty()).map(str::to_string);
        self
    }

    /// Upstream URL for a selector.
    pub fn resolve(&self, selector: EndpointSelector) -> &str {
        match selector {
            EndpointSelector::Primary => &self.primary_url,
            EndpointSelector::Secondary => &self.secondary_url,
        }
    }

    pub fn services_url(&self) -> Option<&str> {
        self.services_url.as_deref()
    }

    /// Forward a `POST /api/ai-agent` body. Returns the upstream JSON on success.
    pub async fn forward(&self, request: &ProxyRequest) -> AgentResult<serde_json::Value> {
        let selector = request.selector();
        self.forward_to(selector, request.question.as_deref()).await
    }

    /// Forward a question to the upstream behind `selector`.
    pub async fn forward_to(
        &self,
        selector: EndpointSelector,
        question: Option<&str>,
    ) -> AgentResult<serde_json::Value> {
        let url = self.resolve(selector);
        tracing::debug!(target: "portal::proxy", %selector, %url, "Forwarding question");
        self.upstream.post_question(url, question).await
    }

    /// Forward a `POST /api/services-agent` question to the services upstream.
    pub async fn forward_services(&self, question: Option<&str>) -> AgentResult<serde_json::Value> {
        let url = self
            .services_url
            .as_deref()
            .ok_or(AgentError::NotConfigured("services_url"))?;
        tracing::debug!(target: "portal::proxy", %url, "Forwarding services question");
        self.upstream.post_question(url, question).await
    }
}

#[async_trait]
impl AgentClient for ProxyGateway {
    async fn ask(&self, selector: EndpointSelector, question: &str) -> AgentResult<String> {
        let data = self.forward_to(selector, Some(question)).await?;
        extract_answer(&data)
    }
}

#[async_trait]
impl ServicesClient for ProxyGateway {
    async fn ask_services(&self, question: &str) -> AgentResult<String> {
        let data = self.forward_services(Some(question)).await?;
        extract_answer(&data)
    }
}
