//! Upstream agent transport: one JSON POST per question, no retry.

use crate::error::AgentResult;
use crate::shared::UpstreamQuestion;
use std::time::Duration;

/// Thin reqwest wrapper shared by every proxied route.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
}

impl UpstreamClient {
    /// Build a client. `timeout` of `None` waits on the upstream indefinitely.
    pub fn new(timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().unwrap_or_else(|e| {
            tracing::warn!(target: "portal::proxy", "HTTP client build failed ({}), using defaults", e);
            reqwest::Client::new()
        });
        Self { client }
    }

    /// POST `{question}` to `url` and return the parsed JSON body.
    ///
    /// Non-2xx statuses fail with [`crate::AgentError::UpstreamStatus`]; the upstream body is dropped.
    pub async fn post_question(
        &self,
        url: &str,
        question: Option<&str>,
    ) -> AgentResult<serde_json::Value> {
        let res = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&UpstreamQuestion { question })
            .send()
            .await?;

        if let Err(e) = res.error_for_status_ref() {
            tracing::warn!(target: "portal::proxy", %url, status = res.status().as_u16(), "Upstream rejected question");
            return Err(e.into());
        }

        let bytes = res.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new(None)
    }
}
