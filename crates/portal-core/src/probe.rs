//! Connectivity probe: send a throwaway question to both agents and report what came back.

use crate::error::AgentError;
use crate::proxy::ProxyGateway;
use crate::shared::EndpointSelector;
use serde::Serialize;
use std::time::Instant;

pub const PROBE_QUESTION: &str = "test";

#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub selector: EndpointSelector,
    pub url: String,
    pub elapsed_ms: u64,
    pub ok: bool,
    /// Upstream JSON when `ok`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeReport {
    fn new(
        selector: EndpointSelector,
        url: &str,
        started: Instant,
        outcome: Result<serde_json::Value, AgentError>,
    ) -> Self {
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(body) => Self {
                selector,
                url: url.to_string(),
                elapsed_ms,
                ok: true,
                body: Some(body),
                error: None,
            },
            Err(e) => Self {
                selector,
                url: url.to_string(),
                elapsed_ms,
                ok: false,
                body: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Probe primary then secondary, sequentially.
pub async fn probe_endpoints(gateway: &ProxyGateway) -> Vec<ProbeReport> {
    let mut reports = Vec::with_capacity(2);
    for selector in [EndpointSelector::Primary, EndpointSelector::Secondary] {
        let started = Instant::now();
        let outcome = gateway.forward_to(selector, Some(PROBE_QUESTION)).await;
        let report = ProbeReport::new(selector, gateway.resolve(selector), started, outcome);
        if report.ok {
            tracing::info!(
                target: "portal::probe",
                %selector,
                elapsed_ms = report.elapsed_ms,
                body = ?report.body,
                "Probe response"
            );
        } else {
            tracing::warn!(
                target: "portal::probe",
                %selector,
                error = report.error.as_deref().unwrap_or_default(),
                "Probe failed"
            );
        }
        reports.push(report);
    }
    reports
}
