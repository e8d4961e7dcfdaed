//! Services-catalog agent: one call, plain reply, no attribution label.

use super::traits::Responder;
use crate::client::ServicesClient;
use crate::shared::scalar_as_text;
use async_trait::async_trait;

pub const SERVICES_NO_ANSWER_TEXT: &str = "No se recibió respuesta del agente.";
pub const SERVICES_ERROR_TEXT: &str = "Error al comunicarse con el agente de servicios.";

pub struct ServicesResponder<C> {
    client: C,
}

impl<C: ServicesClient> ServicesResponder<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: ServicesClient> Responder for ServicesResponder<C> {
    async fn respond(&self, question: &str) -> String {
        match scalar_as_text(self.client.ask_services(question).await) {
            Ok(answer) => answer,
            Err(reason) if reason.is_empty_reply() => SERVICES_NO_ANSWER_TEXT.to_string(),
            Err(reason) => {
                tracing::warn!(target: "portal::orchestrator", %reason, "Services agent call failed");
                SERVICES_ERROR_TEXT.to_string()
            }
        }
    }
}
