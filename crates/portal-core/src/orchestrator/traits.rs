use async_trait::async_trait;

/// Produces the displayable reply for a question. Never fails: every failure is
/// already converted into user-facing text.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, question: &str) -> String;
}
