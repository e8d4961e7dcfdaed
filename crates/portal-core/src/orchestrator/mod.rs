//! Responders that turn a user question into the text shown in a chat widget.
//!
//! - [`FallbackOrchestrator`]: primary agent first, secondary only when the primary
//!   answer carries the sentinel marker.
//! - [`ServicesResponder`]: single services-catalog agent, no fallback.

mod fallback;
mod services;
mod traits;

pub use fallback::{
    AgentTurn, FallbackOrchestrator, FallbackOutcome, AGENT_SYSTEM_ERROR_TEXT, PRIMARY_ERROR_TEXT,
    PRIMARY_LABEL, PRIMARY_NO_ANSWER_TEXT, SECONDARY_ERROR_TEXT, SECONDARY_LABEL,
    SECONDARY_NO_ANSWER_TEXT,
};
pub use services::{ServicesResponder, SERVICES_ERROR_TEXT, SERVICES_NO_ANSWER_TEXT};
pub use traits::Responder;
