use async_trait::async_trait;
use thiserror::Error;

use crate::models::LeadRecord;

/// Ways a lead delivery can fail. All of them leave the calculator state
/// intact so the user can retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("too many requests, please try again later")]
    RateLimited,

    #[error("lead rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),
}

/// Destination for completed leads (mail relay, HTTP endpoint, ...).
#[async_trait]
pub trait LeadSink: Send + Sync {
    async fn send(
        &self,
        lead: &LeadRecord,
    ) -> Result<(), SinkError>;
}
