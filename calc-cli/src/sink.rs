use std::time::Duration;

use async_trait::async_trait;
use calc_core::{LeadRecord, LeadSink, SinkError};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

/// Posts leads as JSON to the relay's `/api/send-lead` endpoint.
pub struct HttpLeadSink {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpLeadSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

fn map_status(
    status: StatusCode,
    body: &str,
) -> Result<(), SinkError> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(SinkError::RateLimited);
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        });
    Err(SinkError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl LeadSink for HttpLeadSink {
    async fn send(
        &self,
        lead: &LeadRecord,
    ) -> Result<(), SinkError> {
        debug!(endpoint = %self.endpoint, "posting lead");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(lead)
            .send()
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        map_status(status, &body)
    }
}
