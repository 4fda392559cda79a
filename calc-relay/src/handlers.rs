use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use calc_core::calculator::{ContactFieldError, validate_contact};
use calc_core::notification::render_lead_message;
use calc_core::{Addon, ContactData, LeadRecord, ProjectType, SelectedAddon};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::RelayState;
use crate::mailer::{MailerError, OutgoingMail};

const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Why a lead was not accepted. The display text is the `error` field of
/// the response body.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Too many requests. Please try again later.")]
    RateLimited,

    #[error("Invalid JSON format")]
    InvalidJson,

    #[error("{0}")]
    Invalid(&'static str),

    #[error("Internal server error. Please try again later.")]
    Mail(#[source] MailerError),
}

impl RelayError {
    fn status(&self) -> StatusCode {
        match self {
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::InvalidJson | Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Mail(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = RelayResponse {
            success: false,
            message: None,
            error: Some(self.to_string()),
        };
        (self.status(), Json(body)).into_response()
    }
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "calc-relay"
    }))
}

pub async fn send_lead(
    State(state): State<Arc<RelayState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RelayResponse>, RelayError> {
    let client = client_key(&headers);
    if !state.limiter.check(&client) {
        warn!(%client, "rate limit exceeded");
        return Err(RelayError::RateLimited);
    }

    let payload: Value = serde_json::from_slice(&body).map_err(|_| RelayError::InvalidJson)?;
    let lead = parse_lead(&payload, Utc::now())?;

    let mail = OutgoingMail {
        to: state.config.recipient.clone(),
        from: state.config.sender.clone(),
        reply_to: lead.contact_data.email.clone(),
        subject: state.config.subject.clone(),
        body: render_lead_message(&lead),
    };

    if let Err(e) = state.mailer.send(&mail).await {
        error!(error = %e, "failed to deliver lead notification");
        return Err(RelayError::Mail(e));
    }

    info!(
        email = %lead.contact_data.email,
        project_type = %lead.project_type,
        total = lead.total_cost,
        "lead received"
    );

    Ok(Json(RelayResponse {
        success: true,
        message: Some("Lead submitted successfully".to_string()),
        error: None,
    }))
}

/// First `x-forwarded-for` entry, or `"unknown"`.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// Validates a submitted lead, reporting the first problem found.
pub(crate) fn parse_lead(
    payload: &Value,
    received_at: DateTime<Utc>,
) -> Result<LeadRecord, RelayError> {
    let project_type = payload
        .get("projectType")
        .and_then(Value::as_str)
        .filter(|code| !code.is_empty())
        .ok_or(RelayError::Invalid("Project type is required"))?;
    let project_type =
        ProjectType::parse(project_type).ok_or(RelayError::Invalid("Invalid project type"))?;

    let contact = payload
        .get("contactData")
        .and_then(Value::as_object)
        .ok_or(RelayError::Invalid("Contact data is required"))?;
    let contact_data = contact_from(contact);
    if let Err(errors) = validate_contact(&contact_data) {
        if let Some(first) = errors.first() {
            return Err(RelayError::Invalid(contact_message(*first)));
        }
    }

    let total_cost = payload
        .get("totalCost")
        .and_then(whole_zloty)
        .ok_or(RelayError::Invalid("Invalid total cost"))?;

    let addons = payload
        .get("selectedAddons")
        .and_then(Value::as_array)
        .ok_or(RelayError::Invalid("Selected addons must be an array"))?;

    let timestamp = payload
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
        .map_or(received_at, |parsed| parsed.with_timezone(&Utc));

    Ok(LeadRecord {
        project_type,
        selected_addons: addons
            .iter()
            .filter_map(addon_from)
            .map(|addon| SelectedAddon::new(project_type, addon))
            .collect(),
        total_cost,
        notes: payload
            .get("notes")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        contact_data,
        timestamp,
    })
}

/// Any non-negative finite number, rounded to whole złoty.
fn whole_zloty(value: &Value) -> Option<u64> {
    if let Some(exact) = value.as_u64() {
        return Some(exact);
    }
    value
        .as_f64()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
        .map(|amount| amount.round() as u64)
}

// Missing addon fields fall back to empty values; non-objects are skipped.
fn addon_from(entry: &Value) -> Option<Addon> {
    let Some(fields) = entry.as_object() else {
        warn!(%entry, "skipping addon entry that is not an object");
        return None;
    };
    let text = |key: &str| {
        fields
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Some(Addon::new(
        text("label"),
        text("description"),
        fields.get("price").and_then(whole_zloty).unwrap_or(0),
    ))
}

// Non-string values count as missing.
fn contact_from(contact: &Map<String, Value>) -> ContactData {
    let text = |key: &str| {
        contact
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    ContactData {
        first_name: text("firstName"),
        email: text("email"),
        phone: text("phone"),
        gdpr_consent: contact.get("gdprConsent") == Some(&Value::Bool(true)),
    }
}

fn contact_message(error: ContactFieldError) -> &'static str {
    match error {
        ContactFieldError::FirstNameMissing => "First name is required",
        ContactFieldError::EmailMissing | ContactFieldError::EmailMalformed => {
            "Valid email is required"
        }
        ContactFieldError::PhoneMissing | ContactFieldError::PhoneMalformed => {
            "Valid phone number is required"
        }
        ContactFieldError::ConsentMissing => "GDPR consent is required",
    }
}
