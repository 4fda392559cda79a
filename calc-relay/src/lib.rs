//! HTTP relay that turns calculator leads into notification mails.

pub mod config;
pub mod handlers;
pub mod mailer;
pub mod rate_limit;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, RelayConfig};
pub use mailer::{LogMailer, Mailer, MailerError, OutgoingMail};
pub use rate_limit::RateLimiter;

/// Shared state behind every request.
pub struct RelayState {
    pub config: RelayConfig,
    pub limiter: RateLimiter,
    pub mailer: Arc<dyn Mailer>,
}

impl RelayState {
    pub fn new(
        config: RelayConfig,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let limiter = RateLimiter::new(config.max_requests, config.window);
        Self {
            config,
            limiter,
            mailer,
        }
    }
}

pub fn router(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/send-lead", post(handlers::send_lead))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
