use std::sync::Arc;

use anyhow::{Context, Result};
use calc_relay::{LogMailer, RelayConfig, RelayState, router};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = RelayConfig::from_env().context("Invalid relay configuration")?;
    let bind_addr = config.bind_addr;
    let state = Arc::new(RelayState::new(config, Arc::new(LogMailer)));

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!("Lead relay listening on {}", bind_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Relay server error")?;

    Ok(())
}
