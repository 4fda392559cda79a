use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Relay settings, read from `CALC_RELAY_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// `CALC_RELAY_BIND`
    pub bind_addr: SocketAddr,
    /// `CALC_RELAY_TO`
    pub recipient: String,
    /// `CALC_RELAY_FROM`
    pub sender: String,
    /// `CALC_RELAY_SUBJECT`
    pub subject: String,
    /// `CALC_RELAY_MAX_REQUESTS`
    pub max_requests: u32,
    /// `CALC_RELAY_WINDOW_SECS`
    pub window: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            recipient: "kontakt@coderno.pl".to_string(),
            sender: "noreply@coderno.pl".to_string(),
            subject: "Nowe zapytanie z Kalkulatora Projektowego".to_string(),
            max_requests: 5,
            window: Duration::from_secs(3600),
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from `lookup`, falling back to defaults for unset
    /// or blank variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            bind_addr: parse_var(get("CALC_RELAY_BIND"), "CALC_RELAY_BIND", defaults.bind_addr)?,
            recipient: get("CALC_RELAY_TO").unwrap_or(defaults.recipient),
            sender: get("CALC_RELAY_FROM").unwrap_or(defaults.sender),
            subject: get("CALC_RELAY_SUBJECT").unwrap_or(defaults.subject),
            max_requests: parse_var(
                get("CALC_RELAY_MAX_REQUESTS"),
                "CALC_RELAY_MAX_REQUESTS",
                defaults.max_requests,
            )?,
            window: Duration::from_secs(parse_var(
                get("CALC_RELAY_WINDOW_SECS"),
                "CALC_RELAY_WINDOW_SECS",
                defaults.window.as_secs(),
            )?),
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
    }
}
