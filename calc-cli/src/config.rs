//! TOML configuration for the `project-calculator` binary.
//!
//! ```toml
//! endpoint = "https://coderno.pl/api/send-lead"
//! timeout_secs = 15
//! state_path = "calculator-state.json"
//! catalog_db = "catalog.db"
//! log_file = "calculator.log"
//! log_level = "info"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8787/api/send-lead";
pub const DEFAULT_STATE_PATH: &str = "calculator-state.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Lead relay URL.
    pub endpoint: String,
    pub timeout_secs: u64,
    pub state_path: PathBuf,
    /// Catalog database; the built-in catalog is used when unset.
    pub catalog_db: Option<String>,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 15,
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            catalog_db: None,
            log_file: None,
            log_level: None,
        }
    }
}

impl CliConfig {
    pub fn from_toml(
        text: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
