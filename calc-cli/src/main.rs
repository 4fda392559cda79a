use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use calc_cli::{CliConfig, FileStore, HttpLeadSink, Outcome, Wizard, app, logging};
use calc_core::ProjectCalculator;
use clap::Parser;
use tracing::{debug, info};

/// Interactive project cost calculator.
///
/// Walks through project type, add-ons and notes, shows the estimate and
/// sends it together with contact details to the lead relay. Progress is
/// saved after every answer and resumed on the next start.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// TOML configuration file. Missing files are ignored.
    #[arg(long, default_value = "calculator.toml")]
    config: PathBuf,

    /// Where progress is saved between runs.
    #[arg(long)]
    state: Option<PathBuf>,

    /// Lead relay URL.
    #[arg(long)]
    endpoint: Option<String>,

    /// SQLite catalog database (file path or `:memory:`).
    /// The built-in catalog is used when neither this nor the config sets one.
    #[arg(long)]
    catalog_db: Option<String>,

    /// Request timeout for lead submission, in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Discard saved progress and start from the first step.
    #[arg(long)]
    reset: bool,

    /// Also append log records to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level or filter directive, e.g. `debug` or `calc_core=trace`.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Command-line values take precedence over the config file.
    fn merge_into(
        self,
        mut config: CliConfig,
    ) -> (CliConfig, bool) {
        if let Some(state) = self.state {
            config.state_path = state;
        }
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if self.catalog_db.is_some() {
            config.catalog_db = self.catalog_db;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if self.log_file.is_some() {
            config.log_file = self.log_file;
        }
        if self.log_level.is_some() {
            config.log_level = self.log_level;
        }
        (config, self.reset)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let file_config = CliConfig::load_or_default(&cli.config)?;
    let (config, reset) = cli.merge_into(file_config);

    logging::init_logging(config.log_level.as_deref(), config.log_file.as_deref())?;
    debug!(?config, "configuration loaded");

    let catalog = app::load_catalog(config.catalog_db.as_deref()).await?;
    let store = FileStore::new(&config.state_path);
    let sink = HttpLeadSink::new(&config.endpoint).with_timeout(config.timeout());

    let mut calculator = ProjectCalculator::new(Arc::new(catalog), Box::new(store), Arc::new(sink));
    if reset {
        calculator.reset();
    }

    let mut wizard = Wizard::new(calculator, io::stdin().lock(), io::stdout());
    match wizard.run().await? {
        Outcome::Submitted(lead) => info!(
            project_type = %lead.project_type,
            total = lead.total_cost,
            "estimate sent"
        ),
        Outcome::Quit => debug!(state = %config.state_path.display(), "session saved"),
    }

    Ok(())
}
