//! Terminal front end for the project cost calculator.

pub mod app;
pub mod config;
pub mod logging;
pub mod sink;
pub mod store;
pub mod wizard;

pub use config::CliConfig;
pub use sink::HttpLeadSink;
pub use store::FileStore;
pub use wizard::{Outcome, Wizard};
