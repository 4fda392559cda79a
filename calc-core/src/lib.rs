pub mod calculator;
pub mod catalog;
pub mod db;
pub mod models;
pub mod notification;
pub mod persistence;
pub mod sink;

pub use calculator::{CalculatorError, CalculatorState, ProjectCalculator, Step};
pub use catalog::{Catalog, CatalogSource};
pub use db::repository::{CatalogRepository, RepositoryError};
pub use models::*;
pub use persistence::{MemoryStore, SnapshotStore, StoreError};
pub use sink::{LeadSink, SinkError};
