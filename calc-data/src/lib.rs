pub mod loader;

pub use loader::{AddonLoader, AddonRecord, CatalogLoaderError};
