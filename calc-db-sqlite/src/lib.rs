pub mod factory;
pub mod repository;

pub use factory::{SqliteCatalogRepositoryFactory, database_url};
pub use repository::SqliteCatalogRepository;
