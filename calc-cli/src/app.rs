use anyhow::{Context, Result};
use calc_core::Catalog;
use calc_core::db::{DbConfig, RepositoryRegistry};
use calc_db_sqlite::SqliteCatalogRepositoryFactory;
use tracing::{debug, info};

/// Registry with every catalog backend compiled into this binary.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteCatalogRepositoryFactory));
    registry
}

/// Loads the catalog from `catalog_db`, or the bundled one when unset.
pub async fn load_catalog(catalog_db: Option<&str>) -> Result<Catalog> {
    let Some(connection_string) = catalog_db else {
        debug!("using built-in catalog");
        return Ok(Catalog::builtin());
    };

    let config = DbConfig {
        backend: "sqlite".to_string(),
        connection_string: connection_string.to_string(),
    };
    let repo = build_registry()
        .create(&config)
        .await
        .with_context(|| format!("cannot open catalog database '{connection_string}'"))?;

    let catalog = Catalog::load(repo.as_ref())
        .await
        .context("cannot read catalog")?;
    info!(database = connection_string, "catalog loaded");
    Ok(catalog)
}
