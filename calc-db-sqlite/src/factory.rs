use std::path::PathBuf;

use async_trait::async_trait;

use calc_core::db::repository::{CatalogRepository, RepositoryError};
use calc_core::db::{DbConfig, RepositoryFactory};

use crate::repository::SqliteCatalogRepository;

/// Resolve the seeds directory at runtime so it works in both development and
/// packaged distribution.
///
/// Resolution order:
/// 1. **`CALC_DB_SQLITE_SEEDS_DIR`** if set.
/// 2. **`./seeds`** if the directory exists in the current working directory.
/// 3. **Crate manifest dir**: `$CARGO_MANIFEST_DIR/seeds` as last resort
///    (dev/tests when run from the build tree).
fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CALC_DB_SQLITE_SEEDS_DIR") {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// Maps a user-facing connection string to a sqlx SQLite URL.
///
/// * `":memory:"` (or empty) becomes an in-memory database.
/// * A value that already starts with `sqlite:` is used as is.
/// * Anything else is a file path, created if missing.
pub fn database_url(connection_string: &str) -> String {
    let trimmed = connection_string.trim();
    if trimmed.is_empty() || trimmed == ":memory:" {
        "sqlite::memory:".to_string()
    } else if trimmed.starts_with("sqlite:") {
        trimmed.to_string()
    } else {
        format!("sqlite:{trimmed}?mode=rwc")
    }
}

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`calc_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use calc_core::db::RepositoryRegistry;
/// use calc_db_sqlite::SqliteCatalogRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteCatalogRepositoryFactory));
/// ```
pub struct SqliteCatalogRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteCatalogRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string`
    /// (see [`database_url`]), migrate it and apply the seed files.
    ///
    /// For packaged distribution, set `CALC_DB_SQLITE_SEEDS_DIR` or run with
    /// a `seeds` directory in the current working directory.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn CatalogRepository>, RepositoryError> {
        let repo = SqliteCatalogRepository::new(&database_url(&config.connection_string))
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        repo.run_seeds(&seeds_dir())
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        Ok(Box::new(repo))
    }
}
