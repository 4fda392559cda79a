use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use calc_core::{Addon, CatalogRepository, ProjectType, ProjectTypeInfo, RepositoryError};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, warn};

const FEATURE_SEPARATOR: char = '|';

pub struct SqliteCatalogRepository {
    pool: SqlitePool,
}

impl SqliteCatalogRepository {
    /// Connects to `database_url` (a sqlx SQLite URL).
    ///
    /// Every connection to `sqlite::memory:` opens its own empty database,
    /// so in-memory URLs get a single connection that is never recycled.
    pub async fn new(database_url: &str) -> Result<Self> {
        let connected = if is_memory_url(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(database_url)
                .await
        } else {
            SqlitePool::connect(database_url).await
        };
        let pool =
            connected.with_context(|| format!("Failed to connect to database: {}", database_url))?;

        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            debug!(file = %path.display(), "applied seed file");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn project_type_exists(
        &self,
        project_type: ProjectType,
    ) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 FROM project_type WHERE code = ?")
            .bind(project_type.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.is_some())
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn get_price(
    row: &SqliteRow,
    column: &str,
) -> Result<u64, RepositoryError> {
    let raw: i64 = row.try_get(column).map_err(db_error)?;
    u64::try_from(raw)
        .map_err(|_| RepositoryError::Database(format!("Negative {column} {raw} in catalog")))
}

fn row_to_project_type(row: &SqliteRow) -> Result<Option<ProjectTypeInfo>, RepositoryError> {
    let code: String = row.try_get("code").map_err(db_error)?;
    let Some(project_type) = ProjectType::parse(&code) else {
        warn!(%code, "skipping unknown project type in catalog");
        return Ok(None);
    };
    let features: String = row.try_get("features").map_err(db_error)?;

    Ok(Some(ProjectTypeInfo {
        project_type,
        name: row.try_get("name").map_err(db_error)?,
        description: row.try_get("description").map_err(db_error)?,
        base_price: get_price(row, "base_price")?,
        features: features
            .split(FEATURE_SEPARATOR)
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(String::from)
            .collect(),
    }))
}

fn row_to_addon(row: &SqliteRow) -> Result<Addon, RepositoryError> {
    Ok(Addon {
        label: row.try_get("label").map_err(db_error)?,
        description: row.try_get("description").map_err(db_error)?,
        price: get_price(row, "price")?,
    })
}

#[async_trait]
impl CatalogRepository for SqliteCatalogRepository {
    async fn list_project_types(&self) -> Result<Vec<ProjectTypeInfo>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT code, name, description, base_price, features
             FROM project_type ORDER BY sort_order, code",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut project_types = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(info) = row_to_project_type(row)? {
                project_types.push(info);
            }
        }
        Ok(project_types)
    }

    async fn get_project_type(
        &self,
        project_type: ProjectType,
    ) -> Result<ProjectTypeInfo, RepositoryError> {
        let row = sqlx::query(
            "SELECT code, name, description, base_price, features
             FROM project_type WHERE code = ?",
        )
        .bind(project_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_project_type(&row)?.ok_or(RepositoryError::NotFound)
    }

    async fn list_addons(
        &self,
        project_type: ProjectType,
    ) -> Result<Vec<Addon>, RepositoryError> {
        if !self.project_type_exists(project_type).await? {
            return Err(RepositoryError::NotFound);
        }

        let rows = sqlx::query(
            "SELECT label, description, price
             FROM addon WHERE project_type = ?
             ORDER BY sort_order, id",
        )
        .bind(project_type.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_addon).collect()
    }

    async fn insert_addon(
        &self,
        project_type: ProjectType,
        addon: &Addon,
    ) -> Result<(), RepositoryError> {
        if !self.project_type_exists(project_type).await? {
            return Err(RepositoryError::NotFound);
        }

        let price = i64::try_from(addon.price)
            .map_err(|_| RepositoryError::Database(format!("Price {} is too large", addon.price)))?;

        sqlx::query(
            "INSERT INTO addon (project_type, label, description, price, sort_order)
             VALUES (?, ?, ?, ?,
                     (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM addon WHERE project_type = ?))",
        )
        .bind(project_type.as_str())
        .bind(&addon.label)
        .bind(&addon.description)
        .bind(price)
        .bind(project_type.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn delete_addons(
        &self,
        project_type: ProjectType,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM addon WHERE project_type = ?")
            .bind(project_type.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        debug!(%project_type, removed = result.rows_affected(), "deleted addons");
        Ok(())
    }
}
