use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Addon, ProjectType, ProjectTypeInfo};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage backend for the project catalog.
///
/// The calculator never talks to a repository directly; it is read once
/// into an immutable [`crate::catalog::Catalog`] at startup.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // Project types
    async fn list_project_types(&self) -> Result<Vec<ProjectTypeInfo>, RepositoryError>;
    async fn get_project_type(
        &self,
        project_type: ProjectType,
    ) -> Result<ProjectTypeInfo, RepositoryError>;

    // Addons
    async fn list_addons(
        &self,
        project_type: ProjectType,
    ) -> Result<Vec<Addon>, RepositoryError>;

    async fn insert_addon(
        &self,
        project_type: ProjectType,
        addon: &Addon,
    ) -> Result<(), RepositoryError>;

    async fn delete_addons(
        &self,
        project_type: ProjectType,
    ) -> Result<(), RepositoryError>;
}
