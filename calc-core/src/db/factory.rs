use std::collections::HashMap;

use async_trait::async_trait;

use super::repository::{CatalogRepository, RepositoryError};

/// Where the catalog lives: a backend name plus a connection string the
/// backend interprets (`catalog.db`, `:memory:` for sqlite).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

/// Opens catalog repositories for one backend.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Connects, prepares the schema and returns the repository.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn CatalogRepository>, RepositoryError>;
}

/// Catalog backends compiled into the binary, by name.
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Adds `factory`; a later factory with the same name wins.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names, sorted.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens the catalog described by `config`. Fails with
    /// [`RepositoryError::Configuration`] when the backend is unknown.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn CatalogRepository>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{Addon, ProjectType, ProjectTypeInfo};

    struct EmptyCatalog;

    #[async_trait]
    impl CatalogRepository for EmptyCatalog {
        async fn list_project_types(&self) -> Result<Vec<ProjectTypeInfo>, RepositoryError> {
            Ok(Vec::new())
        }
        async fn get_project_type(
            &self,
            _project_type: ProjectType,
        ) -> Result<ProjectTypeInfo, RepositoryError> {
            Err(RepositoryError::NotFound)
        }
        async fn list_addons(
            &self,
            _project_type: ProjectType,
        ) -> Result<Vec<Addon>, RepositoryError> {
            Err(RepositoryError::NotFound)
        }
        async fn insert_addon(
            &self,
            _project_type: ProjectType,
            _addon: &Addon,
        ) -> Result<(), RepositoryError> {
            Ok(())
        }
        async fn delete_addons(
            &self,
            _project_type: ProjectType,
        ) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    /// Remembers which catalog it was asked to open.
    struct RecordingFactory {
        opened: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl RepositoryFactory for RecordingFactory {
        fn backend_name(&self) -> &'static str {
            "sqlite"
        }
        async fn create(
            &self,
            config: &DbConfig,
        ) -> Result<Box<dyn CatalogRepository>, RepositoryError> {
            self.opened.lock().unwrap().push(config.connection_string.clone());
            Ok(Box::new(EmptyCatalog))
        }
    }

    fn registry() -> (RepositoryRegistry, Arc<Mutex<Vec<String>>>) {
        let opened = Arc::new(Mutex::new(Vec::new()));
        let mut registry = RepositoryRegistry::new();
        registry.register(Box::new(RecordingFactory {
            opened: opened.clone(),
        }));
        (registry, opened)
    }

    fn catalog_config(backend: &str) -> DbConfig {
        DbConfig {
            backend: backend.to_string(),
            connection_string: "catalog.db".to_string(),
        }
    }

    #[tokio::test]
    async fn opens_catalog_through_named_backend() {
        let (registry, opened) = registry();

        let repo = registry.create(&catalog_config("sqlite")).await.unwrap();

        assert!(repo.list_project_types().await.unwrap().is_empty());
        assert_eq!(*opened.lock().unwrap(), vec!["catalog.db".to_string()]);
    }

    #[tokio::test]
    async fn unknown_backend_lists_available_ones() {
        let (registry, opened) = registry();

        let error = registry.create(&catalog_config("postgres")).await.err();

        assert_eq!(
            error,
            Some(RepositoryError::Configuration(
                "unknown backend 'postgres'; available: [\"sqlite\"]".to_string()
            ))
        );
        assert!(opened.lock().unwrap().is_empty());
    }
}
