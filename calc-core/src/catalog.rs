//! Read-only project catalog.
//!
//! The calculator consumes the catalog through [`CatalogSource`]. The
//! provided implementation, [`Catalog`], is an immutable in-memory table
//! built once per process, either from the bundled defaults or from a
//! [`CatalogRepository`] backend.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::db::{CatalogRepository, RepositoryError};
use crate::models::{Addon, ProjectType, ProjectTypeInfo};

/// Lookup contract the calculator relies on.
///
/// Unknown project types degrade to an empty addon list and a zero base
/// price rather than failing.
pub trait CatalogSource: Send + Sync {
    /// Project types in display order.
    fn project_types(&self) -> Vec<ProjectType>;

    fn project_type_info(
        &self,
        project_type: ProjectType,
    ) -> Option<&ProjectTypeInfo>;

    fn addons(
        &self,
        project_type: ProjectType,
    ) -> &[Addon];

    fn base_price(
        &self,
        project_type: ProjectType,
    ) -> u64 {
        self.project_type_info(project_type)
            .map_or(0, |info| info.base_price)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    project_types: Vec<ProjectTypeInfo>,
    addons: HashMap<ProjectType, Vec<Addon>>,
}

impl Catalog {
    /// Builds a catalog from project type entries and their addons.
    ///
    /// Later duplicates of a project type or of an addon label within a
    /// type are dropped.
    pub fn new(
        project_types: Vec<ProjectTypeInfo>,
        addons: impl IntoIterator<Item = (ProjectType, Vec<Addon>)>,
    ) -> Self {
        let mut unique_types: Vec<ProjectTypeInfo> = Vec::with_capacity(project_types.len());
        for info in project_types {
            if unique_types
                .iter()
                .any(|known| known.project_type == info.project_type)
            {
                warn!(project_type = %info.project_type, "duplicate project type in catalog, ignoring");
                continue;
            }
            unique_types.push(info);
        }

        let mut by_type: HashMap<ProjectType, Vec<Addon>> = HashMap::new();
        for (project_type, list) in addons {
            let entry = by_type.entry(project_type).or_default();
            for addon in list {
                if entry.iter().any(|known| known.label == addon.label) {
                    warn!(%project_type, label = %addon.label, "duplicate addon label, ignoring");
                    continue;
                }
                entry.push(addon);
            }
        }

        Self {
            project_types: unique_types,
            addons: by_type,
        }
    }

    /// Reads every project type and its addons from `repo`.
    ///
    /// A project type whose addons cannot be found is kept with no addons.
    pub async fn load(repo: &dyn CatalogRepository) -> Result<Self, RepositoryError> {
        let project_types = repo.list_project_types().await?;
        let mut addons = Vec::with_capacity(project_types.len());

        for info in &project_types {
            match repo.list_addons(info.project_type).await {
                Ok(list) => addons.push((info.project_type, list)),
                Err(RepositoryError::NotFound) => {
                    warn!(project_type = %info.project_type, "no addons found for project type");
                }
                Err(other) => return Err(other),
            }
        }

        debug!(project_types = project_types.len(), "catalog loaded from repository");
        Ok(Self::new(project_types, addons))
    }

    /// The offering shipped with the application.
    pub fn builtin() -> Self {
        let project_types = vec![
            info(
                ProjectType::Website,
                "Strona wizytówkowa typu klasycznego",
                "Najbardziej popularny typ strony internetowej: wiele niezależnych podstron i wielopoziomowe menu.",
                14_990,
                &["Responsywny design", "Szybkie ładowanie", "SEO-friendly", "Formularz kontaktowy"],
            ),
            info(
                ProjectType::Ecommerce,
                "Strona dla urzędu lub instytucji",
                "Strona dopracowana pod formalną komunikację z odwiedzającymi.",
                19_900,
                &["Dostępność WCAG", "Panel administracyjny", "Archiwum dokumentów", "Integracje"],
            ),
            info(
                ProjectType::AiTools,
                "Narzędzia AI i Automatyzacja",
                "Rozwiązania wykorzystujące sztuczną inteligencję do automatyzacji procesów biznesowych.",
                24_990,
                &["Integracja AI", "Automatyzacja", "Analityka", "API"],
            ),
            info(
                ProjectType::ErpSystems,
                "Systemy ERP",
                "Systemy do zarządzania zasobami przedsiębiorstwa i procesami biznesowymi.",
                39_990,
                &["Moduły ERP", "Zarządzanie", "Raporty", "Integracje"],
            ),
        ];

        let addons = vec![
            (
                ProjectType::Website,
                vec![
                    Addon::new("SEO", "Podstawowa optymalizacja pod wyszukiwarki", 500),
                    Addon::new("Blog", "Moduł bloga z kategoriami i tagami", 1_500),
                    Addon::new("Wersja językowa", "Dodatkowa wersja językowa strony", 2_000),
                    Addon::new("Google Analytics", "Konfiguracja analityki i celów konwersji", 300),
                ],
            ),
            (
                ProjectType::Ecommerce,
                vec![
                    Addon::new("Deklaracja dostępności", "Audyt i deklaracja zgodna z WCAG 2.1", 2_500),
                    Addon::new("BIP", "Integracja z Biuletynem Informacji Publicznej", 3_500),
                    Addon::new("Newsletter", "System zapisów i wysyłki newslettera", 1_200),
                ],
            ),
            (
                ProjectType::AiTools,
                vec![
                    Addon::new("Chatbot", "Asystent AI osadzony na stronie", 6_000),
                    Addon::new("Analiza dokumentów", "Automatyczna ekstrakcja danych z dokumentów", 8_000),
                    Addon::new("Integracja API", "Połączenie z zewnętrznym systemem przez API", 4_000),
                ],
            ),
            (
                ProjectType::ErpSystems,
                vec![
                    Addon::new("Moduł magazynowy", "Stany magazynowe i dokumenty magazynowe", 12_000),
                    Addon::new("Moduł kadrowy", "Ewidencja pracowników i urlopów", 9_000),
                    Addon::new("Raporty BI", "Panel raportowy z eksportem do arkusza", 7_000),
                ],
            ),
        ];

        Self::new(project_types, addons)
    }
}

fn info(
    project_type: ProjectType,
    name: &str,
    description: &str,
    base_price: u64,
    features: &[&str],
) -> ProjectTypeInfo {
    ProjectTypeInfo {
        project_type,
        name: name.to_string(),
        description: description.to_string(),
        base_price,
        features: features.iter().map(|f| f.to_string()).collect(),
    }
}

impl CatalogSource for Catalog {
    fn project_types(&self) -> Vec<ProjectType> {
        self.project_types
            .iter()
            .map(|info| info.project_type)
            .collect()
    }

    fn project_type_info(
        &self,
        project_type: ProjectType,
    ) -> Option<&ProjectTypeInfo> {
        self.project_types
            .iter()
            .find(|info| info.project_type == project_type)
    }

    fn addons(
        &self,
        project_type: ProjectType,
    ) -> &[Addon] {
        self.addons
            .get(&project_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
