use std::fmt;

use serde::{Deserialize, Serialize};

/// Project categories offered by the calculator.
///
/// The serialized form (`website`, `ecommerce`, ...) is the catalog key and
/// the value that travels in lead records and persisted snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Website,
    /// Site for an office or public institution. Keyed `ecommerce` for
    /// compatibility with stored catalogs and leads.
    #[serde(alias = "institutional_site")]
    Ecommerce,
    AiTools,
    ErpSystems,
}

impl ProjectType {
    pub const ALL: [ProjectType; 4] = [
        ProjectType::Website,
        ProjectType::Ecommerce,
        ProjectType::AiTools,
        ProjectType::ErpSystems,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Ecommerce => "ecommerce",
            Self::AiTools => "ai_tools",
            Self::ErpSystems => "erp_systems",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "website" => Some(Self::Website),
            "ecommerce" | "institutional_site" => Some(Self::Ecommerce),
            "ai_tools" => Some(Self::AiTools),
            "erp_systems" => Some(Self::ErpSystems),
            _ => None,
        }
    }

    /// Name used in outgoing lead notifications.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Website => "Strona wizytówkowa typu klasycznego",
            Self::Ecommerce => "Strona dla urzędu lub instytucji",
            Self::AiTools => "Narzędzia AI i Automatyzacja",
            Self::ErpSystems => "Systemy ERP",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog entry describing one project type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTypeInfo {
    pub project_type: ProjectType,
    pub name: String,
    pub description: String,
    pub base_price: u64,
    pub features: Vec<String>,
}
