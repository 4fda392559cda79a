use serde::{Deserialize, Serialize};

use super::ProjectType;

/// Optional, separately priced feature offered for a project type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Addon {
    /// Unique within its project type.
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub price: u64,
}

impl Addon {
    pub fn new(
        label: impl Into<String>,
        description: impl Into<String>,
        price: u64,
    ) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            price,
        }
    }
}

/// An addon the user picked, keyed by `<project_type>_<label>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedAddon {
    #[serde(flatten)]
    pub addon: Addon,
    pub id: String,
    pub project_type: ProjectType,
}

impl SelectedAddon {
    pub fn new(
        project_type: ProjectType,
        addon: Addon,
    ) -> Self {
        Self {
            id: selection_id(project_type, &addon.label),
            addon,
            project_type,
        }
    }

    pub fn price(&self) -> u64 {
        self.addon.price
    }
}

/// Set-membership key for an addon under a project type.
pub fn selection_id(
    project_type: ProjectType,
    label: &str,
) -> String {
    format!("{}_{}", project_type.as_str(), label)
}
