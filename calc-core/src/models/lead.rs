use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContactData, ProjectType, SelectedAddon};

/// Immutable snapshot of a finished calculation, handed to a lead sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub project_type: ProjectType,
    pub selected_addons: Vec<SelectedAddon>,
    pub total_cost: u64,
    pub notes: String,
    pub contact_data: ContactData,
    /// Serialized as RFC 3339 (ISO-8601) UTC.
    pub timestamp: DateTime<Utc>,
}
