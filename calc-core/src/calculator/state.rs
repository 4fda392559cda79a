use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::pricing::total_cost;
use super::steps::Step;
use crate::catalog::CatalogSource;
use crate::models::{ContactData, ProjectType, SelectedAddon};

/// Longest accepted notes text, in characters.
pub const MAX_NOTES_CHARS: usize = 1000;

/// Everything the wizard has collected so far.
///
/// Only [`super::ProjectCalculator`] mutates it, which keeps `total_cost`
/// in step with the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculatorState {
    pub(crate) current_step: Step,
    pub(crate) selected_project_type: Option<ProjectType>,
    pub(crate) selected_addons: Vec<SelectedAddon>,
    pub(crate) notes: String,
    pub(crate) contact_data: ContactData,
    pub(crate) total_cost: u64,
}

impl CalculatorState {
    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn selected_project_type(&self) -> Option<ProjectType> {
        self.selected_project_type
    }

    pub fn selected_addons(&self) -> &[SelectedAddon] {
        &self.selected_addons
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn contact_data(&self) -> &ContactData {
        &self.contact_data
    }

    pub fn total_cost(&self) -> u64 {
        self.total_cost
    }

    pub(crate) fn recompute_total(
        &mut self,
        catalog: &dyn CatalogSource,
    ) {
        self.total_cost = total_cost(catalog, self.selected_project_type, &self.selected_addons);
    }

    pub(crate) fn to_snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            current_step: self.current_step.index(),
            selected_project_type: self.selected_project_type,
            selected_addons: self.selected_addons.clone(),
            notes: self.notes.clone(),
            contact_data: self.contact_data.clone(),
            total_cost: self.total_cost,
        }
    }

    /// Rebuilds state from a persisted snapshot.
    ///
    /// The stored total is ignored and recomputed, an out-of-range step is
    /// clamped, and addons that do not belong to the stored project type
    /// (or repeat an id) are dropped.
    pub(crate) fn from_snapshot(
        snapshot: StateSnapshot,
        catalog: &dyn CatalogSource,
    ) -> Self {
        let current_step = Step::from_index(snapshot.current_step).unwrap_or_else(|| {
            warn!(step = snapshot.current_step, "stored step out of range, clamping");
            Step::LAST
        });

        let mut selected_addons: Vec<SelectedAddon> = Vec::with_capacity(snapshot.selected_addons.len());
        if let Some(project_type) = snapshot.selected_project_type {
            for addon in snapshot.selected_addons {
                let expected = SelectedAddon::new(project_type, addon.addon);
                if addon.project_type != project_type || addon.id != expected.id {
                    warn!(id = %addon.id, "dropping stored addon from another project type");
                    continue;
                }
                if selected_addons.iter().any(|known| known.id == expected.id) {
                    continue;
                }
                selected_addons.push(expected);
            }
        }

        let mut notes = snapshot.notes;
        truncate_notes(&mut notes);

        let mut state = Self {
            current_step,
            selected_project_type: snapshot.selected_project_type,
            selected_addons,
            notes,
            contact_data: snapshot.contact_data,
            total_cost: 0,
        };
        state.recompute_total(catalog);
        state
    }
}

pub(crate) fn truncate_notes(notes: &mut String) {
    if let Some((byte_index, _)) = notes.char_indices().nth(MAX_NOTES_CHARS) {
        notes.truncate(byte_index);
    }
}

/// Persisted form of [`CalculatorState`].
///
/// Fields are read one by one: a missing or unreadable field takes its
/// default and an unreadable addon entry is dropped, so one bad value does
/// not discard the rest of the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct StateSnapshot {
    #[serde(deserialize_with = "or_default")]
    pub current_step: usize,
    #[serde(deserialize_with = "or_default")]
    pub selected_project_type: Option<ProjectType>,
    #[serde(deserialize_with = "readable_addons")]
    pub selected_addons: Vec<SelectedAddon>,
    #[serde(deserialize_with = "or_default")]
    pub notes: String,
    #[serde(deserialize_with = "or_default")]
    pub contact_data: ContactData,
    #[serde(deserialize_with = "or_default")]
    pub total_cost: u64,
}

fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|error| {
        warn!(%error, "ignoring unreadable snapshot field");
        T::default()
    }))
}

fn readable_addons<'de, D>(deserializer: D) -> Result<Vec<SelectedAddon>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        Value::Null => return Ok(Vec::new()),
        other => {
            warn!(value = %other, "stored addons are not a list, ignoring");
            return Ok(Vec::new());
        }
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(addon) => Some(addon),
            Err(error) => {
                warn!(%error, "dropping unreadable stored addon");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::catalog::Catalog;
    use crate::models::Addon;

    #[test]
    fn snapshot_uses_camel_case_keys() {
        let state = CalculatorState {
            current_step: Step::Addons,
            selected_project_type: Some(ProjectType::Website),
            total_cost: 14_990,
            ..Default::default()
        };

        let value = serde_json::to_value(state.to_snapshot()).unwrap();

        assert_eq!(value["currentStep"], json!(2));
        assert_eq!(value["selectedProjectType"], json!("website"));
        assert_eq!(value["totalCost"], json!(14_990));
        assert_eq!(value["contactData"]["gdprConsent"], json!(false));
    }

    #[test]
    fn partial_snapshot_merges_with_defaults() {
        let snapshot: StateSnapshot =
            serde_json::from_value(json!({"currentStep": 3, "notes": "hello"})).unwrap();

        let state = CalculatorState::from_snapshot(snapshot, &Catalog::builtin());

        assert_eq!(state.current_step(), Step::Notes);
        assert_eq!(state.notes(), "hello");
        assert_eq!(state.selected_project_type(), None);
        assert_eq!(state.total_cost(), 0);
    }

    #[test]
    fn stored_total_is_recomputed() {
        let snapshot = StateSnapshot {
            current_step: 2,
            selected_project_type: Some(ProjectType::Website),
            selected_addons: vec![SelectedAddon::new(
                ProjectType::Website,
                Addon::new("SEO", "", 500),
            )],
            total_cost: 1,
            ..Default::default()
        };

        let state = CalculatorState::from_snapshot(snapshot, &Catalog::builtin());

        assert_eq!(state.total_cost(), 15_490);
    }

    #[test]
    fn out_of_range_step_is_clamped() {
        let snapshot = StateSnapshot {
            current_step: 42,
            ..Default::default()
        };

        let state = CalculatorState::from_snapshot(snapshot, &Catalog::builtin());

        assert_eq!(state.current_step(), Step::Summary);
    }

    #[test]
    fn foreign_and_duplicate_addons_are_dropped() {
        let seo = SelectedAddon::new(ProjectType::Website, Addon::new("SEO", "", 500));
        let chatbot = SelectedAddon::new(ProjectType::AiTools, Addon::new("Chatbot", "", 6_000));
        let snapshot = StateSnapshot {
            selected_project_type: Some(ProjectType::Website),
            selected_addons: vec![seo.clone(), chatbot, seo.clone()],
            ..Default::default()
        };

        let state = CalculatorState::from_snapshot(snapshot, &Catalog::builtin());

        assert_eq!(state.selected_addons(), &[seo]);
    }

    #[test]
    fn unknown_project_type_keeps_other_fields() {
        let snapshot: StateSnapshot = serde_json::from_value(json!({
            "currentStep": 3,
            "selectedProjectType": "mobile_app",
            "notes": "keep me",
            "contactData": {"firstName": "Jan"}
        }))
        .unwrap();

        assert_eq!(snapshot.current_step, 3);
        assert_eq!(snapshot.selected_project_type, None);
        assert_eq!(snapshot.notes, "keep me");
        assert_eq!(snapshot.contact_data.first_name, "Jan");
    }

    #[test]
    fn unreadable_addon_entries_are_dropped() {
        let snapshot: StateSnapshot = serde_json::from_value(json!({
            "selectedProjectType": "website",
            "selectedAddons": [
                {"label": "Blog"},
                {"label": "SEO", "description": "", "price": 500, "id": "website_SEO", "projectType": "website"},
                42
            ],
            "notes": 7
        }))
        .unwrap();

        let labels: Vec<_> = snapshot
            .selected_addons
            .iter()
            .map(|a| a.addon.label.as_str())
            .collect();
        assert_eq!(labels, vec!["SEO"]);
        assert_eq!(snapshot.notes, "");
    }

    #[test]
    fn truncate_notes_counts_characters() {
        let mut notes = "ż".repeat(MAX_NOTES_CHARS + 5);

        truncate_notes(&mut notes);

        assert_eq!(notes.chars().count(), MAX_NOTES_CHARS);
    }
}
