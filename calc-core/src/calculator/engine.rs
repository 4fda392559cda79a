use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::error::CalculatorError;
use super::state::{CalculatorState, StateSnapshot, truncate_notes};
use super::steps::{self, Step, StepStatus};
use super::validation::{is_contact_valid, validate_contact};
use crate::catalog::CatalogSource;
use crate::models::{Addon, ContactUpdate, LeadRecord, ProjectType, SelectedAddon, selection_id};
use crate::persistence::{SnapshotStore, StateSnapshots};
use crate::sink::LeadSink;

const STATE_KEY: &str = "state";

/// The calculator wizard.
///
/// Owns the [`CalculatorState`] and is the only thing that mutates it.
/// Every mutation recomputes the total cost and writes a snapshot, so a
/// new engine over the same store resumes where the previous one stopped.
pub struct ProjectCalculator {
    catalog: Arc<dyn CatalogSource>,
    snapshots: StateSnapshots,
    sink: Arc<dyn LeadSink>,
    state: CalculatorState,
}

impl ProjectCalculator {
    /// Creates an engine, resuming from a stored snapshot when one exists.
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        store: Box<dyn SnapshotStore>,
        sink: Arc<dyn LeadSink>,
    ) -> Self {
        let snapshots = StateSnapshots::new(store);
        let state = match snapshots.load::<StateSnapshot>(STATE_KEY) {
            Some(snapshot) => {
                let state = CalculatorState::from_snapshot(snapshot, catalog.as_ref());
                debug!(step = %state.current_step(), "resumed calculator state");
                state
            }
            None => CalculatorState::default(),
        };

        Self {
            catalog,
            snapshots,
            sink,
            state,
        }
    }

    pub fn state(&self) -> &CalculatorState {
        &self.state
    }

    pub fn catalog(&self) -> &dyn CatalogSource {
        self.catalog.as_ref()
    }

    pub fn current_step(&self) -> Step {
        self.state.current_step
    }

    pub fn steps(&self) -> [StepStatus; 5] {
        steps::step_statuses(self.state.current_step)
    }

    pub fn progress(&self) -> u8 {
        steps::progress(self.state.current_step)
    }

    /// Moves to the next step if the current step's guard holds.
    pub fn advance(&mut self) -> Result<Step, CalculatorError> {
        let current = self.state.current_step;
        match current {
            Step::ProjectType if self.state.selected_project_type.is_none() => {
                return Err(CalculatorError::MissingProjectType);
            }
            Step::Summary => {
                validate_contact(&self.state.contact_data).map_err(CalculatorError::InvalidContact)?;
                return Err(CalculatorError::AtLastStep);
            }
            _ => {}
        }

        let next = current.next().ok_or(CalculatorError::AtLastStep)?;
        self.move_to(next);
        Ok(next)
    }

    pub fn retreat(&mut self) -> Result<Step, CalculatorError> {
        let previous = self
            .state
            .current_step
            .previous()
            .ok_or(CalculatorError::AtFirstStep)?;
        self.move_to(previous);
        Ok(previous)
    }

    /// Jumps straight to `step`, bypassing guards.
    pub fn jump_to(
        &mut self,
        step: Step,
    ) {
        self.move_to(step);
    }

    pub fn jump_to_index(
        &mut self,
        index: usize,
    ) -> Result<Step, CalculatorError> {
        let step = Step::from_index(index).ok_or(CalculatorError::InvalidStep(index))?;
        self.move_to(step);
        Ok(step)
    }

    fn move_to(
        &mut self,
        step: Step,
    ) {
        debug!(from = %self.state.current_step, to = %step, "step change");
        self.state.current_step = step;
        self.persist();
    }

    /// Selects a project type. Any previous addon selection is discarded,
    /// even when the same type is selected again.
    pub fn set_project_type(
        &mut self,
        project_type: ProjectType,
    ) {
        self.state.selected_project_type = Some(project_type);
        self.state.selected_addons.clear();
        self.state.recompute_total(self.catalog.as_ref());
        debug!(%project_type, total = self.state.total_cost, "project type selected");
        self.persist();
    }

    /// Adds the addon if it is not selected, removes it otherwise.
    /// Ignored while no project type is selected.
    pub fn toggle_addon(
        &mut self,
        addon: &Addon,
    ) {
        let Some(project_type) = self.state.selected_project_type else {
            debug!(label = %addon.label, "ignoring addon toggle without project type");
            return;
        };

        let id = selection_id(project_type, &addon.label);
        if let Some(position) = self.state.selected_addons.iter().position(|a| a.id == id) {
            self.state.selected_addons.remove(position);
        } else {
            self.state
                .selected_addons
                .push(SelectedAddon::new(project_type, addon.clone()));
        }
        self.state.recompute_total(self.catalog.as_ref());
        debug!(%id, total = self.state.total_cost, "addon toggled");
        self.persist();
    }

    pub fn is_addon_selected(
        &self,
        addon: &Addon,
    ) -> bool {
        let Some(project_type) = self.state.selected_project_type else {
            return false;
        };
        let id = selection_id(project_type, &addon.label);
        self.state.selected_addons.iter().any(|a| a.id == id)
    }

    /// Catalog addons for the selected project type.
    pub fn available_addons(&self) -> &[Addon] {
        match self.state.selected_project_type {
            Some(project_type) => self.catalog.addons(project_type),
            None => &[],
        }
    }

    /// Base price of the selected project type, 0 when none is selected.
    pub fn base_price(&self) -> u64 {
        self.state
            .selected_project_type
            .map_or(0, |project_type| self.catalog.base_price(project_type))
    }

    /// Replaces the notes, keeping at most 1000 characters.
    pub fn set_notes(
        &mut self,
        notes: impl Into<String>,
    ) {
        let mut notes = notes.into();
        truncate_notes(&mut notes);
        self.state.notes = notes;
        self.persist();
    }

    pub fn update_contact(
        &mut self,
        update: ContactUpdate,
    ) {
        self.state.contact_data.apply(update);
        self.persist();
    }

    pub fn is_contact_valid(&self) -> bool {
        is_contact_valid(&self.state.contact_data)
    }

    /// Sends the finished calculation to the lead sink.
    ///
    /// On success the state is reset and the stored snapshot dropped. On
    /// failure nothing changes, so the user can retry.
    pub async fn submit_lead(&mut self) -> Result<LeadRecord, CalculatorError> {
        let lead = self.build_lead(Utc::now())?;

        if let Err(error) = self.sink.send(&lead).await {
            warn!(%error, "lead submission failed");
            return Err(error.into());
        }

        info!(
            project_type = %lead.project_type,
            total = lead.total_cost,
            addons = lead.selected_addons.len(),
            "lead submitted"
        );
        self.reset();
        Ok(lead)
    }

    fn build_lead(
        &self,
        timestamp: DateTime<Utc>,
    ) -> Result<LeadRecord, CalculatorError> {
        let project_type = self
            .state
            .selected_project_type
            .ok_or(CalculatorError::MissingProjectType)?;
        validate_contact(&self.state.contact_data).map_err(CalculatorError::InvalidContact)?;

        Ok(LeadRecord {
            project_type,
            selected_addons: self.state.selected_addons.clone(),
            total_cost: self.state.total_cost,
            notes: self.state.notes.clone(),
            contact_data: self.state.contact_data.clone(),
            timestamp,
        })
    }

    /// Returns to the defaults and forgets the stored snapshot.
    pub fn reset(&mut self) {
        self.state = CalculatorState::default();
        self.snapshots.clear();
        debug!("calculator reset");
    }

    fn persist(&mut self) {
        self.snapshots.save(STATE_KEY, &self.state.to_snapshot());
    }
}
