//! Wizard step sequence and the flags derived from the current position.

use std::fmt;

/// Ordered wizard steps. The discriminant is the step index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    #[default]
    Welcome = 0,
    ProjectType = 1,
    Addons = 2,
    Notes = 3,
    Summary = 4,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Welcome,
        Step::ProjectType,
        Step::Addons,
        Step::Notes,
        Step::Summary,
    ];

    pub const LAST: Step = Step::Summary;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Step> {
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Option<Step> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Step> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::Welcome => "Powitanie",
            Step::ProjectType => "Typ projektu",
            Step::Addons => "Dodatki",
            Step::Notes => "Uwagi",
            Step::Summary => "Podsumowanie",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display flags for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepStatus {
    pub step: Step,
    pub is_active: bool,
    pub is_completed: bool,
}

/// Exactly one step is active; a step is completed iff it lies before
/// `current`.
pub fn step_statuses(current: Step) -> [StepStatus; 5] {
    Step::ALL.map(|step| StepStatus {
        step,
        is_active: step == current,
        is_completed: step < current,
    })
}

/// Share of completed steps as a rounded percentage.
pub fn progress(current: Step) -> u8 {
    let completed = current.index() as f64;
    let total = Step::ALL.len() as f64;
    (completed / total * 100.0).round() as u8
}
