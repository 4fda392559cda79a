use thiserror::Error;

use super::validation::ContactFieldError;
use crate::sink::SinkError;

/// Refusals and failures reported by [`super::ProjectCalculator`].
///
/// Everything except [`CalculatorError::Sink`] is a validation refusal:
/// the operation had no effect and the caller may simply correct input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculatorError {
    #[error("a project type must be selected first")]
    MissingProjectType,

    #[error("contact data is invalid: {}", describe(.0))]
    InvalidContact(Vec<ContactFieldError>),

    #[error("already at the first step")]
    AtFirstStep,

    #[error("already at the last step")]
    AtLastStep,

    #[error("step index {0} is out of range")]
    InvalidStep(usize),

    #[error("lead delivery failed: {0}")]
    Sink(#[from] SinkError),
}

impl CalculatorError {
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Sink(_))
    }
}

fn describe(errors: &[ContactFieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
