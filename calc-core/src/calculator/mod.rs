//! The calculator wizard: step machine, pricing, contact validation and
//! lead submission.

mod engine;
mod error;
pub mod pricing;
mod state;
pub mod steps;
pub mod validation;

pub use engine::ProjectCalculator;
pub use error::CalculatorError;
pub use state::{CalculatorState, MAX_NOTES_CHARS};
pub use steps::{Step, StepStatus};
pub use validation::{ContactFieldError, is_contact_valid, validate_contact};
