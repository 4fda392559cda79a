mod addon;
mod contact;
mod lead;
mod project_type;

pub use addon::{Addon, SelectedAddon, selection_id};
pub use contact::{ContactData, ContactUpdate};
pub use lead::LeadRecord;
pub use project_type::{ProjectType, ProjectTypeInfo};
