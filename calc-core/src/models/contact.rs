use serde::{Deserialize, Serialize};

/// Contact fields collected on the summary step.
///
/// Validity is never stored; see [`crate::calculator::validation`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactData {
    pub first_name: String,
    pub email: String,
    pub phone: String,
    pub gdpr_consent: bool,
}

/// Partial contact update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactUpdate {
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gdpr_consent: Option<bool>,
}

impl ContactData {
    pub fn apply(
        &mut self,
        update: ContactUpdate,
    ) {
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(consent) = update.gdpr_consent {
            self.gdpr_consent = consent;
        }
    }
}
