//! Contact data validation.
//!
//! [`validate_contact`] is the single predicate behind the summary-step
//! guard, lead submission and the relay's request validation.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::ContactData;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

// Digits, spaces, hyphens and parentheses with an optional leading plus,
// at least nine characters after the plus.
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+]?[\d\s\-()]{9,}$").expect("valid phone pattern"));

/// Contact field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactFieldError {
    FirstNameMissing,
    EmailMissing,
    EmailMalformed,
    PhoneMissing,
    PhoneMalformed,
    ConsentMissing,
}

impl ContactFieldError {
    /// Name of the offending field in the wire format.
    pub fn field(&self) -> &'static str {
        match self {
            Self::FirstNameMissing => "firstName",
            Self::EmailMissing | Self::EmailMalformed => "email",
            Self::PhoneMissing | Self::PhoneMalformed => "phone",
            Self::ConsentMissing => "gdprConsent",
        }
    }
}

impl fmt::Display for ContactFieldError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let message = match self {
            Self::FirstNameMissing => "first name is required",
            Self::EmailMissing => "email is required",
            Self::EmailMalformed => "email format is invalid",
            Self::PhoneMissing => "phone number is required",
            Self::PhoneMalformed => "phone number format is invalid",
            Self::ConsentMissing => "consent to data processing is required",
        };
        f.write_str(message)
    }
}

impl std::error::Error for ContactFieldError {}

/// Checks every contact field and reports all failures in field order.
pub fn validate_contact(contact: &ContactData) -> Result<(), Vec<ContactFieldError>> {
    let mut errors = Vec::new();

    if contact.first_name.trim().is_empty() {
        errors.push(ContactFieldError::FirstNameMissing);
    }

    if contact.email.trim().is_empty() {
        errors.push(ContactFieldError::EmailMissing);
    } else if !EMAIL_PATTERN.is_match(&contact.email) {
        errors.push(ContactFieldError::EmailMalformed);
    }

    if contact.phone.trim().is_empty() {
        errors.push(ContactFieldError::PhoneMissing);
    } else if !PHONE_PATTERN.is_match(&contact.phone) {
        errors.push(ContactFieldError::PhoneMalformed);
    }

    if !contact.gdpr_consent {
        errors.push(ContactFieldError::ConsentMissing);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn is_contact_valid(contact: &ContactData) -> bool {
    validate_contact(contact).is_ok()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn valid() -> ContactData {
        ContactData {
            first_name: "Jan".to_string(),
            email: "jan@example.com".to_string(),
            phone: "+48 123-456-789".to_string(),
            gdpr_consent: true,
        }
    }

    #[test]
    fn accepts_complete_contact() {
        assert!(is_contact_valid(&valid()));
    }

    #[test]
    fn rejects_blank_first_name() {
        let contact = ContactData {
            first_name: "   ".to_string(),
            ..valid()
        };

        assert_eq!(
            validate_contact(&contact),
            Err(vec![ContactFieldError::FirstNameMissing])
        );
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in ["bad-email", "jan@example", "jan @example.com", "@example.com", "jan@.com"] {
            let contact = ContactData {
                email: email.to_string(),
                ..valid()
            };

            assert_eq!(
                validate_contact(&contact),
                Err(vec![ContactFieldError::EmailMalformed]),
                "email {email:?} should be rejected"
            );
        }
    }

    #[test]
    fn accepts_subdomain_email() {
        let contact = ContactData {
            email: "anna.nowak@mail.firma.com.pl".to_string(),
            ..valid()
        };

        assert!(is_contact_valid(&contact));
    }

    #[test]
    fn phone_accepts_lenient_formats() {
        for phone in ["123456789", "+48123456789", "(22) 123 45 67", "600-700-800"] {
            let contact = ContactData {
                phone: phone.to_string(),
                ..valid()
            };

            assert!(is_contact_valid(&contact), "phone {phone:?} should be accepted");
        }
    }

    #[test]
    fn phone_rejects_short_or_lettered_numbers() {
        for phone in ["12345678", "+4812345", "12345678a", "tel. 123456789"] {
            let contact = ContactData {
                phone: phone.to_string(),
                ..valid()
            };

            assert_eq!(
                validate_contact(&contact),
                Err(vec![ContactFieldError::PhoneMalformed]),
                "phone {phone:?} should be rejected"
            );
        }
    }

    #[test]
    fn consent_must_be_given() {
        let contact = ContactData {
            gdpr_consent: false,
            ..valid()
        };

        assert!(!is_contact_valid(&contact));
    }

    #[test]
    fn empty_contact_reports_every_field() {
        let errors = validate_contact(&ContactData::default()).unwrap_err();

        assert_eq!(
            errors,
            vec![
                ContactFieldError::FirstNameMissing,
                ContactFieldError::EmailMissing,
                ContactFieldError::PhoneMissing,
                ContactFieldError::ConsentMissing,
            ]
        );
        assert_eq!(
            errors.iter().map(|e| e.field()).collect::<Vec<_>>(),
            vec!["firstName", "email", "phone", "gdprConsent"]
        );
    }

    #[test]
    fn jan_with_bad_email_is_invalid() {
        let contact = ContactData {
            first_name: "Jan".to_string(),
            email: "bad-email".to_string(),
            phone: "123456789".to_string(),
            gdpr_consent: true,
        };

        assert!(!is_contact_valid(&contact));
    }
}
