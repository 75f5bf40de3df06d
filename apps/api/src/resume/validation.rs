use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::resume::{Profile, ResumeDocument};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("valid email regex"));
static PHONE_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+0-9()\s-]+$").expect("valid phone charset regex"));

const PHONE_MIN_DIGITS: usize = 10;
const PHONE_MAX_DIGITS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileField {
    Email,
    Phone,
}

impl ProfileField {
    fn label(self) -> &'static str {
        match self {
            ProfileField::Email => "Email",
            ProfileField::Phone => "Phone",
        }
    }
}

/// Editor tab a client should switch to. Only the profile tab carries
/// validated fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorTab {
    Profile,
}

/// Field name → human-readable message. Empty means the profile may be saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProfileErrors(BTreeMap<ProfileField, String>);

impl ProfileErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: ProfileField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = ProfileField> + '_ {
        self.0.keys().copied()
    }
}

/// Everything the editor needs to react to a blocked save.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub fields: ProfileErrors,
    pub toast: Option<String>,
    pub tab: Option<EditorTab>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Both fields are optional; a non-empty value must be well formed.
pub fn is_valid_email(email: &str) -> bool {
    let v = email.trim();
    v.is_empty() || EMAIL_RE.is_match(v)
}

pub fn is_valid_phone(phone: &str) -> bool {
    let v = phone.trim();
    if v.is_empty() {
        return true;
    }
    if !PHONE_CHARS_RE.is_match(v) {
        return false;
    }
    let digits = v.chars().filter(|c| c.is_ascii_digit()).count();
    (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits)
}

pub fn validate_profile(profile: &Profile) -> ProfileErrors {
    let mut errors = BTreeMap::new();
    if !is_valid_email(&profile.email) {
        errors.insert(
            ProfileField::Email,
            "Invalid email (example: name@example.com)".to_string(),
        );
    }
    if !is_valid_phone(&profile.phone) {
        errors.insert(
            ProfileField::Phone,
            "Invalid phone number (example: +7 (900) 123-45-67)".to_string(),
        );
    }
    ProfileErrors(errors)
}

/// One-line summary for a toast, or `None` when there is nothing to report.
pub fn format_validation_toast(errors: &ProfileErrors) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    let fields: Vec<_> = errors.fields().map(ProfileField::label).collect();
    Some(format!(
        "Please check: {}. Fix the errors and save again.",
        fields.join(", ")
    ))
}

/// First tab holding an invalid field.
pub fn first_invalid_tab(errors: &ProfileErrors) -> Option<EditorTab> {
    errors.fields().next().map(|field| match field {
        ProfileField::Email | ProfileField::Phone => EditorTab::Profile,
    })
}

/// Save gate used by every persistence path.
pub fn validate_document(doc: &ResumeDocument) -> ValidationReport {
    let fields = validate_profile(&doc.profile);
    ValidationReport {
        toast: format_validation_toast(&fields),
        tab: first_invalid_tab(&fields),
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(email: &str, phone: &str) -> Profile {
        Profile {
            email: email.to_string(),
            phone: phone.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_fields_are_valid() {
        assert!(validate_profile(&profile("", "")).is_empty());
        assert!(validate_profile(&profile("   ", "  ")).is_empty());
    }

    #[test]
    fn test_email_without_tld_is_rejected() {
        let errors = validate_profile(&profile("a@b", ""));
        assert!(errors.get(ProfileField::Email).is_some());
        assert!(errors.get(ProfileField::Phone).is_none());
    }

    #[test]
    fn test_plain_email_is_accepted() {
        assert!(validate_profile(&profile("a@b.com", "")).is_empty());
        assert!(is_valid_email("Name.Surname@Example.ORG"));
    }

    #[test]
    fn test_single_letter_tld_is_rejected() {
        assert!(!is_valid_email("a@b.c"));
    }

    #[test]
    fn test_short_phone_is_rejected() {
        assert!(validate_profile(&profile("", "123"))
            .get(ProfileField::Phone)
            .is_some());
    }

    #[test]
    fn test_formatted_russian_phone_is_accepted() {
        assert!(validate_profile(&profile("", "+7 (900) 123-45-67")).is_empty());
    }

    #[test]
    fn test_phone_digit_bounds() {
        assert!(is_valid_phone("1234567890"));
        assert!(is_valid_phone("123456789012345"));
        assert!(!is_valid_phone("1234567890123456"));
        assert!(!is_valid_phone("123456789"));
    }

    #[test]
    fn test_phone_with_letters_is_rejected() {
        assert!(!is_valid_phone("+7 900 123 45 67 ext"));
        assert!(!is_valid_phone("8.900.123.45.67"));
    }

    #[test]
    fn test_toast_lists_fields_in_order() {
        let errors = validate_profile(&profile("nope", "1"));
        assert_eq!(
            format_validation_toast(&errors).as_deref(),
            Some("Please check: Email, Phone. Fix the errors and save again.")
        );
        assert_eq!(first_invalid_tab(&errors), Some(EditorTab::Profile));
    }

    #[test]
    fn test_no_toast_without_errors() {
        let errors = validate_profile(&profile("a@b.com", ""));
        assert_eq!(format_validation_toast(&errors), None);
        assert_eq!(first_invalid_tab(&errors), None);
    }

    #[test]
    fn test_errors_serialize_as_field_map() {
        let errors = validate_profile(&profile("bad", ""));
        let v = serde_json::to_value(&errors).unwrap();
        assert!(v["email"].is_string());
        assert!(v.get("phone").is_none());
    }

    #[test]
    fn test_validate_document_report() {
        let mut doc = ResumeDocument::default();
        assert!(validate_document(&doc).is_valid());
        doc.profile.phone = "call me".into();
        let report = validate_document(&doc);
        assert!(!report.is_valid());
        assert_eq!(report.tab, Some(EditorTab::Profile));
        assert!(report.toast.unwrap().contains("Phone"));
    }
}
