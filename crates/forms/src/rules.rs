use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::payload::FieldViolation;

pub const NAME_MIN_LEN: usize = 2;
pub const SUBJECT_MIN_LEN: usize = 5;
pub const CONTACT_MESSAGE_MIN_LEN: usize = 10;
pub const TESTIMONIAL_MESSAGE_MIN_LEN: usize = 20;

/// `local@domain.tld`: no whitespace, exactly one `@`, a dot after it.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("valid regex"));

/// A user-editable form field. Ordering follows the on-screen form layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Subject => "subject",
            Field::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field name → human-readable error. Empty means the draft passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Drops the error for a single field, e.g. once the user edits it.
    pub fn clear(&mut self, field: Field) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// Wire form used in `400` responses.
    pub fn to_violations(&self) -> Vec<FieldViolation> {
        self.iter()
            .map(|(field, message)| FieldViolation {
                field,
                message: message.to_string(),
            })
            .collect()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Required + minimum length, with a label used in the message.
fn check_min_len(
    errors: &mut ValidationErrors,
    field: Field,
    label: &str,
    value: &str,
    min: usize,
) {
    if value.is_empty() {
        errors.insert(field, format!("{label} is required"));
    } else if char_len(value) < min {
        errors.insert(field, format!("{label} must be at least {min} characters"));
    }
}

pub(crate) fn check_name(errors: &mut ValidationErrors, name: &str) {
    check_min_len(errors, Field::Name, "Name", name, NAME_MIN_LEN);
}

pub(crate) fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.is_empty() {
        errors.insert(Field::Email, "Email is required");
    } else if !is_valid_email(email) {
        errors.insert(Field::Email, "Please enter a valid email address");
    }
}

pub(crate) fn check_subject(errors: &mut ValidationErrors, subject: &str) {
    check_min_len(errors, Field::Subject, "Subject", subject, SUBJECT_MIN_LEN);
}

pub(crate) fn check_contact_message(errors: &mut ValidationErrors, message: &str) {
    check_min_len(
        errors,
        Field::Message,
        "Message",
        message,
        CONTACT_MESSAGE_MIN_LEN,
    );
}

pub(crate) fn check_testimonial_message(errors: &mut ValidationErrors, message: &str) {
    check_min_len(
        errors,
        Field::Message,
        "Testimonial",
        message,
        TESTIMONIAL_MESSAGE_MIN_LEN,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_accepts_simple_address() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("jo@x.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
    }

    #[test]
    fn test_email_rejects_missing_at() {
        assert!(!is_valid_email("not-an-email"));
    }

    #[test]
    fn test_email_rejects_missing_dot_after_at() {
        assert!(!is_valid_email("a@b"));
    }

    #[test]
    fn test_email_rejects_whitespace_and_double_at() {
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("a@@c.de"));
        assert!(!is_valid_email("a@b@c.de"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_min_len_counts_chars_not_bytes() {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "Zö");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_empty_value_reports_required() {
        let mut errors = ValidationErrors::new();
        check_subject(&mut errors, "");
        assert_eq!(errors.get(Field::Subject), Some("Subject is required"));
    }

    #[test]
    fn test_short_value_reports_length() {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "J");
        assert_eq!(
            errors.get(Field::Name),
            Some("Name must be at least 2 characters")
        );
    }

    #[test]
    fn test_clear_removes_single_field() {
        let mut errors = ValidationErrors::new();
        errors.insert(Field::Name, "bad");
        errors.insert(Field::Email, "bad");
        assert!(errors.clear(Field::Name).is_some());
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![Field::Email]);
    }

    #[test]
    fn test_violations_follow_form_order() {
        let mut errors = ValidationErrors::new();
        errors.insert(Field::Message, "m");
        errors.insert(Field::Name, "n");
        let fields: Vec<_> = errors.to_violations().into_iter().map(|v| v.field).collect();
        assert_eq!(fields, vec![Field::Name, Field::Message]);
    }
}
