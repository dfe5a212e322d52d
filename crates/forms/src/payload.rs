use serde::{Deserialize, Serialize};

use crate::rules::{
    check_contact_message, check_email, check_name, check_subject, check_testimonial_message,
    Field, ValidationErrors,
};

/// The two kinds of user-authored submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    Contact,
    Testimonial,
}

impl SubmissionKind {
    /// Path under the API base URL that accepts this kind.
    pub fn endpoint(&self) -> &'static str {
        match self {
            SubmissionKind::Contact => "contact",
            SubmissionKind::Testimonial => "testimonials",
        }
    }

    /// Fixed key of the client-side fallback sequence for this kind.
    pub fn storage_key(&self) -> &'static str {
        match self {
            SubmissionKind::Contact => "contact_messages",
            SubmissionKind::Testimonial => "testimonials",
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        match self {
            SubmissionKind::Contact => &[Field::Name, Field::Email, Field::Subject, Field::Message],
            SubmissionKind::Testimonial => &[Field::Name, Field::Email, Field::Message],
        }
    }
}

/// Contact form input. Missing JSON fields decode as empty strings so they
/// surface as "required" violations rather than decode failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactDraft {
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }

    /// Checks every field and reports all failures at once.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, &self.name);
        check_email(&mut errors, &self.email);
        check_subject(&mut errors, &self.subject);
        check_contact_message(&mut errors, &self.message);
        errors
    }

    pub fn field_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Name => Some(&mut self.name),
            Field::Email => Some(&mut self.email),
            Field::Subject => Some(&mut self.subject),
            Field::Message => Some(&mut self.message),
        }
    }
}

/// Testimonial form input. There is deliberately no approval field: unknown
/// JSON keys such as `is_approved` are dropped on decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestimonialDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl TestimonialDraft {
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, &self.name);
        check_email(&mut errors, &self.email);
        check_testimonial_message(&mut errors, &self.message);
        errors
    }

    pub fn field_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Name => Some(&mut self.name),
            Field::Email => Some(&mut self.email),
            Field::Subject => None,
            Field::Message => Some(&mut self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: Field,
    pub message: String,
}

/// Body returned by both submission endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldViolation>,
}

impl SubmitResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            errors: vec![],
        }
    }
}
