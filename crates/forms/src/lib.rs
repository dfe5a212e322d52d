//! Shared submission contract for the portfolio site.
//!
//! Both the API server and the terminal client validate with the same
//! [`rules`] and speak the same [`payload`] types, so the two sides cannot
//! drift apart.

pub mod payload;
pub mod rules;

pub use payload::{
    ContactDraft, FieldViolation, SubmissionKind, SubmitResponse, TestimonialDraft,
};
pub use rules::{is_valid_email, Field, ValidationErrors};
