use axum::{extract::rejection::JsonRejection, extract::State, Json};
use folio_forms::{
    ContactDraft, Field, SubmissionKind, SubmitResponse, TestimonialDraft, ValidationErrors,
};
use serde_json::Value;

use crate::errors::AppError;
use crate::state::AppState;
use crate::submissions::service::{submit_contact, submit_testimonial};

/// A form draft that can be filled field by field from a JSON body.
trait FormDraft: Default {
    const KIND: SubmissionKind;

    fn slot(&mut self, field: Field) -> Option<&mut String>;
}

impl FormDraft for ContactDraft {
    const KIND: SubmissionKind = SubmissionKind::Contact;

    fn slot(&mut self, field: Field) -> Option<&mut String> {
        self.field_mut(field)
    }
}

impl FormDraft for TestimonialDraft {
    const KIND: SubmissionKind = SubmissionKind::Testimonial;

    fn slot(&mut self, field: Field) -> Option<&mut String> {
        self.field_mut(field)
    }
}

/// Strings pass through, numbers and booleans are stringified, and null or
/// absent fields stay empty so the rule-set reports them as required. Arrays
/// and objects are flagged against the field they were sent for.
fn decode_form<D: FormDraft>(payload: Result<Json<Value>, JsonRejection>) -> Result<D, AppError> {
    let Json(body) = payload?;
    let Value::Object(map) = body else {
        return Err(AppError::BadRequest(
            "Request body must be a JSON object".to_string(),
        ));
    };

    let mut draft = D::default();
    let mut errors = ValidationErrors::new();

    for &field in D::KIND.fields() {
        let text = match map.get(field.as_str()) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Array(_) | Value::Object(_)) => {
                errors.insert(field, format!("{} must be text", label(field)));
                continue;
            }
        };
        if let Some(slot) = draft.slot(field) {
            *slot = text;
        }
    }

    errors.into_result().map_err(AppError::Validation)?;
    Ok(draft)
}

fn label(field: Field) -> &'static str {
    match field {
        Field::Name => "Name",
        Field::Email => "Email",
        Field::Subject => "Subject",
        Field::Message => "Message",
    }
}

/// POST /api/contact
pub async fn handle_submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let draft: ContactDraft = decode_form(payload)?;
    let response = submit_contact(
        state.store.as_ref(),
        state.notifier.clone(),
        state.notify_timeout,
        &draft,
    )
    .await?;
    Ok(Json(response))
}

/// POST /api/testimonials
pub async fn handle_submit_testimonial(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let draft: TestimonialDraft = decode_form(payload)?;
    let response = submit_testimonial(state.store.as_ref(), &draft).await?;
    Ok(Json(response))
}
