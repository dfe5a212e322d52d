//! Administrative reads and the only operations that move a submission
//! between states.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::contact::{ContactMessageRow, MessageStatus};
use crate::models::testimonial::TestimonialRow;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// GET /api/contact/messages
pub async fn handle_list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactMessageRow>>, AppError> {
    Ok(Json(state.store.list_contact_messages().await?))
}

/// PUT /api/contact/messages/:id/status
pub async fn handle_update_message_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdate>,
) -> Result<Json<Value>, AppError> {
    let status: MessageStatus = req.status.parse().map_err(AppError::BadRequest)?;

    if !state.store.set_message_status(id, status).await? {
        return Err(AppError::NotFound(format!("Contact message {id} not found")));
    }

    info!("Contact message {id} marked {status}");
    Ok(Json(json!({ "success": true })))
}

/// GET /api/testimonials
/// Public listing: approved testimonials only.
pub async fn handle_list_public_testimonials(
    State(state): State<AppState>,
) -> Result<Json<Vec<TestimonialRow>>, AppError> {
    Ok(Json(state.store.list_testimonials(true).await?))
}

/// GET /api/admin/testimonials
pub async fn handle_list_all_testimonials(
    State(state): State<AppState>,
) -> Result<Json<Vec<TestimonialRow>>, AppError> {
    Ok(Json(state.store.list_testimonials(false).await?))
}

/// PUT /api/admin/testimonials/:id/status
///
/// Takes a raw JSON body so that a non-boolean `is_approved` is a 400 with a
/// readable message rather than an extractor rejection.
pub async fn handle_update_testimonial_approval(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let approved = body
        .get("is_approved")
        .and_then(Value::as_bool)
        .ok_or_else(|| {
            AppError::BadRequest(
                "Invalid status. Use true for approved, false for pending.".to_string(),
            )
        })?;

    if !state.store.set_testimonial_approval(id, approved).await? {
        return Err(AppError::NotFound(format!("Testimonial {id} not found")));
    }

    info!("Testimonial {id} approval set to {approved}");
    Ok(Json(json!({ "success": true })))
}
