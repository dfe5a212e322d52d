use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored testimonial. `is_approved` gates public display and is only ever
/// set by the admin approval endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestimonialRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub date_created: DateTime<Utc>,
    pub is_approved: bool,
}
