use async_trait::async_trait;
use folio_forms::{ContactDraft, TestimonialDraft};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::contact::{ContactMessageRow, MessageStatus};
use crate::models::testimonial::TestimonialRow;
use crate::store::{StoreError, SubmissionStore};

/// Postgres-backed store. `id` and `date_created` come from column defaults.
#[derive(Clone)]
pub struct PgSubmissionStore {
    pool: PgPool,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Pool exhaustion and I/O failures mean the store is unreachable; anything
/// else (constraint violations, decode errors) stays a database error.
fn classify(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(e.to_string())
        }
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn insert_contact(&self, draft: &ContactDraft) -> Result<ContactMessageRow, StoreError> {
        let row = sqlx::query_as::<_, ContactMessageRow>(
            r#"
            INSERT INTO contact_messages (name, email, subject, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, subject, message, date_created, status
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.subject)
        .bind(&draft.message)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;

        info!("Inserted contact message {}", row.id);
        Ok(row)
    }

    async fn insert_testimonial(
        &self,
        draft: &TestimonialDraft,
    ) -> Result<TestimonialRow, StoreError> {
        // Approval is never taken from the caller.
        let row = sqlx::query_as::<_, TestimonialRow>(
            r#"
            INSERT INTO testimonials (name, email, message, is_approved)
            VALUES ($1, $2, $3, FALSE)
            RETURNING id, name, email, message, date_created, is_approved
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.message)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;

        info!("Inserted testimonial {} (pending approval)", row.id);
        Ok(row)
    }

    async fn list_contact_messages(&self) -> Result<Vec<ContactMessageRow>, StoreError> {
        sqlx::query_as::<_, ContactMessageRow>(
            r#"
            SELECT id, name, email, subject, message, date_created, status
            FROM contact_messages
            ORDER BY date_created DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    async fn list_testimonials(
        &self,
        approved_only: bool,
    ) -> Result<Vec<TestimonialRow>, StoreError> {
        sqlx::query_as::<_, TestimonialRow>(
            r#"
            SELECT id, name, email, message, date_created, is_approved
            FROM testimonials
            WHERE is_approved OR NOT $1
            ORDER BY date_created DESC
            "#,
        )
        .bind(approved_only)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    async fn set_message_status(
        &self,
        id: Uuid,
        status: MessageStatus,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE contact_messages SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_testimonial_approval(
        &self,
        id: Uuid,
        approved: bool,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE testimonials SET is_approved = $1 WHERE id = $2")
            .bind(approved)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(classify)
    }
}
