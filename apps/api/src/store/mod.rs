//! Store-access capability for submissions.
//!
//! Handlers never touch the pool directly; they go through
//! `Arc<dyn SubmissionStore>` carried in `AppState`, so tests can swap in
//! [`memory::MemoryStore`].

use async_trait::async_trait;
use folio_forms::{ContactDraft, TestimonialDraft};
use thiserror::Error;
use uuid::Uuid;

use crate::models::contact::{ContactMessageRow, MessageStatus};
use crate::models::testimonial::TestimonialRow;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgSubmissionStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Every method is a single-row (or single-statement) atomic unit; nothing
/// here spans a transaction.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Inserts a contact message in the `pending` state.
    async fn insert_contact(&self, draft: &ContactDraft) -> Result<ContactMessageRow, StoreError>;

    /// Inserts a testimonial. Implementations must write `is_approved = false`.
    async fn insert_testimonial(
        &self,
        draft: &TestimonialDraft,
    ) -> Result<TestimonialRow, StoreError>;

    /// Newest first.
    async fn list_contact_messages(&self) -> Result<Vec<ContactMessageRow>, StoreError>;

    /// Newest first; `approved_only` restricts to publicly visible rows.
    async fn list_testimonials(&self, approved_only: bool)
        -> Result<Vec<TestimonialRow>, StoreError>;

    /// Returns `false` when no message has this id.
    async fn set_message_status(&self, id: Uuid, status: MessageStatus)
        -> Result<bool, StoreError>;

    /// Returns `false` when no testimonial has this id.
    async fn set_testimonial_approval(&self, id: Uuid, approved: bool)
        -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
