use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use folio_forms::{ContactDraft, TestimonialDraft};
use uuid::Uuid;

use crate::models::contact::{ContactMessageRow, MessageStatus};
use crate::models::testimonial::TestimonialRow;
use crate::store::{StoreError, SubmissionStore};

/// In-memory double. Counts every call so tests can assert "no store access".
#[derive(Default)]
pub struct MemoryStore {
    contacts: Mutex<Vec<ContactMessageRow>>,
    testimonials: Mutex<Vec<TestimonialRow>>,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails as unreachable.
    pub fn unavailable() -> Self {
        let store = Self::default();
        store.fail.store(true, Ordering::SeqCst);
        store
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn contacts(&self) -> Vec<ContactMessageRow> {
        self.contacts.lock().unwrap().clone()
    }

    pub fn testimonials(&self) -> Vec<TestimonialRow> {
        self.testimonials.lock().unwrap().clone()
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(())
    }

    /// Strictly increasing timestamps so "newest first" ordering is testable.
    fn next_timestamp(len: usize) -> chrono::DateTime<Utc> {
        Utc::now() + Duration::milliseconds(len as i64)
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn insert_contact(&self, draft: &ContactDraft) -> Result<ContactMessageRow, StoreError> {
        self.enter()?;
        let mut contacts = self.contacts.lock().unwrap();
        let row = ContactMessageRow {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            email: draft.email.clone(),
            subject: draft.subject.clone(),
            message: draft.message.clone(),
            date_created: Self::next_timestamp(contacts.len()),
            status: MessageStatus::Pending,
        };
        contacts.push(row.clone());
        Ok(row)
    }

    async fn insert_testimonial(
        &self,
        draft: &TestimonialDraft,
    ) -> Result<TestimonialRow, StoreError> {
        self.enter()?;
        let mut testimonials = self.testimonials.lock().unwrap();
        let row = TestimonialRow {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            email: draft.email.clone(),
            message: draft.message.clone(),
            date_created: Self::next_timestamp(testimonials.len()),
            is_approved: false,
        };
        testimonials.push(row.clone());
        Ok(row)
    }

    async fn list_contact_messages(&self) -> Result<Vec<ContactMessageRow>, StoreError> {
        self.enter()?;
        let mut rows = self.contacts();
        rows.sort_by(|a, b| b.date_created.cmp(&a.date_created));
        Ok(rows)
    }

    async fn list_testimonials(
        &self,
        approved_only: bool,
    ) -> Result<Vec<TestimonialRow>, StoreError> {
        self.enter()?;
        let mut rows: Vec<_> = self
            .testimonials()
            .into_iter()
            .filter(|t| t.is_approved || !approved_only)
            .collect();
        rows.sort_by(|a, b| b.date_created.cmp(&a.date_created));
        Ok(rows)
    }

    async fn set_message_status(
        &self,
        id: Uuid,
        status: MessageStatus,
    ) -> Result<bool, StoreError> {
        self.enter()?;
        let mut contacts = self.contacts.lock().unwrap();
        Ok(match contacts.iter_mut().find(|c| c.id == id) {
            Some(row) => {
                row.status = status;
                true
            }
            None => false,
        })
    }

    async fn set_testimonial_approval(
        &self,
        id: Uuid,
        approved: bool,
    ) -> Result<bool, StoreError> {
        self.enter()?;
        let mut testimonials = self.testimonials.lock().unwrap();
        Ok(match testimonials.iter_mut().find(|t| t.id == id) {
            Some(row) => {
                row.is_approved = approved;
                true
            }
            None => false,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.enter()
    }
}
