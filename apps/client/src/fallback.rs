use std::collections::HashSet;

use chrono::{DateTime, Utc};
use folio_forms::{ContactDraft, SubmissionKind, TestimonialDraft};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::controller::Draft;
use crate::storage::{LocalStorage, StorageError};

/// A submission kept only on this machine because the server round trip
/// failed. Local records are shown as approved; the server never sees them
/// until a sync replays them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFallbackSubmission {
    /// Unix milliseconds at save time, bumped if needed to stay unique.
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
    pub date_created: DateTime<Utc>,
    pub is_approved: bool,
}

impl LocalFallbackSubmission {
    fn from_draft(id: i64, draft: &Draft, now: DateTime<Utc>) -> Self {
        let (name, email, subject, message) = match draft {
            Draft::Contact(d) => (&d.name, &d.email, Some(d.subject.clone()), &d.message),
            Draft::Testimonial(d) => (&d.name, &d.email, None, &d.message),
        };
        Self {
            id,
            name: name.clone(),
            email: email.clone(),
            subject,
            message: message.clone(),
            date_created: now,
            is_approved: true,
        }
    }

    /// Rebuilds the draft for replay against the server.
    pub fn to_draft(&self, kind: SubmissionKind) -> Draft {
        match kind {
            SubmissionKind::Contact => Draft::Contact(ContactDraft {
                name: self.name.clone(),
                email: self.email.clone(),
                subject: self.subject.clone().unwrap_or_default(),
                message: self.message.clone(),
            }),
            SubmissionKind::Testimonial => Draft::Testimonial(TestimonialDraft {
                name: self.name.clone(),
                email: self.email.clone(),
                message: self.message.clone(),
            }),
        }
    }
}

/// Ordered, per-kind sequences of fallback records under fixed storage keys.
pub struct FallbackLog<S> {
    storage: S,
}

impl<S: LocalStorage> FallbackLog<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn entries(
        &self,
        kind: SubmissionKind,
    ) -> Result<Vec<LocalFallbackSubmission>, StorageError> {
        match self.storage.get_item(kind.storage_key())? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Read-modify-append. Existing records are written back untouched; if the
    /// stored sequence cannot be read, nothing is written.
    pub fn append(
        &self,
        draft: &Draft,
        now: DateTime<Utc>,
    ) -> Result<LocalFallbackSubmission, StorageError> {
        let kind = draft.kind();
        let mut entries = self.entries(kind)?;

        let mut id = now.timestamp_millis();
        if let Some(last) = entries.last() {
            id = id.max(last.id.saturating_add(1));
        }

        let entry = LocalFallbackSubmission::from_draft(id, draft, now);
        entries.push(entry.clone());
        self.write(kind, &entries)?;

        info!("Saved {:?} submission {} locally", kind, entry.id);
        Ok(entry)
    }

    /// Drops the given ids, keeping every other record in its stored order.
    /// Re-reads first so records appended since the caller's read survive.
    pub fn remove(&self, kind: SubmissionKind, ids: &HashSet<i64>) -> Result<usize, StorageError> {
        if ids.is_empty() {
            return Ok(self.entries(kind)?.len());
        }
        let mut entries = self.entries(kind)?;
        entries.retain(|e| !ids.contains(&e.id));
        self.write(kind, &entries)?;
        Ok(entries.len())
    }

    fn write(
        &self,
        kind: SubmissionKind,
        entries: &[LocalFallbackSubmission],
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(entries)?;
        self.storage.set_item(kind.storage_key(), &raw)
    }
}
