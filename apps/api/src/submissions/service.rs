//! Validate → persist → acknowledge, with contact notification detached.
//!
//! The server never trusts client-side validation: every draft is trimmed and
//! checked against the shared rule-set before the store is touched.

use std::sync::Arc;
use std::time::Duration;

use folio_forms::{ContactDraft, SubmitResponse, TestimonialDraft};
use tracing::info;

use crate::errors::AppError;
use crate::notify::{spawn_notification, Notifier};
use crate::store::SubmissionStore;

pub const CONTACT_ACK: &str = "Message sent successfully! I'll get back to you soon.";
pub const TESTIMONIAL_ACK: &str =
    "Thank you for your feedback! Your testimonial has been submitted for approval.";

pub async fn submit_contact(
    store: &dyn SubmissionStore,
    notifier: Arc<dyn Notifier>,
    notify_timeout: Duration,
    draft: &ContactDraft,
) -> Result<SubmitResponse, AppError> {
    let draft = draft.trimmed();
    draft.validate().into_result().map_err(AppError::Validation)?;

    let row = store.insert_contact(&draft).await?;
    info!(contact_id = %row.id, "Contact message accepted");

    spawn_notification(notifier, row, notify_timeout);

    Ok(SubmitResponse::ok(CONTACT_ACK))
}

pub async fn submit_testimonial(
    store: &dyn SubmissionStore,
    draft: &TestimonialDraft,
) -> Result<SubmitResponse, AppError> {
    let draft = draft.trimmed();
    draft.validate().into_result().map_err(AppError::Validation)?;

    let row = store.insert_testimonial(&draft).await?;
    info!(testimonial_id = %row.id, "Testimonial accepted, awaiting approval");

    Ok(SubmitResponse::ok(TESTIMONIAL_ACK))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contact::MessageStatus;
    use crate::notify::testing::{FailingNotifier, RecordingNotifier, StalledNotifier};
    use crate::store::memory::MemoryStore;
    use folio_forms::Field;

    const TIMEOUT: Duration = Duration::from_secs(2);

    fn contact() -> ContactDraft {
        ContactDraft {
            name: "Jo".into(),
            email: "jo@x.com".into(),
            subject: "Hello there".into(),
            message: "This is a long enough message.".into(),
        }
    }

    fn testimonial() -> TestimonialDraft {
        TestimonialDraft {
            name: "Ann".into(),
            email: "ann@site.io".into(),
            message: "Working with Jo was a real pleasure.".into(),
        }
    }

    #[tokio::test]
    async fn test_contact_accepted_stored_and_notified() {
        let store = MemoryStore::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let response = submit_contact(&store, notifier.clone(), TIMEOUT, &contact())
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.message, CONTACT_ACK);
        let rows = store.contacts();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].subject, "Hello there");
        assert_eq!(rows[0].status, MessageStatus::Pending);
        notifier.wait_for_sent(1).await;
    }

    #[tokio::test]
    async fn test_contact_short_name_never_reaches_store() {
        let store = MemoryStore::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let mut draft = contact();
        draft.name = "J".into();

        let err = submit_contact(&store, notifier.clone(), TIMEOUT, &draft)
            .await
            .unwrap_err();

        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.fields().collect::<Vec<_>>(), vec![Field::Name]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(store.calls(), 0);
        assert_eq!(notifier.sent(), 0);
    }

    #[tokio::test]
    async fn test_contact_stores_trimmed_values() {
        let store = MemoryStore::new();
        let mut draft = contact();
        draft.name = "  Jo  ".into();
        submit_contact(&store, Arc::new(RecordingNotifier::default()), TIMEOUT, &draft)
            .await
            .unwrap();
        assert_eq!(store.contacts()[0].name, "Jo");
    }

    #[tokio::test]
    async fn test_contact_notification_failure_is_invisible() {
        let store = MemoryStore::new();
        let response = submit_contact(&store, Arc::new(FailingNotifier), TIMEOUT, &contact())
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(store.contacts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_contact_acknowledged_without_waiting_for_stalled_relay() {
        let store = MemoryStore::new();
        let started = tokio::time::Instant::now();
        let response = submit_contact(&store, Arc::new(StalledNotifier), TIMEOUT, &contact())
            .await
            .unwrap();
        assert!(response.success);
        assert!(started.elapsed() < TIMEOUT);
        assert_eq!(store.contacts().len(), 1);
    }

    #[tokio::test]
    async fn test_contact_store_failure_surfaces() {
        let store = MemoryStore::unavailable();
        let notifier = Arc::new(RecordingNotifier::default());
        let err = submit_contact(&store, notifier.clone(), TIMEOUT, &contact())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
        assert_eq!(notifier.sent(), 0);
    }

    #[tokio::test]
    async fn test_testimonial_persisted_unapproved() {
        let store = MemoryStore::new();
        let response = submit_testimonial(&store, &testimonial()).await.unwrap();
        assert_eq!(response.message, TESTIMONIAL_ACK);
        let rows = store.testimonials();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_approved);
    }

    #[tokio::test]
    async fn test_testimonial_short_message_rejected() {
        let store = MemoryStore::new();
        let mut draft = testimonial();
        draft.message = "Nice work.".into();
        let err = submit_testimonial(&store, &draft).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e.contains(Field::Message)));
        assert_eq!(store.calls(), 0);
    }
}
