//! Best-effort notification for new contact messages.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::models::contact::ContactMessageRow;

pub mod smtp;

pub use smtp::SmtpNotifier;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),

    #[error("Notification timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_contact(&self, message: &ContactMessageRow) -> Result<(), NotifyError>;
}

/// Used when SMTP is not configured.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify_contact(&self, message: &ContactMessageRow) -> Result<(), NotifyError> {
        debug!("Notifications disabled; skipping email for contact message {}", message.id);
        Ok(())
    }
}

/// Runs the notifier under `timeout` and swallows any failure. The row is
/// already persisted, so nothing here may reach the caller.
pub async fn notify_best_effort(
    notifier: &dyn Notifier,
    message: &ContactMessageRow,
    timeout: Duration,
) {
    let outcome = match tokio::time::timeout(timeout, notifier.notify_contact(message)).await {
        Ok(result) => result,
        Err(_) => Err(NotifyError::Timeout(timeout)),
    };

    if let Err(e) = outcome {
        warn!(
            "Email notification failed, but contact message {} was saved: {e}",
            message.id
        );
    }
}

/// Detaches the notification from the request that stored `message`, so a
/// slow relay never delays the acknowledgement.
pub fn spawn_notification(
    notifier: Arc<dyn Notifier>,
    message: ContactMessageRow,
    timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        notify_best_effort(notifier.as_ref(), &message, timeout).await;
    })
}
