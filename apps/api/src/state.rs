use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::notify::Notifier;
use crate::store::SubmissionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SubmissionStore>,
    /// Contact notifications; `DisabledNotifier` when SMTP is not configured.
    pub notifier: Arc<dyn Notifier>,
    pub notify_timeout: Duration,
    pub started_at: Instant,
}
