//! Client submission controller: collect → validate → submit → fall back.

use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

use chrono::Utc;
use folio_forms::{
    ContactDraft, Field, SubmissionKind, TestimonialDraft, ValidationErrors,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::fallback::{FallbackLog, LocalFallbackSubmission};
use crate::storage::LocalStorage;
use crate::transport::{SubmissionTransport, TransportError};

/// How long a success/error banner stays on screen.
pub const BANNER_TTL: Duration = Duration::from_secs(5);

const CONTACT_SAVED_LOCALLY: &str =
    "Thanks for your message! The server could not be reached, so it has been saved locally.";
const TESTIMONIAL_SAVED_LOCALLY: &str =
    "Thank you for your feedback! Your testimonial has been saved locally.";
const LOCAL_SAVE_FAILED: &str =
    "Sorry, there was an error sending your message. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Draft {
    Contact(ContactDraft),
    Testimonial(TestimonialDraft),
}

impl Draft {
    pub fn empty(kind: SubmissionKind) -> Self {
        match kind {
            SubmissionKind::Contact => Draft::Contact(ContactDraft::default()),
            SubmissionKind::Testimonial => Draft::Testimonial(TestimonialDraft::default()),
        }
    }

    pub fn kind(&self) -> SubmissionKind {
        match self {
            Draft::Contact(_) => SubmissionKind::Contact,
            Draft::Testimonial(_) => SubmissionKind::Testimonial,
        }
    }

    pub fn trimmed(&self) -> Self {
        match self {
            Draft::Contact(d) => Draft::Contact(d.trimmed()),
            Draft::Testimonial(d) => Draft::Testimonial(d.trimmed()),
        }
    }

    pub fn validate(&self) -> ValidationErrors {
        match self {
            Draft::Contact(d) => d.validate(),
            Draft::Testimonial(d) => d.validate(),
        }
    }

    fn field_mut(&mut self, field: Field) -> Option<&mut String> {
        match self {
            Draft::Contact(d) => d.field_mut(field),
            Draft::Testimonial(d) => d.field_mut(field),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
}

/// Display-only notice. Hiding it never touches submission data.
#[derive(Debug, Clone)]
pub struct Banner {
    pub tone: Tone,
    pub text: String,
    pub shown_at: Instant,
}

impl Banner {
    fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
            shown_at: Instant::now(),
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < BANNER_TTL
    }
}

fn idle_label(kind: SubmissionKind) -> &'static str {
    match kind {
        SubmissionKind::Contact => "Send Message",
        SubmissionKind::Testimonial => "Submit Testimonial",
    }
}

fn busy_label(kind: SubmissionKind) -> &'static str {
    match kind {
        SubmissionKind::Contact => "Sending...",
        SubmissionKind::Testimonial => "Submitting...",
    }
}

/// Everything one form instance shows: the draft, inline errors, the submit
/// control, and the banner.
#[derive(Debug, Clone)]
pub struct FormState {
    pub draft: Draft,
    pub errors: ValidationErrors,
    pub busy: bool,
    pub submit_label: &'static str,
    pub banner: Option<Banner>,
}

impl FormState {
    pub fn new(kind: SubmissionKind) -> Self {
        Self {
            draft: Draft::empty(kind),
            errors: ValidationErrors::new(),
            busy: false,
            submit_label: idle_label(kind),
            banner: None,
        }
    }

    pub fn kind(&self) -> SubmissionKind {
        self.draft.kind()
    }

    /// Sets a field and clears its error and any banner, as typing does.
    pub fn edit(&mut self, field: Field, value: impl Into<String>) {
        if let Some(slot) = self.draft.field_mut(field) {
            *slot = value.into();
            self.errors.clear(field);
            self.banner = None;
        }
    }

    pub fn visible_banner(&self, now: Instant) -> Option<&Banner> {
        self.banner.as_ref().filter(|b| b.is_visible_at(now))
    }

    fn reset(&mut self) {
        self.draft = Draft::empty(self.kind());
        self.errors = ValidationErrors::new();
    }
}

/// Holds the form busy for the duration of one submission and restores the
/// submit control when dropped, whichever way the attempt ends.
struct BusyGuard<'a>(&'a mut FormState);

impl<'a> BusyGuard<'a> {
    fn engage(form: &'a mut FormState) -> Self {
        form.busy = true;
        form.submit_label = busy_label(form.kind());
        Self(form)
    }
}

impl Deref for BusyGuard<'_> {
    type Target = FormState;

    fn deref(&self) -> &FormState {
        self.0
    }
}

impl DerefMut for BusyGuard<'_> {
    fn deref_mut(&mut self) -> &mut FormState {
        self.0
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.busy = false;
        self.0.submit_label = idle_label(self.0.kind());
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Local validation failed; `FormState::errors` names every bad field.
    Invalid,
    /// The server stored the submission.
    Submitted { refresh_list: bool },
    /// The server round trip failed and the draft was appended locally.
    SavedLocally {
        entry: LocalFallbackSubmission,
        refresh_list: bool,
    },
    /// Neither the server nor local storage took the draft; it is kept.
    Failed,
}

type BusyHook = Box<dyn Fn(&FormState) + Send + Sync>;

pub struct SubmissionController<T, S> {
    transport: T,
    fallback: FallbackLog<S>,
    on_busy: Option<BusyHook>,
}

impl<T: SubmissionTransport, S: LocalStorage> SubmissionController<T, S> {
    pub fn new(transport: T, fallback: FallbackLog<S>) -> Self {
        Self {
            transport,
            fallback,
            on_busy: None,
        }
    }

    /// Called once per submission while the form is busy, before the
    /// request goes out.
    pub fn on_busy(mut self, hook: impl Fn(&FormState) + Send + Sync + 'static) -> Self {
        self.on_busy = Some(Box::new(hook));
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn fallback(&self) -> &FallbackLog<S> {
        &self.fallback
    }

    pub async fn submit(&self, form: &mut FormState) -> SubmitOutcome {
        // Collect
        let draft = form.draft.trimmed();
        form.draft = draft.clone();

        // Validate locally; no network call on failure.
        let errors = draft.validate();
        if !errors.is_empty() {
            form.errors = errors;
            return SubmitOutcome::Invalid;
        }
        form.errors = ValidationErrors::new();

        let kind = draft.kind();
        let refresh_list = kind == SubmissionKind::Testimonial;
        let mut form = BusyGuard::engage(form);
        if let Some(hook) = &self.on_busy {
            hook(&*form);
        }

        match self.transport.submit(&draft).await {
            Ok(response) => {
                form.banner = Some(Banner::new(Tone::Success, response.message));
                form.reset();
                SubmitOutcome::Submitted { refresh_list }
            }
            Err(e) => {
                warn!("Submitting {kind:?} failed, falling back to local storage: {e}");
                if let TransportError::Rejected { errors, .. } = &e {
                    for violation in errors {
                        warn!("  server flagged {}: {}", violation.field, violation.message);
                    }
                }
                match self.fallback.append(&draft, Utc::now()) {
                    Ok(entry) => {
                        let text = match kind {
                            SubmissionKind::Contact => CONTACT_SAVED_LOCALLY,
                            SubmissionKind::Testimonial => TESTIMONIAL_SAVED_LOCALLY,
                        };
                        form.banner = Some(Banner::new(Tone::Success, text));
                        form.reset();
                        SubmitOutcome::SavedLocally {
                            entry,
                            refresh_list,
                        }
                    }
                    Err(storage_err) => {
                        error!("Saving {kind:?} locally failed: {storage_err}");
                        form.banner = Some(Banner::new(Tone::Error, LOCAL_SAVE_FAILED));
                        SubmitOutcome::Failed
                    }
                }
            }
        }
    }
}
