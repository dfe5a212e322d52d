//! Replays locally saved submissions against the server so the site owner
//! eventually sees them.

use std::collections::HashSet;

use folio_forms::SubmissionKind;
use tracing::{info, warn};

use crate::fallback::FallbackLog;
use crate::storage::{LocalStorage, StorageError};
use crate::transport::SubmissionTransport;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub replayed: usize,
    pub remaining: usize,
}

/// Submits every fallback entry in stored order. Only entries the server
/// confirms are removed. An unreachable server stops the pass for that kind;
/// a rejected entry is kept and the pass moves on.
pub async fn sync_pending<T, S>(
    transport: &T,
    log: &FallbackLog<S>,
) -> Result<SyncReport, StorageError>
where
    T: SubmissionTransport,
    S: LocalStorage,
{
    let mut report = SyncReport::default();

    for kind in [SubmissionKind::Contact, SubmissionKind::Testimonial] {
        let entries = log.entries(kind)?;
        let mut confirmed = HashSet::new();

        for entry in &entries {
            match transport.submit(&entry.to_draft(kind)).await {
                Ok(_) => {
                    confirmed.insert(entry.id);
                }
                Err(e) if e.is_unreachable() => {
                    warn!("Server unreachable while syncing {kind:?}: {e}");
                    break;
                }
                Err(e) => warn!("Server rejected local {kind:?} entry {}: {e}", entry.id),
            }
        }

        report.replayed += confirmed.len();
        report.remaining += log.remove(kind, &confirmed)?;
    }

    info!(
        "Sync finished: {} replayed, {} still local",
        report.replayed, report.remaining
    );
    Ok(report)
}
