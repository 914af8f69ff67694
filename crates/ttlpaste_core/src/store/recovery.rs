//! Rebuilding the index from persisted pastes at startup.

use super::expiry::spawn_removal;
use super::layout::PersistedEntry;
use super::{PasteHeader, PasteStore};
use crate::error::AppError;
use crate::size::ByteSize;
use chrono::{DateTime, Utc};
use std::time::{Duration, SystemTime};

/// Outcome of a recovery pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Pastes re-indexed.
    pub recovered: usize,
    /// Pastes found past their death time and queued for removal.
    pub expired: usize,
    /// Bytes re-admitted into the quota.
    pub bytes: ByteSize,
}

/// Lifetime left for a paste last modified at `modified`.
///
/// Returns `None` once the paste is due. The result never exceeds
/// `lifetime`, so files stamped in the future get exactly one lifetime.
pub(crate) fn remaining_life(
    modified: SystemTime,
    lifetime: Duration,
    now: SystemTime,
) -> Option<Duration> {
    let Some(death) = modified.checked_add(lifetime) else {
        return Some(lifetime);
    };
    match death.duration_since(now) {
        Ok(left) if !left.is_zero() => Some(left.min(lifetime)),
        _ => None,
    }
}

impl PasteStore {
    /// Index persisted pastes, removing the ones already past their death.
    ///
    /// # Errors
    /// [`AppError::QuotaExceeded`] if the surviving pastes exceed the
    /// configured maximum.
    pub(super) async fn recover(
        &self,
        entries: Vec<PersistedEntry>,
        now: SystemTime,
    ) -> Result<RecoveryReport, AppError> {
        let mut report = RecoveryReport::default();
        let mut state = self.state.write().await;

        for entry in entries {
            let life_left = match self.lifetime {
                Some(lifetime) => match remaining_life(entry.modified, lifetime, now) {
                    Some(left) => Some(left),
                    None => {
                        tracing::debug!("Recovered paste {} is already past its death", entry.id);
                        report.expired += 1;
                        spawn_removal(entry.id, entry.path, self.removal_retry);
                        continue;
                    }
                },
                None => None,
            };

            if !state.quota.has_space_for(entry.size) {
                tracing::error!(
                    "Recovered pastes exceed the storage maximum of {}",
                    state.quota.max()
                );
                return Err(AppError::QuotaExceeded);
            }

            let header = PasteHeader::new(
                &entry.id,
                DateTime::<Utc>::from(entry.modified),
                entry.size,
                &entry.head,
            );
            tracing::debug!(
                "Recovered paste {} ({} {}) from {} has {:?} left",
                entry.id,
                header.content_type,
                ByteSize(entry.size),
                header.modified,
                life_left
            );
            report.recovered += 1;
            report.bytes = ByteSize(report.bytes.as_u64() + entry.size);
            let serial = state.insert(entry.id, header, entry.path);
            if let Some(left) = life_left {
                state
                    .expiry
                    .schedule_deletion(self.this.clone(), entry.id, serial, left);
            }
        }

        Ok(report)
    }
}
