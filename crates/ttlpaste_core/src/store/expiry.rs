//! Deferred deletion of pastes once their lifetime has elapsed.

use super::PasteStore;
use crate::id::PasteId;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Weak;
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::Instant;

struct PendingExpiry {
    deadline: Instant,
    handle: AbortHandle,
}

/// Registry of armed expiry timers, one per live paste.
///
/// Lives inside the store's locked state so arming, firing and cancelling
/// are ordered with index mutations.
#[derive(Default)]
pub(crate) struct ExpiryScheduler {
    pending: HashMap<PasteId, PendingExpiry>,
}

impl ExpiryScheduler {
    /// Arm a one-shot deletion of `id` after `after`.
    ///
    /// An already pending timer for the same id is aborted and replaced.
    pub(crate) fn schedule_deletion(
        &mut self,
        store: Weak<PasteStore>,
        id: PasteId,
        serial: u64,
        after: Duration,
    ) {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if let Some(store) = store.upgrade() {
                store.expire(id, serial).await;
            }
        })
        .abort_handle();
        let pending = PendingExpiry {
            deadline: Instant::now() + after,
            handle,
        };
        if let Some(previous) = self.pending.insert(id, pending) {
            previous.handle.abort();
        }
    }

    /// Forget the timer for `id` without aborting it; used by the timer itself.
    pub(crate) fn disarm(&mut self, id: &PasteId) {
        self.pending.remove(id);
    }

    /// Abort and forget any pending timer for `id`.
    pub(crate) fn cancel(&mut self, id: &PasteId) {
        if let Some(pending) = self.pending.remove(id) {
            pending.handle.abort();
        }
    }

    /// Abort every pending timer.
    pub(crate) fn cancel_all(&mut self) {
        for (_, pending) in self.pending.drain() {
            pending.handle.abort();
        }
    }

    /// Time left before `id` is deleted, if a deletion is armed.
    pub(crate) fn time_left(&self, id: &PasteId) -> Option<Duration> {
        self.pending
            .get(id)
            .map(|pending| pending.deadline.saturating_duration_since(Instant::now()))
    }
}

/// Remove a paste file in the background, retrying every `retry` until the
/// file is gone.
pub(crate) fn spawn_removal(id: PasteId, path: PathBuf, retry: Duration) {
    tokio::spawn(remove_until_gone(id, path, retry));
}

/// Like [`spawn_removal`], but waits one `retry` interval before the first
/// attempt.
pub(crate) fn spawn_removal_retry(id: PasteId, path: PathBuf, retry: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(retry).await;
        remove_until_gone(id, path, retry).await;
    });
}

async fn remove_until_gone(id: PasteId, path: PathBuf, retry: Duration) {
    loop {
        match remove_paste_file(id, &path).await {
            Ok(()) => return,
            Err(err) => {
                tracing::warn!(
                    "Could not remove paste {} ({}), retrying in {:?}",
                    id,
                    err,
                    retry
                );
                tokio::time::sleep(retry).await;
            }
        }
    }
}

/// Unlink a paste file. A file that is already gone counts as removed.
pub(crate) async fn remove_paste_file(id: PasteId, path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::info!("Removed paste {}", id);
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!("Paste {} was already removed from disk", id);
            Ok(())
        }
        Err(err) => Err(err),
    }
}
