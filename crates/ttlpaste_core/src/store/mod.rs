//! File-backed paste store.
//!
//! Pastes live one per file under a [`DataDir`]. An in-memory index maps
//! identifiers to their metadata and is the only authority on what can be
//! served. The index, the quota total and the expiry timers form one unit
//! behind a single reader/writer lock: `put`, `delete` and recovery take it
//! exclusively, `get` and reporting share it. Each entry additionally
//! carries a [`ReadTracker`] so deletion can wait for in-flight readers of
//! that entry after the index lock has been released.

mod content;
mod expiry;
/// On-disk layout and persisted entry listing.
pub mod layout;
mod recovery;
#[cfg(test)]
mod tests;

pub use content::PasteContent;
pub use layout::{DataDir, EntrySource, PersistedEntry};
pub use recovery::RecoveryReport;

use crate::config::Config;
use crate::constants::REMOVAL_RETRY_INTERVAL;
use crate::error::AppError;
use crate::id::PasteId;
use crate::quota::Quota;
use crate::size::ByteSize;
use crate::sniff::sniff_content_type;
use chrono::{DateTime, Utc};
use content::ReadTracker;
use expiry::ExpiryScheduler;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;

/// Settings the store is constructed from.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub max_storage: ByteSize,
    /// `None` disables expiry.
    pub lifetime: Option<Duration>,
    /// Delay between attempts to unlink a file that could not be removed.
    pub removal_retry: Duration,
}

impl StoreConfig {
    /// Store settings with the default removal retry interval.
    pub fn new(
        data_dir: impl Into<PathBuf>,
        max_storage: ByteSize,
        lifetime: Option<Duration>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            max_storage,
            lifetime,
            removal_retry: REMOVAL_RETRY_INTERVAL,
        }
    }
}

impl From<&Config> for StoreConfig {
    fn from(config: &Config) -> Self {
        Self::new(config.data_dir.clone(), config.max_storage, config.lifetime)
    }
}

/// Metadata served alongside a paste's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteHeader {
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub etag: String,
    pub content_type: String,
}

impl PasteHeader {
    fn new(id: &PasteId, modified: DateTime<Utc>, size: u64, head: &[u8]) -> Self {
        Self {
            size,
            modified,
            etag: format!("{}-{}", modified.timestamp(), id),
            content_type: sniff_content_type(head),
        }
    }
}

/// Point-in-time usage numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub pastes: usize,
    pub used_bytes: ByteSize,
    pub max_bytes: ByteSize,
}

struct Entry {
    header: PasteHeader,
    path: PathBuf,
    readers: ReadTracker,
    serial: u64,
}

struct StoreState {
    index: HashMap<PasteId, Entry>,
    quota: Quota,
    expiry: ExpiryScheduler,
    next_serial: u64,
}

impl StoreState {
    fn insert(&mut self, id: PasteId, header: PasteHeader, path: PathBuf) -> u64 {
        let serial = self.next_serial;
        self.next_serial += 1;
        self.quota.reserve(header.size);
        self.index.insert(
            id,
            Entry {
                header,
                path,
                readers: ReadTracker::default(),
                serial,
            },
        );
        serial
    }

    fn remove(&mut self, id: &PasteId) -> Option<Entry> {
        let entry = self.index.remove(id)?;
        self.quota.release(entry.header.size);
        Some(entry)
    }
}

/// Paste store owning the data directory, the index and the expiry timers.
pub struct PasteStore {
    layout: DataDir,
    lifetime: Option<Duration>,
    removal_retry: Duration,
    state: RwLock<StoreState>,
    this: Weak<PasteStore>,
}

impl PasteStore {
    /// Open the store, rebuilding its index from the data directory.
    ///
    /// Recovery finishes before this returns, so the store is never visible
    /// half-populated.
    ///
    /// # Errors
    /// Fails if the data directory cannot be prepared or walked, contains a
    /// file that is not a managed paste, or holds more bytes than
    /// `max_storage` allows.
    pub async fn open(config: StoreConfig) -> Result<Arc<Self>, AppError> {
        let data_dir = config.data_dir.clone();
        let layout = tokio::task::spawn_blocking(move || DataDir::prepare(data_dir))
            .await
            .map_err(|err| AppError::StorageMessage(format!("spawn_blocking failed: {err}")))??;

        let store = Arc::new_cyclic(|this| Self {
            layout,
            lifetime: config.lifetime,
            removal_retry: config.removal_retry,
            state: RwLock::new(StoreState {
                index: HashMap::new(),
                quota: Quota::new(config.max_storage),
                expiry: ExpiryScheduler::default(),
                next_serial: 0,
            }),
            this: this.clone(),
        });

        let source = store.layout.clone();
        let entries = tokio::task::spawn_blocking(move || source.list_entries())
            .await
            .map_err(|err| AppError::StorageMessage(format!("spawn_blocking failed: {err}")))??;
        let report = store.recover(entries, std::time::SystemTime::now()).await?;
        tracing::info!(
            "Recovered {} pastes ({}) from {}, {} already expired",
            report.recovered,
            report.bytes,
            store.layout.root().display(),
            report.expired
        );
        Ok(store)
    }

    /// Store a new paste.
    ///
    /// # Returns
    /// The identifier the paste can be fetched with.
    ///
    /// # Errors
    /// - [`AppError::QuotaExceeded`] if the content does not fit.
    /// - [`AppError::IdentifierSpaceExhausted`] if no unused id was found.
    /// - [`AppError::Io`] if the file cannot be written; nothing is indexed.
    pub async fn put(&self, content: &[u8]) -> Result<PasteId, AppError> {
        let size = content.len() as u64;
        let mut state = self.state.write().await;
        if !state.quota.has_space_for(size) {
            return Err(AppError::QuotaExceeded);
        }
        let id = PasteId::generate(|candidate| state.index.contains_key(candidate))?;
        let path = self.layout.paste_path(&id);
        let modified = match layout::write_new_file(&path, content).await {
            Ok(modified) => modified,
            Err(err) => {
                tracing::error!("Could not create paste file {}: {}", path.display(), err);
                return Err(err.into());
            }
        };

        let header = PasteHeader::new(&id, DateTime::<Utc>::from(modified), size, content);
        tracing::info!(
            "Created paste {} ({} {})",
            id,
            header.content_type,
            ByteSize(size)
        );
        let serial = state.insert(id, header, path);
        if let Some(lifetime) = self.lifetime {
            state
                .expiry
                .schedule_deletion(self.this.clone(), id, serial, lifetime);
        }
        tracing::debug!("{}", state.quota.report(state.index.len()));
        Ok(id)
    }

    /// Open a paste for reading.
    ///
    /// The returned content keeps the backing file alive until dropped,
    /// even if the paste is deleted meanwhile.
    ///
    /// # Errors
    /// [`AppError::NotFound`] if the id is not indexed, [`AppError::Io`] if
    /// the file cannot be opened.
    pub async fn get(&self, id: &PasteId) -> Result<(PasteContent, PasteHeader), AppError> {
        let state = self.state.read().await;
        let entry = state.index.get(id).ok_or(AppError::NotFound)?;
        let file = tokio::fs::File::open(&entry.path).await.map_err(|err| {
            tracing::error!("Could not open paste {}: {}", id, err);
            AppError::Io(err)
        })?;
        let reading = entry.readers.enter().await;
        Ok((PasteContent::new(file, reading), entry.header.clone()))
    }

    /// Parse an external identifier and open the paste it names.
    ///
    /// # Errors
    /// [`AppError::MalformedIdentifier`] for unparseable text, otherwise as
    /// [`PasteStore::get`].
    pub async fn get_by_text(
        &self,
        text: &str,
    ) -> Result<(PasteId, PasteContent, PasteHeader), AppError> {
        let id: PasteId = text.parse()?;
        let (content, header) = self.get(&id).await?;
        Ok((id, content, header))
    }

    /// Delete a paste.
    ///
    /// The paste disappears from the index and its bytes are released from
    /// the quota immediately. The file is unlinked once every open reader
    /// has been dropped; unlink failures are logged and retried in the
    /// background instead of being reported.
    ///
    /// # Errors
    /// [`AppError::NotFound`] if the id is not indexed.
    pub async fn delete(&self, id: &PasteId) -> Result<(), AppError> {
        let entry = {
            let mut state = self.state.write().await;
            let entry = state.remove(id).ok_or(AppError::NotFound)?;
            state.expiry.cancel(id);
            entry
        };
        self.unlink(*id, entry).await;
        Ok(())
    }

    /// Expiry timer callback; only removes the generation it was armed for.
    async fn expire(&self, id: PasteId, serial: u64) {
        let entry = {
            let mut state = self.state.write().await;
            if state.index.get(&id).map(|entry| entry.serial) != Some(serial) {
                tracing::debug!("Expired paste {} was already removed", id);
                return;
            }
            state.expiry.disarm(&id);
            state.remove(&id)
        };
        if let Some(entry) = entry {
            tracing::info!("Paste {} reached the end of its life", id);
            self.unlink(id, entry).await;
        }
    }

    async fn unlink(&self, id: PasteId, entry: Entry) {
        entry.readers.drain().await;
        if let Err(err) = expiry::remove_paste_file(id, &entry.path).await {
            tracing::warn!(
                "Could not end the life of paste {}: {}; retrying in {:?}",
                id,
                err,
                self.removal_retry
            );
            expiry::spawn_removal_retry(id, entry.path, self.removal_retry);
        }
    }

    /// Human-readable usage summary.
    pub async fn report(&self) -> String {
        let state = self.state.read().await;
        state.quota.report(state.index.len())
    }

    /// Usage numbers for diagnostics.
    pub async fn stats(&self) -> StoreStats {
        let state = self.state.read().await;
        StoreStats {
            pastes: state.index.len(),
            used_bytes: state.quota.used(),
            max_bytes: state.quota.max(),
        }
    }

    /// Number of indexed pastes.
    pub async fn len(&self) -> usize {
        self.state.read().await.index.len()
    }

    /// Whether no paste is indexed.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Whether `id` is currently servable.
    pub async fn contains(&self, id: &PasteId) -> bool {
        self.state.read().await.index.contains_key(id)
    }

    /// Metadata of an indexed paste without opening it.
    pub async fn header(&self, id: &PasteId) -> Option<PasteHeader> {
        let state = self.state.read().await;
        state.index.get(id).map(|entry| entry.header.clone())
    }

    /// Time left before `id` expires, if a deletion is armed for it.
    pub async fn time_to_expiry(&self, id: &PasteId) -> Option<Duration> {
        self.state.read().await.expiry.time_left(id)
    }

    /// Configured paste lifetime.
    pub fn lifetime(&self) -> Option<Duration> {
        self.lifetime
    }

    /// Location of the data directory.
    pub fn data_dir(&self) -> &std::path::Path {
        self.layout.root()
    }
}

impl Drop for PasteStore {
    fn drop(&mut self) {
        self.state.get_mut().expiry.cancel_all();
    }
}
