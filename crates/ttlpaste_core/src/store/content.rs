//! Read handles and the per-entry reader tracking that keeps files alive.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::{OwnedRwLockReadGuard, RwLock};

/// Counts in-flight reads of a single entry.
///
/// Every open [`PasteContent`] holds a shared guard; [`ReadTracker::drain`]
/// waits until all of them are dropped. It never touches the store's index
/// lock, so draining one entry does not stall readers of other entries.
#[derive(Debug, Clone, Default)]
pub(crate) struct ReadTracker {
    readers: Arc<RwLock<()>>,
}

impl ReadTracker {
    /// Register a new reader.
    pub(crate) async fn enter(&self) -> OwnedRwLockReadGuard<()> {
        self.readers.clone().read_owned().await
    }

    /// Wait until every registered reader has finished.
    pub(crate) async fn drain(&self) {
        let _exclusive = self.readers.write().await;
    }
}

/// Open paste content.
///
/// The backing file cannot be unlinked by the store while this handle is
/// alive; dropping it releases the read guard.
#[derive(Debug)]
pub struct PasteContent {
    file: File,
    _reading: OwnedRwLockReadGuard<()>,
}

impl PasteContent {
    pub(crate) fn new(file: File, reading: OwnedRwLockReadGuard<()>) -> Self {
        Self {
            file,
            _reading: reading,
        }
    }
}

impl AsyncRead for PasteContent {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.file).poll_read(cx, buf)
    }
}
