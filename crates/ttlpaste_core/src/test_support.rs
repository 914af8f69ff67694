//! Shared test-only helpers for ttlpaste_core.

use crate::store::{PasteContent, PasteStore, StoreConfig};
use crate::ByteSize;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;

/// Store settings rooted in a fresh temporary directory.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing files.
pub(crate) fn temp_store_config(
    max_storage: ByteSize,
    lifetime: Option<Duration>,
) -> (StoreConfig, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = StoreConfig::new(temp_dir.path().join("data"), max_storage, lifetime);
    (config, temp_dir)
}

/// Opens an isolated store with a 1MB quota and no expiry.
pub(crate) async fn setup_temp_store() -> (Arc<PasteStore>, TempDir) {
    let (config, temp_dir) = temp_store_config(ByteSize::MB, None);
    let store = PasteStore::open(config).await.expect("open store");
    (store, temp_dir)
}

/// Reads a paste handle to the end.
pub(crate) async fn read_all(mut content: PasteContent) -> Vec<u8> {
    let mut buf = Vec::new();
    content.read_to_end(&mut buf).await.expect("read paste");
    buf
}

/// Polls `check` until it holds or `timeout` elapses.
///
/// # Panics
/// Panics with `what` when the condition is not reached in time.
pub(crate) async fn wait_until<F, Fut>(timeout: Duration, what: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while !check().await {
        assert!(tokio::time::Instant::now() < deadline, "timed out waiting for {what}");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
