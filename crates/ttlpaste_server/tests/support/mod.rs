//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use ttlpaste_core::ByteSize;
use ttlpaste_server::{create_app, AppState, Config, PasteStore, StoreConfig};

pub(crate) const SITE_URL: &str = "http://paste.test";

pub(crate) fn test_config_for_data_dir(data_dir: &Path) -> Config {
    Config {
        data_dir: data_dir.to_path_buf(),
        max_storage: ByteSize::MB,
        max_paste_size: ByteSize(64 * 1024),
        lifetime: Some(Duration::from_secs(12 * 60 * 60)),
        site_url: SITE_URL.to_string(),
        listen: "127.0.0.1:0".to_string(),
    }
}

pub(crate) async fn test_server_for_config(config: Config) -> (TestServer, Arc<PasteStore>) {
    let store = PasteStore::open(StoreConfig::from(&config))
        .await
        .expect("open store");
    let state = AppState::new(config, store.clone());
    let server = TestServer::new(create_app(state)).expect("server");
    (server, store)
}

pub(crate) async fn setup_test_server() -> (TestServer, Arc<PasteStore>, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config_for_data_dir(&temp_dir.path().join("data"));
    let (server, store) = test_server_for_config(config).await;
    (server, store, temp_dir)
}
