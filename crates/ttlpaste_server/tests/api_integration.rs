//! Integration tests for the paste HTTP API.

mod support;

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::multipart::MultipartForm;
use support::{setup_test_server, test_config_for_data_dir, test_server_for_config, SITE_URL};
use tempfile::TempDir;
use ttlpaste_core::{ByteSize, PasteId};

fn paste_form(content: &str) -> MultipartForm {
    MultipartForm::new().add_text("paste", content.to_string())
}

fn id_from_link(link: &str) -> String {
    link.trim_end()
        .strip_prefix(&format!("{SITE_URL}/"))
        .expect("link should start with the site url")
        .to_string()
}

#[tokio::test]
async fn test_paste_round_trip() {
    let (server, store, _temp) = setup_test_server().await;

    let create = server.post("/").multipart(paste_form("Hello, World!\n")).await;
    assert_eq!(create.status_code(), StatusCode::OK);
    let link = create.text();
    assert!(link.ends_with('\n'));
    let id = id_from_link(&link);
    let parsed: PasteId = id.parse().expect("returned id should parse");
    assert!(store.contains(&parsed).await);

    let get = server.get(&format!("/{id}")).await;
    assert_eq!(get.status_code(), StatusCode::OK);
    assert_eq!(get.text(), "Hello, World!\n");
    get.assert_header("content-type", "text/plain; charset=utf-8");
    get.assert_contains_header("etag");
    get.assert_contains_header("last-modified");
}

#[tokio::test]
async fn test_matching_etag_returns_not_modified() {
    let (server, _store, _temp) = setup_test_server().await;
    let id = id_from_link(&server.post("/").multipart(paste_form("cache me")).await.text());

    let first = server.get(&format!("/{id}")).await;
    let etag = first.header("etag");

    let revalidated = server
        .get(&format!("/{id}"))
        .add_header(header::IF_NONE_MATCH, etag.clone())
        .await;
    assert_eq!(revalidated.status_code(), StatusCode::NOT_MODIFIED);
    assert!(revalidated.text().is_empty());

    let wildcard = server
        .get(&format!("/{id}"))
        .add_header(header::IF_NONE_MATCH, HeaderValue::from_static("*"))
        .await;
    assert_eq!(wildcard.status_code(), StatusCode::NOT_MODIFIED);

    let stale = server
        .get(&format!("/{id}"))
        .add_header(header::IF_NONE_MATCH, HeaderValue::from_static("\"0-stale\""))
        .await;
    assert_eq!(stale.status_code(), StatusCode::OK);
    assert_eq!(stale.text(), "cache me");
}

#[tokio::test]
async fn test_if_modified_since_returns_not_modified() {
    let (server, _store, _temp) = setup_test_server().await;
    let id = id_from_link(&server.post("/").multipart(paste_form("dated")).await.text());

    let first = server.get(&format!("/{id}")).await;
    let last_modified = first.header("last-modified");

    let revalidated = server
        .get(&format!("/{id}"))
        .add_header(header::IF_MODIFIED_SINCE, last_modified.clone())
        .await;
    assert_eq!(revalidated.status_code(), StatusCode::NOT_MODIFIED);

    let older = server
        .get(&format!("/{id}"))
        .add_header(
            header::IF_MODIFIED_SINCE,
            HeaderValue::from_static("Sun, 06 Nov 1994 08:49:37 GMT"),
        )
        .await;
    assert_eq!(older.status_code(), StatusCode::OK);
    assert_eq!(older.text(), "dated");

    let etag_wins = server
        .get(&format!("/{id}"))
        .add_header(header::IF_NONE_MATCH, HeaderValue::from_static("\"0-stale\""))
        .add_header(header::IF_MODIFIED_SINCE, last_modified)
        .await;
    assert_eq!(etag_wins.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_and_unknown_ids() {
    let (server, _store, _temp) = setup_test_server().await;

    let invalid = server.get("/not-a-paste").await;
    assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(invalid.text(), "Invalid paste id.\n");

    let unknown = server.get("/0123456789abcdef").await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(unknown.text(), "Paste doesn't exist.\n");
}

#[tokio::test]
async fn test_deleted_paste_is_not_found() {
    let (server, store, _temp) = setup_test_server().await;
    let id = id_from_link(&server.post("/").multipart(paste_form("short")).await.text());

    store
        .delete(&id.parse().expect("id"))
        .await
        .expect("delete");
    let response = server.get(&format!("/{id}")).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_or_empty_paste_field_is_rejected() {
    let (server, store, _temp) = setup_test_server().await;

    let missing = server
        .post("/")
        .multipart(MultipartForm::new().add_text("other", "value"))
        .await;
    assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        missing.text(),
        "Paste could not be found inside the posted form.\n"
    );

    let empty = server.post("/").multipart(paste_form("")).await;
    assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_quota_exceeded_is_rejected_without_state_change() {
    let temp = TempDir::new().expect("temp dir");
    let mut config = test_config_for_data_dir(&temp.path().join("data"));
    config.max_storage = ByteSize(100);
    let (server, store) = test_server_for_config(config).await;

    let fits = server.post("/").multipart(paste_form(&"a".repeat(100))).await;
    assert_eq!(fits.status_code(), StatusCode::OK);

    let overflow = server.post("/").multipart(paste_form("b")).await;
    assert_eq!(overflow.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(store.len().await, 1);
    assert_eq!(store.stats().await.used_bytes, ByteSize(100));
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let (server, store, _temp) = setup_test_server().await;
    let huge = "x".repeat(128 * 1024);
    let response = server.post("/").multipart(paste_form(&huge)).await;
    assert!(response.status_code().is_client_error());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_pages_and_stats() {
    let (server, _store, _temp) = setup_test_server().await;
    server.post("/").multipart(paste_form("0123456789")).await;

    let index = server.get("/").await;
    assert_eq!(index.status_code(), StatusCode::OK);
    let usage = index.text();
    assert!(usage.contains(SITE_URL));
    assert!(usage.contains("12h"));

    let form = server.get("/form").await;
    assert_eq!(form.status_code(), StatusCode::OK);
    assert!(form.text().contains("name=\"paste\""));

    let stats = server.get("/stats").await;
    assert_eq!(
        stats.text(),
        "Have a total of 1 pastes using 10B out of 1.00MB (0.00%)\n"
    );

    let json: serde_json::Value = server.get("/api/stats").await.json();
    assert_eq!(json["pastes"], 1);
    assert_eq!(json["used_bytes"], 10);
    assert_eq!(json["max_bytes"], 1024 * 1024);
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let (server, _store, _temp) = setup_test_server().await;
    let response = server.get("/").await;
    response.assert_header("x-content-type-options", "nosniff");
    response.assert_header("x-frame-options", "DENY");
}

#[tokio::test]
async fn test_pastes_are_served_after_restart() {
    let temp = TempDir::new().expect("temp dir");
    let data_dir = temp.path().join("data");

    let (server, store) = test_server_for_config(test_config_for_data_dir(&data_dir)).await;
    let id = id_from_link(&server.post("/").multipart(paste_form("durable")).await.text());
    drop(server);
    drop(store);

    let (server, _store) = test_server_for_config(test_config_for_data_dir(&data_dir)).await;
    let response = server.get(&format!("/{id}")).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "durable");
}
