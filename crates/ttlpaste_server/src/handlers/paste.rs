//! Paste HTTP handlers.

use crate::error::{HttpError, MISSING_FORM};
use crate::AppState;
use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use tokio_util::io::ReaderStream;
use ttlpaste_core::AppError;

/// Multipart field carrying the paste body.
pub const PASTE_FIELD: &str = "paste";

fn http_date(time: &DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn quoted_etag(etag: &str) -> String {
    format!("\"{etag}\"")
}

/// Whether an `If-None-Match` header value matches `etag`.
///
/// Accepts `*`, comma-separated lists, weak validators and unquoted tags.
fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match.split(',').any(|candidate| {
        let candidate = candidate.trim();
        if candidate == "*" {
            return true;
        }
        let candidate = candidate.strip_prefix("W/").unwrap_or(candidate);
        candidate.trim_matches('"') == etag
    })
}

/// Whether content last modified at `modified` is unchanged since the
/// `If-Modified-Since` date. HTTP dates carry whole seconds only.
fn unmodified_since(if_modified_since: &str, modified: &DateTime<Utc>) -> bool {
    DateTime::parse_from_rfc2822(if_modified_since.trim())
        .is_ok_and(|since| modified.timestamp() <= since.timestamp())
}

fn header_value(value: &str) -> Result<HeaderValue, HttpError> {
    HeaderValue::from_str(value).map_err(|err| {
        HttpError::App(AppError::StorageMessage(format!(
            "invalid header value {value:?}: {err}"
        )))
    })
}

/// Store an uploaded paste.
///
/// # Arguments
/// - `state`: Application state.
/// - `multipart`: Form upload carrying a non-empty `paste` field.
///
/// # Returns
/// The public URL of the new paste followed by a newline.
///
/// # Errors
/// Rejects malformed forms and missing or empty `paste` fields with
/// `400`, and surfaces store errors.
pub async fn create_paste(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<String, HttpError> {
    let mut content = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(PASTE_FIELD) {
            content = Some(field.bytes().await?);
            break;
        }
    }
    let content = content
        .filter(|content| !content.is_empty())
        .ok_or_else(|| HttpError::bad_request(MISSING_FORM))?;

    let id = state.store.put(&content).await?;
    Ok(format!("{}/{}\n", state.config.site_url, id))
}

/// Serve a paste.
///
/// # Arguments
/// - `state`: Application state.
/// - `id`: Hex paste identifier from the path.
/// - `headers`: Request headers, checked for cache validators.
///
/// # Returns
/// The paste content streamed from disk, or `304 Not Modified` when the
/// client already holds the current version according to `If-None-Match`
/// or, failing that, `If-Modified-Since`.
///
/// # Errors
/// `400` for malformed ids, `404` for unknown ones.
pub async fn get_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    let (_, content, meta) = state.store.get_by_text(&id).await?;
    let etag = header_value(&quoted_etag(&meta.etag))?;

    // If-Modified-Since only applies when If-None-Match is absent.
    let not_modified = match headers.get(header::IF_NONE_MATCH) {
        Some(value) => value
            .to_str()
            .is_ok_and(|value| etag_matches(value, &meta.etag)),
        None => headers
            .get(header::IF_MODIFIED_SINCE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| unmodified_since(value, &meta.modified)),
    };
    if not_modified {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    let mut response = Response::new(Body::from_stream(ReaderStream::new(content)));
    let response_headers = response.headers_mut();
    response_headers.insert(header::CONTENT_TYPE, header_value(&meta.content_type)?);
    response_headers.insert(header::CONTENT_LENGTH, HeaderValue::from(meta.size));
    response_headers.insert(header::ETAG, etag);
    response_headers.insert(
        header::LAST_MODIFIED,
        header_value(&http_date(&meta.modified))?,
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::{etag_matches, http_date, unmodified_since};
    use chrono::{TimeZone, Utc};

    #[test]
    fn etag_matching_handles_common_forms() {
        let etag = "1700000000-0a1b2c3d4e5f6071";
        assert!(etag_matches("*", etag));
        assert!(etag_matches("\"1700000000-0a1b2c3d4e5f6071\"", etag));
        assert!(etag_matches("1700000000-0a1b2c3d4e5f6071", etag));
        assert!(etag_matches("W/\"other\", \"1700000000-0a1b2c3d4e5f6071\"", etag));
        assert!(!etag_matches("\"1700000001-0a1b2c3d4e5f6071\"", etag));
    }

    #[test]
    fn http_date_uses_imf_fixdate() {
        let time = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
        assert_eq!(http_date(&time), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn if_modified_since_compares_whole_seconds() {
        let modified = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap()
            + chrono::Duration::milliseconds(400);
        assert!(unmodified_since("Sun, 06 Nov 1994 08:49:37 GMT", &modified));
        assert!(unmodified_since("Mon, 07 Nov 1994 00:00:00 GMT", &modified));
        assert!(!unmodified_since("Sun, 06 Nov 1994 08:49:36 GMT", &modified));
        assert!(!unmodified_since("yesterday", &modified));
    }
}
