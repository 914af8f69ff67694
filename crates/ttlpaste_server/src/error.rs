//! Mapping of store errors to HTTP responses.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ttlpaste_core::AppError;

pub(crate) const INVALID_ID: &str = "Invalid paste id.";
pub(crate) const PASTE_NOT_FOUND: &str = "Paste doesn't exist.";
pub(crate) const UNKNOWN_ERROR: &str = "Something went terribly wrong.";
pub(crate) const REACHED_MAX: &str = "Reached maximum capacity of pastes. Please try again later.";
pub(crate) const NO_UNUSED_ID: &str = "No unused paste id could be found. Please try again later.";
pub(crate) const MISSING_FORM: &str = "Paste could not be found inside the posted form.";

/// Error returned by HTTP handlers.
///
/// Responses are plain text. Internal failures are logged and answered with
/// a generic message so filesystem details never reach clients.
#[derive(Debug)]
pub enum HttpError {
    /// A store or configuration error.
    App(AppError),
    /// The request was rejected before reaching the store.
    Rejected(StatusCode, String),
}

impl HttpError {
    /// Reject the request with `400 Bad Request`.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Rejected(StatusCode::BAD_REQUEST, message.into())
    }
}

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        Self::App(value)
    }
}

impl From<MultipartError> for HttpError {
    fn from(value: MultipartError) -> Self {
        tracing::debug!("Could not parse POST multipart form: {}", value);
        Self::Rejected(value.status(), value.body_text())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::App(AppError::MalformedIdentifier) => {
                (StatusCode::BAD_REQUEST, INVALID_ID.to_string())
            }
            HttpError::App(AppError::NotFound) => {
                (StatusCode::NOT_FOUND, PASTE_NOT_FOUND.to_string())
            }
            HttpError::App(AppError::QuotaExceeded) => {
                (StatusCode::PAYLOAD_TOO_LARGE, REACHED_MAX.to_string())
            }
            HttpError::App(AppError::IdentifierSpaceExhausted(tries)) => {
                tracing::warn!("Gave up finding an unused paste id after {} tries", tries);
                (StatusCode::CONFLICT, NO_UNUSED_ID.to_string())
            }
            HttpError::App(err) => {
                tracing::error!("Internal error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, UNKNOWN_ERROR.to_string())
            }
            HttpError::Rejected(status, message) => (status, message),
        };
        (status, format!("{message}\n")).into_response()
    }
}
