//! HTTP server wiring for ttlpaste (router, handlers and shared state).

/// HTTP error mapping for handlers.
pub mod error;
/// HTTP handlers for pastes and pages.
pub mod handlers;

pub use ttlpaste_core::{config, AppError, Config, PasteStore, StoreConfig};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

/// Shared state passed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PasteStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Construct shared application state.
    ///
    /// # Arguments
    /// - `config`: Loaded configuration.
    /// - `store`: Opened, fully recovered paste store.
    pub fn new(config: Config, store: Arc<PasteStore>) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes and middleware.
///
/// Uploads larger than `max_paste_size` are rejected before they reach the
/// store.
pub fn create_app(state: AppState) -> Router {
    let body_limit = usize::try_from(state.config.max_paste_size.as_u64()).unwrap_or(usize::MAX);

    Router::new()
        .route(
            "/",
            get(handlers::pages::index).post(handlers::paste::create_paste),
        )
        .route("/form", get(handlers::pages::form))
        .route("/stats", get(handlers::pages::stats))
        .route("/api/stats", get(handlers::pages::stats_json))
        .route("/:id", get(handlers::paste::get_paste))
        .with_state(state)
        .layer(
            tower::ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                )),
        )
}

/// Run the Axum server with graceful shutdown support.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let app = create_app(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}
