//! Usage page, upload form and usage reports.

use super::paste::PASTE_FIELD;
use crate::AppState;
use axum::{extract::State, response::Html, Json};
use ttlpaste_core::config::format_lifetime;
use ttlpaste_core::StoreStats;

/// Plain-text usage instructions.
pub async fn index(State(state): State<AppState>) -> String {
    let site_url = &state.config.site_url;
    let expiry = match state.config.lifetime {
        Some(_) => format!(
            "Pastes are deleted {} after being created.",
            format_lifetime(state.config.lifetime)
        ),
        None => "Pastes are kept until the server runs out of space.".to_string(),
    };
    format!(
        "ttlpaste\n\
         \n\
         Upload text with any HTTP client and get back a link to it:\n\
         \n\
         \x20   $ echo 'hello world' | curl -F '{field}=<-' {site_url}\n\
         \x20   {site_url}/0a1b2c3d4e5f6071\n\
         \n\
         {expiry}\n\
         Maximum upload size: {max}.\n\
         A web form is available at {site_url}/form\n",
        field = PASTE_FIELD,
        max = state.config.max_paste_size,
    )
}

/// HTML upload form.
pub async fn form(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><meta charset=\"utf-8\"><title>ttlpaste</title></head>\n\
         <body>\n\
         <form action=\"{site_url}/\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <textarea name=\"{field}\" cols=\"80\" rows=\"24\"></textarea>\n\
         <br><button type=\"submit\">Paste</button>\n\
         </form>\n\
         </body>\n\
         </html>\n",
        site_url = state.config.site_url,
        field = PASTE_FIELD,
    ))
}

/// Human-readable storage usage.
pub async fn stats(State(state): State<AppState>) -> String {
    format!("{}\n", state.store.report().await)
}

/// Storage usage as JSON.
pub async fn stats_json(State(state): State<AppState>) -> Json<StoreStats> {
    Json(state.store.stats().await)
}
