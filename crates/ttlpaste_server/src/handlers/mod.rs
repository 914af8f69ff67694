//! HTTP request handlers.

/// Static pages and diagnostics.
pub mod pages;
/// Paste upload and download.
pub mod paste;
