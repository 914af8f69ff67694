//! Core library for ttlpaste (configuration, identifiers, quota, content store).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Process-global environment helpers.
pub mod env;
/// Application error types.
pub mod error;
/// Paste identifiers and their on-disk paths.
pub mod id;
/// Storage quota bookkeeping.
pub mod quota;
/// Byte sizes with human-readable formatting.
pub mod size;
/// Content type sniffing.
pub mod sniff;
/// File-backed paste store with expiry and recovery.
pub mod store;
#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::{DEFAULT_LISTEN, DEFAULT_SITE_URL};
pub use error::AppError;
pub use id::PasteId;
pub use size::ByteSize;
pub use store::{PasteContent, PasteHeader, PasteStore, StoreConfig, StoreStats};
