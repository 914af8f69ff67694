//! Shared constants used across ttlpaste crates.

use std::time::Duration;

/// Default address the HTTP server listens on.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";

/// Default public base URL used when rendering paste links.
pub const DEFAULT_SITE_URL: &str = "http://localhost:8080";

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default maximum size of a single upload.
pub const DEFAULT_MAX_PASTE_SIZE: u64 = 1024 * 1024;

/// Default maximum total bytes kept on disk.
pub const DEFAULT_MAX_STORAGE: u64 = 500 * 1024 * 1024;

/// Default lifetime of a paste.
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(12 * 60 * 60);

/// Raw identifier length in bytes.
pub const ID_BYTES: usize = 8;

/// External (hex) identifier length in characters.
pub const ID_HEX_LEN: usize = ID_BYTES * 2;

/// Random draws attempted before giving up on finding an unused identifier.
pub const GENERATE_ATTEMPTS: usize = 10;

/// Delay between attempts to remove a paste file that could not be unlinked.
pub const REMOVAL_RETRY_INTERVAL: Duration = Duration::from_secs(2 * 60);

/// Leading bytes inspected when sniffing content types.
pub const SNIFF_LEN: usize = 512;

/// Content type used when sniffing finds nothing more specific.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
