//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_LIFETIME, DEFAULT_LISTEN, DEFAULT_MAX_PASTE_SIZE,
    DEFAULT_MAX_STORAGE, DEFAULT_SITE_URL,
};
use crate::error::AppError;
use crate::size::ByteSize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for ttlpaste.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub max_storage: ByteSize,
    pub max_paste_size: ByteSize,
    /// `None` means pastes never expire.
    pub lifetime: Option<Duration>,
    pub site_url: String,
    /// `host:port` to bind; the host may be a name such as `localhost`.
    pub listen: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            max_storage: ByteSize(DEFAULT_MAX_STORAGE),
            max_paste_size: ByteSize(DEFAULT_MAX_PASTE_SIZE),
            lifetime: Some(DEFAULT_LIFETIME),
            site_url: DEFAULT_SITE_URL.to_string(),
            listen: DEFAULT_LISTEN.to_string(),
        }
    }
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn resolve_home_dir() -> Option<PathBuf> {
    // Prefer explicit HOME if set (Unix, some Windows shells)
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    None
}

/// Parse a paste lifetime such as `12h`, `90m`, `1h30m` or `2d`.
///
/// Bare numbers are seconds. A total of zero disables expiry.
///
/// # Returns
/// `Some(duration)` for a positive lifetime, `None` when expiry is disabled.
///
/// # Errors
/// Returns [`AppError::Config`] for empty input, unknown units or overflow.
pub fn parse_lifetime(text: &str) -> Result<Option<Duration>, AppError> {
    let invalid = || AppError::Config(format!("Invalid lifetime '{text}' (units: s,m,h,d)"));
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    let mut rest = trimmed;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits == 0 {
            return Err(invalid());
        }
        let value: u64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];
        let unit_len = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit_seconds = match &rest[..unit_len] {
            "" | "s" => 1,
            "m" => 60,
            "h" => 60 * 60,
            "d" => 24 * 60 * 60,
            _ => return Err(invalid()),
        };
        rest = &rest[unit_len..];
        total = value
            .checked_mul(unit_seconds)
            .and_then(|seconds| total.checked_add(seconds))
            .ok_or_else(invalid)?;
    }

    Ok((total > 0).then(|| Duration::from_secs(total)))
}

/// Render a lifetime the way [`parse_lifetime`] reads it.
pub fn format_lifetime(lifetime: Option<Duration>) -> String {
    let Some(lifetime) = lifetime else {
        return "never".to_string();
    };
    let secs = lifetime.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    if seconds > 0 || out.is_empty() {
        out.push_str(&format!("{seconds}s"));
    }
    out
}

/// Check that `value` looks like `host:port` and return it trimmed.
///
/// Hostnames are resolved when binding, not here.
///
/// # Errors
/// Returns [`AppError::Config`] for a missing host or an invalid port.
pub fn parse_listen(value: &str) -> Result<String, AppError> {
    let value = value.trim();
    let (host, port) = value
        .rsplit_once(':')
        .ok_or_else(|| AppError::Config(format!("expected host:port, got {value:?}")))?;
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(AppError::Config(format!("missing host in {value:?}")));
    }
    if host.contains(':') && !(host.starts_with('[') && host.ends_with(']')) {
        return Err(AppError::Config(format!(
            "IPv6 hosts must be bracketed, got {value:?}"
        )));
    }
    port.parse::<u16>()
        .map_err(|_| AppError::Config(format!("invalid port {port:?}")))?;
    Ok(value.to_string())
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T>(
    name: &str,
    parse: impl FnOnce(&str) -> Result<T, AppError>,
) -> Result<Option<T>, AppError> {
    env_value(name)
        .map(|value| {
            parse(&value).map_err(|err| match err {
                AppError::Config(message) => AppError::Config(format!("{name}: {message}")),
                other => AppError::Config(format!("{name}: {other}")),
            })
        })
        .transpose()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Recognized variables: `DATA_DIR`, `MAX_STORAGE`, `MAX_PASTE_SIZE`,
    /// `LIFETIME`, `SITE_URL`, `LISTEN`. Missing or empty variables keep
    /// their defaults.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when a variable is set but unparseable.
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(dir) = env_value("DATA_DIR") {
            config.data_dir = expand_tilde(dir);
        }
        if let Some(size) = parse_env("MAX_STORAGE", |v| v.parse::<ByteSize>())? {
            config.max_storage = size;
        }
        if let Some(size) = parse_env("MAX_PASTE_SIZE", |v| v.parse::<ByteSize>())? {
            config.max_paste_size = size;
        }
        if let Some(lifetime) = parse_env("LIFETIME", parse_lifetime)? {
            config.lifetime = lifetime;
        }
        if let Some(url) = env_value("SITE_URL") {
            config.site_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(listen) = parse_env("LISTEN", parse_listen)? {
            config.listen = listen;
        }

        Ok(config)
    }
}
