//! Byte sizes with binary-unit parsing and formatting.

use crate::error::AppError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A size in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct ByteSize(pub u64);

impl ByteSize {
    /// One kibibyte.
    pub const KB: ByteSize = ByteSize(1 << 10);
    /// One mebibyte.
    pub const MB: ByteSize = ByteSize(1 << 20);
    /// One gibibyte.
    pub const GB: ByteSize = ByteSize(1 << 30);

    /// Number of bytes.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for ByteSize {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;
        if bytes >= Self::MB.0 {
            write!(f, "{:.2}MB", bytes as f64 / Self::MB.0 as f64)
        } else if bytes >= Self::KB.0 {
            write!(f, "{:.2}KB", bytes as f64 / Self::KB.0 as f64)
        } else {
            write!(f, "{bytes}B")
        }
    }
}

/// Parses sizes such as `512`, `100B`, `64K`, `1.5MB` or `2G`.
///
/// Units are binary (`K` = 1024 bytes) and case-insensitive.
impl FromStr for ByteSize {
    type Err = AppError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::Config(format!("Could not parse size in bytes: '{text}'"));
        let trimmed = text.trim();
        let split = trimmed
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);
        let value: f64 = number.parse().map_err(|_| invalid())?;
        let multiplier = match unit.trim().to_ascii_uppercase().as_str() {
            "" | "B" => 1,
            "K" | "KB" => Self::KB.0,
            "M" | "MB" => Self::MB.0,
            "G" | "GB" => Self::GB.0,
            _ => return Err(invalid()),
        };
        let bytes = value * multiplier as f64;
        if !bytes.is_finite() || bytes < 0.0 || bytes > u64::MAX as f64 {
            return Err(invalid());
        }
        Ok(Self(bytes as u64))
    }
}
