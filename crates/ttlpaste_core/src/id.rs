//! Random paste identifiers and their storage paths.
//!
//! An identifier is [`ID_BYTES`] random bytes. Externally it is rendered as
//! lowercase hex; on disk the first byte names a subdirectory and the
//! remaining bytes name the file, so `0a1b2c3d4e5f6071` lives at
//! `0a/1b2c3d4e5f6071`.

use crate::constants::{GENERATE_ATTEMPTS, ID_BYTES, ID_HEX_LEN};
use crate::error::AppError;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Fixed-width random paste identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PasteId([u8; ID_BYTES]);

impl PasteId {
    /// Wrap raw identifier bytes.
    pub const fn from_bytes(bytes: [u8; ID_BYTES]) -> Self {
        Self(bytes)
    }

    /// Draw an unused identifier from the OS random source.
    ///
    /// # Arguments
    /// - `is_taken`: Returns `true` for identifiers already present in the index.
    ///
    /// # Returns
    /// A fresh identifier for which `is_taken` returned `false`.
    ///
    /// # Errors
    /// Returns [`AppError::IdentifierSpaceExhausted`] when every attempt
    /// collided or the random source failed.
    pub fn generate(is_taken: impl Fn(&PasteId) -> bool) -> Result<Self, AppError> {
        Self::generate_with(&mut OsRng, is_taken)
    }

    /// Same as [`PasteId::generate`] but with a caller-supplied random source.
    pub fn generate_with<R: RngCore + ?Sized>(
        rng: &mut R,
        is_taken: impl Fn(&PasteId) -> bool,
    ) -> Result<Self, AppError> {
        let mut bytes = [0u8; ID_BYTES];
        for _ in 0..GENERATE_ATTEMPTS {
            if let Err(err) = rng.try_fill_bytes(&mut bytes) {
                tracing::warn!("Random source failed while generating paste id: {}", err);
                continue;
            }
            let candidate = Self(bytes);
            if !is_taken(&candidate) {
                return Ok(candidate);
            }
        }
        Err(AppError::IdentifierSpaceExhausted(GENERATE_ATTEMPTS))
    }

    /// Path of this paste relative to the data directory.
    ///
    /// The mapping is stable across restarts and inverted by
    /// [`PasteId::from_path_parts`].
    pub fn relative_path(&self) -> PathBuf {
        let (dir, file) = self.path_parts();
        PathBuf::from(dir).join(file)
    }

    /// Hex-encoded directory and file name for this identifier.
    pub fn path_parts(&self) -> (String, String) {
        (hex::encode(&self.0[..1]), hex::encode(&self.0[1..]))
    }

    /// Rebuild an identifier from its directory and file name.
    ///
    /// # Errors
    /// Returns [`AppError::MalformedIdentifier`] if the parts do not decode
    /// to a full identifier or the directory is not exactly one byte.
    pub fn from_path_parts(dir: &str, file: &str) -> Result<Self, AppError> {
        if dir.len() != 2 {
            return Err(AppError::MalformedIdentifier);
        }
        format!("{dir}{file}").parse()
    }
}

impl FromStr for PasteId {
    type Err = AppError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.len() != ID_HEX_LEN {
            return Err(AppError::MalformedIdentifier);
        }
        let mut bytes = [0u8; ID_BYTES];
        hex::decode_to_slice(text, &mut bytes).map_err(|_| AppError::MalformedIdentifier)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for PasteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for PasteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PasteId({self})")
    }
}
