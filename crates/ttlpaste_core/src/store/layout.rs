//! On-disk layout of the data directory.

use crate::constants::SNIFF_LEN;
use crate::error::AppError;
use crate::id::PasteId;
use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::io::AsyncWriteExt;
use walkdir::WalkDir;

/// A paste found on persistent storage, before it is indexed.
#[derive(Debug, Clone)]
pub struct PersistedEntry {
    pub id: PasteId,
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
    /// Up to [`SNIFF_LEN`] leading bytes of the content.
    pub head: Vec<u8>,
}

/// Source of previously persisted pastes, consumed once by recovery.
pub trait EntrySource {
    /// List every persisted paste with its raw metadata.
    ///
    /// # Errors
    /// Fails when storage cannot be read or holds something that is not a
    /// managed paste.
    fn list_entries(&self) -> Result<Vec<PersistedEntry>, AppError>;
}

/// Data directory holding one file per paste, two levels deep.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Create the data directory and its 256 first-level subdirectories.
    ///
    /// # Errors
    /// Returns an error if a directory cannot be created or a first-level
    /// name is taken by something that is not a directory.
    pub fn prepare(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| {
            AppError::StorageMessage(format!(
                "cannot create data directory {}: {}",
                root.display(),
                err
            ))
        })?;
        for byte in 0..=u8::MAX {
            let dir = root.join(hex::encode([byte]));
            match fs::metadata(&dir) {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => {
                    return Err(AppError::StorageMessage(format!(
                        "{} exists but is not a directory",
                        dir.display()
                    )));
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    fs::create_dir(&dir).map_err(|err| {
                        AppError::StorageMessage(format!(
                            "cannot create data directory {}: {}",
                            dir.display(),
                            err
                        ))
                    })?;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(Self { root })
    }

    /// Root of the data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a paste's backing file.
    pub fn paste_path(&self, id: &PasteId) -> PathBuf {
        self.root.join(id.relative_path())
    }
}

/// Write `content` to a file that must not exist yet.
///
/// Returns the file's modification time once written, which recovery later
/// reads back as the paste's creation time.
///
/// An existing file is reported as [`ErrorKind::AlreadyExists`] rather than
/// overwritten. If writing fails after the file was created, the partial
/// file is removed before returning the error.
pub(crate) async fn write_new_file(path: &Path, content: &[u8]) -> std::io::Result<SystemTime> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    let written = async {
        file.write_all(content).await?;
        file.flush().await?;
        file.metadata().await?.modified()
    }
    .await;
    drop(file);

    match written {
        Ok(modified) => Ok(modified),
        Err(err) => {
            if let Err(cleanup) = tokio::fs::remove_file(path).await {
                tracing::warn!(
                    "Failed to remove partial paste file {}: {}",
                    path.display(),
                    cleanup
                );
            }
            Err(err)
        }
    }
}

fn unmanaged(path: &Path) -> AppError {
    AppError::StorageMessage(format!(
        "found unmanaged file in data directory: {}",
        path.display()
    ))
}

fn read_head(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    fs::File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)?;
    Ok(head)
}

impl EntrySource for DataDir {
    fn list_entries(&self) -> Result<Vec<PersistedEntry>, AppError> {
        let mut entries = Vec::new();
        for item in WalkDir::new(&self.root).min_depth(1).sort_by_file_name() {
            let item = item.map_err(|err| {
                AppError::StorageMessage(format!(
                    "cannot walk data directory {}: {}",
                    self.root.display(),
                    err
                ))
            })?;
            let path = item.path();
            let file_type = item.file_type();
            if file_type.is_dir() {
                if item.depth() > 1 {
                    return Err(unmanaged(path));
                }
                continue;
            }
            if !file_type.is_file() || item.depth() != 2 {
                return Err(unmanaged(path));
            }

            let relative = path.strip_prefix(&self.root).map_err(|_| unmanaged(path))?;
            let mut parts = relative.iter().map(|part| part.to_str());
            let id = match (parts.next(), parts.next()) {
                (Some(Some(dir)), Some(Some(file))) => {
                    PasteId::from_path_parts(dir, file).map_err(|_| unmanaged(path))?
                }
                _ => return Err(unmanaged(path)),
            };

            let metadata = item.metadata().map_err(|err| {
                AppError::StorageMessage(format!("cannot stat {}: {}", path.display(), err))
            })?;
            entries.push(PersistedEntry {
                id,
                path: path.to_path_buf(),
                size: metadata.len(),
                modified: metadata.modified()?,
                head: read_head(path)?,
            });
        }
        Ok(entries)
    }
}
