//! Flat-directory file store.
//!
//! Every upload is a direct child of the store root:
//! ```text
//! {root}/
//! ├── 2023-11-14_22-13-20_1700000000000_report.pdf
//! ├── 2023-11-14_22-13-21_1700000001234_photo.png
//! └── .upload-XXXXXX        (in-flight write, never listed)
//! ```
//! There is no index; every call re-reads the filesystem.

use std::fs::{self, Metadata};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{DateTime, Utc};

use super::naming;
use crate::datetime::from_system_time;
use crate::{FiledropError, Result};

/// Prefix of temporary files created while a write is in flight.
const TEMP_PREFIX: &str = ".upload-";

/// A file in the store, with its display name decoded from the stored name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Unique on-disk name.
    pub stored_name: String,
    /// Name the file was uploaded under.
    pub original_name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Upload time encoded in the stored name. Names without one use the
    /// filesystem birth time, or the modification time where birth time is
    /// not recorded.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub modified_at: DateTime<Utc>,
}

impl StoredFile {
    fn from_metadata(stored_name: String, metadata: &Metadata) -> Self {
        let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
        let created = naming::ParsedName::parse(&stored_name)
            .uploaded_at()
            .unwrap_or_else(|| from_system_time(metadata.created().unwrap_or(modified)));

        Self {
            original_name: naming::decode(&stored_name),
            stored_name,
            size_bytes: metadata.len(),
            created_at: created,
            modified_at: from_system_time(modified),
        }
    }
}

/// Names that belong to the store's public namespace.
///
/// Dot-prefixed names are reserved for temporary files.
fn is_visible_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.')
}

/// Directory-backed store of uploaded files.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`.
    ///
    /// The directory is not touched until the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the store root if it does not exist.
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Map a logical name to its path inside the root.
    ///
    /// The name is normalised lexically and must end up as a single direct
    /// child of the root. Nothing on disk is consulted.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let invalid = || FiledropError::InvalidPath(name.to_string());

        if name.is_empty() || name.contains('\0') {
            return Err(invalid());
        }

        let mut parts = Vec::new();
        for component in Path::new(name).components() {
            match component {
                Component::Normal(part) => parts.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if parts.pop().is_none() {
                        return Err(invalid());
                    }
                }
                Component::RootDir | Component::Prefix(_) => return Err(invalid()),
            }
        }

        match parts.as_slice() {
            [single] if single.to_str().is_some_and(is_visible_name) => Ok(self.root.join(single)),
            _ => Err(invalid()),
        }
    }

    /// List every stored file, newest first.
    ///
    /// A missing root is an empty store. Entries that vanish or cannot be
    /// stat'ed while listing are skipped.
    pub fn list(&self) -> Result<Vec<StoredFile>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !is_visible_name(&name) {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) if metadata.is_file() => {
                    files.push(StoredFile::from_metadata(name, &metadata));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(file = %name, error = %e, "Skipping entry that vanished during listing");
                }
            }
        }

        files.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.stored_name.cmp(&a.stored_name))
        });

        Ok(files)
    }

    /// Metadata for one stored file.
    pub fn stat(&self, name: &str) -> Result<StoredFile> {
        let path = self.resolve(name)?;
        let metadata = Self::regular_file_metadata(&path, name)?;
        Ok(StoredFile::from_metadata(name.to_string(), &metadata))
    }

    /// Write `content` under `stored_name`.
    ///
    /// The bytes go to a temporary file in the root which is then linked into
    /// place, so listers never see a partial file. An existing file is never
    /// replaced; that case yields [`FiledropError::Conflict`].
    pub fn write(&self, stored_name: &str, content: &[u8]) -> Result<()> {
        let path = self.resolve(stored_name)?;
        self.ensure_root()?;

        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.root)?;
        temp.write_all(content)?;
        temp.as_file().sync_all()?;

        temp.persist_noclobber(&path).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                FiledropError::Conflict(format!("File {stored_name} already exists"))
            } else {
                FiledropError::Io(e.error)
            }
        })?;

        Ok(())
    }

    /// Read a whole stored file.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(name)?;
        Self::regular_file_metadata(&path, name)?;

        match fs::read(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FiledropError::NotFound(format!("File: {name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Open a stored file for streaming.
    pub async fn open_read(&self, name: &str) -> Result<tokio::fs::File> {
        let path = self.resolve(name)?;
        let not_found = || FiledropError::NotFound(format!("File: {name}"));

        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Err(not_found()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        }

        match tokio::fs::File::open(&path).await {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }

    /// Check that `name` resolves to an existing regular file.
    pub fn exists(&self, name: &str) -> Result<bool> {
        match self.stat(name) {
            Ok(_) => Ok(true),
            Err(FiledropError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Deleting uploads is not offered.
    pub fn delete(&self, name: &str) -> Result<()> {
        self.resolve(name)?;
        Err(FiledropError::Unsupported(
            "deleting stored files".to_string(),
        ))
    }

    fn regular_file_metadata(path: &Path, name: &str) -> Result<Metadata> {
        match fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => Ok(metadata),
            Ok(_) => Err(FiledropError::NotFound(format!("File: {name}"))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FiledropError::NotFound(format!("File: {name}")))
            }
            Err(e) => Err(e.into()),
        }
    }
}
