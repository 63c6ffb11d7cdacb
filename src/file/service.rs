//! Upload service for filedrop.
//!
//! This module ties the pieces of an upload together:
//! - Policy checks (name, extension allow-list, size)
//! - Stored-name encoding
//! - Non-clobbering write with retry on same-millisecond collisions

use chrono::{DateTime, Duration, Utc};

use super::naming::{self, split_extension};
use super::store::FileStore;
use crate::config::FilesConfig;
use crate::{FiledropError, Result};

/// Longest accepted original name, in bytes.
///
/// The stored name adds a 34-byte prefix and most filesystems cap names
/// at 255 bytes.
pub const MAX_ORIGINAL_NAME_BYTES: usize = 200;

/// Stored-name attempts before an upload gives up on collisions.
const MAX_NAME_ATTEMPTS: u32 = 5;

/// What an upload must satisfy before anything is written.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Maximum payload size in bytes.
    pub max_size: u64,
    /// Accepted extensions, lowercase, without the dot.
    pub allowed_extensions: Vec<String>,
}

impl UploadPolicy {
    /// Build the policy from the `[files]` config section.
    pub fn from_config(config: &FilesConfig) -> Self {
        Self {
            max_size: config.max_upload_size_bytes(),
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Check that `name` is a bare filename with an allowed extension.
    pub fn validate_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(FiledropError::InvalidName("No file name provided".to_string()));
        }
        if name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(FiledropError::InvalidName(
                "File name must not contain a path".to_string(),
            ));
        }
        if name.chars().any(char::is_control) {
            return Err(FiledropError::InvalidName(
                "File name contains control characters".to_string(),
            ));
        }
        if name.len() > MAX_ORIGINAL_NAME_BYTES {
            return Err(FiledropError::InvalidName(format!(
                "File name is too long (max {MAX_ORIGINAL_NAME_BYTES} bytes)"
            )));
        }

        let ext = match split_extension(name) {
            (_, Some(ext)) if !ext.is_empty() => ext.to_lowercase(),
            _ => {
                return Err(FiledropError::Validation(format!(
                    "Files without an extension are not allowed. Allowed types: {}",
                    self.allowed_extensions.join(", ")
                )))
            }
        };

        if !self.allowed_extensions.contains(&ext) {
            return Err(FiledropError::Validation(format!(
                "File type .{ext} is not allowed. Allowed types: {}",
                self.allowed_extensions.join(", ")
            )));
        }

        Ok(())
    }

    /// Check the payload size.
    pub fn validate_size(&self, size: u64) -> Result<()> {
        if size > self.max_size {
            let max_mb = self.max_size / 1024 / 1024;
            return Err(FiledropError::Validation(format!(
                "File size too large. Maximum size is {max_mb}MB."
            )));
        }
        Ok(())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from_config(&FilesConfig::default())
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Name the file is stored under.
    pub stored_name: String,
    /// Name the client sent.
    pub original_name: String,
    /// Payload size in bytes.
    pub size: u64,
}

/// Upload front door over a [`FileStore`].
pub struct FileService<'a> {
    store: &'a FileStore,
    policy: &'a UploadPolicy,
}

impl<'a> FileService<'a> {
    /// Create a new FileService.
    pub fn new(store: &'a FileStore, policy: &'a UploadPolicy) -> Self {
        Self { store, policy }
    }

    /// Store an upload received now.
    pub fn upload(&self, original_name: &str, content: &[u8]) -> Result<UploadedFile> {
        self.upload_at(original_name, content, Utc::now())
    }

    /// Store an upload received at `now`.
    ///
    /// If the encoded name is already taken (two uploads of the same name in
    /// the same millisecond), the next millisecond is tried.
    pub fn upload_at(
        &self,
        original_name: &str,
        content: &[u8],
        now: DateTime<Utc>,
    ) -> Result<UploadedFile> {
        self.policy.validate_name(original_name)?;
        self.policy.validate_size(content.len() as u64)?;

        let mut at = now;
        for _ in 0..MAX_NAME_ATTEMPTS {
            let stored_name = naming::encode(original_name, at)?;

            match self.store.write(&stored_name, content) {
                Ok(()) => {
                    tracing::info!(
                        stored_name = %stored_name,
                        size = content.len(),
                        "File uploaded"
                    );
                    return Ok(UploadedFile {
                        stored_name,
                        original_name: original_name.to_string(),
                        size: content.len() as u64,
                    });
                }
                Err(FiledropError::Conflict(_)) => {
                    tracing::debug!(stored_name = %stored_name, "Stored name taken, retrying");
                    at += Duration::milliseconds(1);
                }
                Err(e) => return Err(e),
            }
        }

        Err(FiledropError::Conflict(format!(
            "Could not allocate a unique name for {original_name}"
        )))
    }
}
