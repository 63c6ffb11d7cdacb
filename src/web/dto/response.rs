//! Response DTOs for Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::datetime::to_rfc3339;
use crate::file::{StoredFile, UploadedFile};

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// File DTOs
// ============================================================================

/// A stored file as shown in listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct StoredFileResponse {
    /// Unique on-disk name; use it to fetch, download, or archive the file.
    pub stored_name: String,
    /// Name the file was uploaded under.
    pub original_name: String,
    /// Size in bytes.
    pub size: u64,
    /// Upload timestamp (RFC3339).
    pub created_at: String,
    /// Last modification timestamp (RFC3339).
    pub modified_at: String,
}

impl From<StoredFile> for StoredFileResponse {
    fn from(file: StoredFile) -> Self {
        Self {
            created_at: to_rfc3339(&file.created_at),
            modified_at: to_rfc3339(&file.modified_at),
            stored_name: file.stored_name,
            original_name: file.original_name,
            size: file.size_bytes,
        }
    }
}

/// File listing, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileListResponse {
    /// Stored files.
    pub files: Vec<StoredFileResponse>,
    /// Number of files.
    pub count: usize,
}

impl From<Vec<StoredFile>> for FileListResponse {
    fn from(files: Vec<StoredFile>) -> Self {
        let files: Vec<StoredFileResponse> = files.into_iter().map(Into::into).collect();
        Self {
            count: files.len(),
            files,
        }
    }
}

/// File upload response.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileUploadResponse {
    /// Name the file is stored under.
    pub stored_name: String,
    /// Name the client sent.
    pub original_name: String,
    /// Size in bytes.
    pub size: u64,
    /// Path to fetch the uploaded file.
    pub upload_path: String,
}

impl From<UploadedFile> for FileUploadResponse {
    fn from(file: UploadedFile) -> Self {
        Self {
            upload_path: format!("/api/files/{}", urlencoding::encode(&file.stored_name)),
            stored_name: file.stored_name,
            original_name: file.original_name,
            size: file.size,
        }
    }
}
