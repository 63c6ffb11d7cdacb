//! File storage module for filedrop.
//!
//! This module provides the upload core:
//! - Date-based, reversible stored names
//! - A flat directory store with traversal-safe name resolution
//! - Streamed ZIP archives of stored files
//! - The upload policy and service

pub mod archive;
pub mod naming;
mod service;
mod store;

pub use archive::{build_zip, zip_stream, ArchiveEntry, ArchiveRequest};
pub use naming::{decode, encode, ParsedName};
pub use service::{FileService, UploadPolicy, UploadedFile, MAX_ORIGINAL_NAME_BYTES};
pub use store::{FileStore, StoredFile};
