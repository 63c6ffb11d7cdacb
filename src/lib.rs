//! filedrop - a small file drop service
//!
//! Uploads are stored flat on disk under reversible, timestamped names and
//! can be listed, previewed, downloaded, or fetched together as a streamed
//! ZIP archive over an HTTP API.

pub mod config;
pub mod datetime;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use error::{FiledropError, Result};
pub use file::{FileService, FileStore, StoredFile, UploadPolicy, UploadedFile};
pub use web::{create_router, AppState, WebServer};
