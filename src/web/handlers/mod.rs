//! API handlers for the web front-end.

pub mod archive;
pub mod file;

pub use archive::*;
pub use file::*;

use crate::config::FilesConfig;
use crate::file::{FileStore, UploadPolicy};

/// Shared state for every handler.
///
/// Holds no file index; handlers always go to the store on disk.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The upload store.
    pub store: FileStore,
    /// Upload policy (size limit, allowed extensions).
    pub policy: UploadPolicy,
}

impl AppState {
    /// Create a new application state.
    pub fn new(store: FileStore, policy: UploadPolicy) -> Self {
        Self { store, policy }
    }

    /// Build the state from the `[files]` config section.
    pub fn from_config(config: &FilesConfig) -> Self {
        Self::new(
            FileStore::new(&config.storage_path),
            UploadPolicy::from_config(config),
        )
    }
}
