//! Web API module for filedrop.
//!
//! This module exposes the file store over HTTP: multipart upload, listing,
//! inline preview, download, and streamed ZIP archives.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
