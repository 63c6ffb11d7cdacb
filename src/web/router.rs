//! Router configuration for Web API.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::handlers::{
    delete_file, download_file, get_file, get_file_info, list_files, upload_file,
    upload_method_not_allowed, zip_all, zip_selected, AppState,
};
use super::middleware::{create_cors_layer, security_headers};
use super::openapi::create_openapi_router;
use crate::config::WebConfig;

/// Room for multipart framing on top of the largest accepted file.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create the main API router.
///
/// Includes the health check and the OpenAPI document. Static front-end
/// serving is added separately by [`create_static_router`].
pub fn create_router(app_state: Arc<AppState>, web_config: &WebConfig) -> Router {
    let body_limit = usize::try_from(app_state.policy.max_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let file_routes = Router::new()
        .route("/upload", post(upload_file).get(upload_method_not_allowed))
        .route("/files", get(list_files))
        .route("/files/:filename", get(get_file).delete(delete_file))
        .route("/files/:filename/info", get(get_file_info))
        .route("/download/:filename", get(download_file));

    let archive_routes = Router::new()
        .route("/zip-all", get(zip_all))
        .route("/zip-selected", post(zip_selected));

    let api_routes = Router::new()
        .merge(file_routes)
        .merge(archive_routes)
        .fallback(api_not_found)
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        .nest("/api", api_routes)
        .with_state(app_state)
        .merge(create_health_router())
        .merge(create_openapi_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&web_config.cors_origins))
                .layer(middleware::from_fn(security_headers)),
        )
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create a router serving the built front-end.
///
/// Unknown paths fall back to `index.html` so client-side routes work.
/// Returns `None` if the directory does not exist.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    let root = Path::new(static_path);
    if !root.is_dir() {
        tracing::warn!("Static file directory not found: {}", static_path);
        return None;
    }

    let serve_dir = ServeDir::new(root).fallback(ServeFile::new(root.join("index.html")));
    tracing::info!("Serving static files from: {}", static_path);

    Some(Router::new().fallback_service(serve_dir))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Unknown `/api` paths get a JSON 404 instead of the front-end.
async fn api_not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}
