//! OpenAPI document for Web API.

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use super::dto::{FileListResponse, FileUploadResponse, StoredFileResponse, ZipSelectedRequest};
use super::handlers::{archive, file};

/// OpenAPI description of the file API.
///
/// JSON success bodies are wrapped as `{"data": ...}`; errors are
/// `{"error": {"code", "message", "details"?}}`.
#[derive(OpenApi)]
#[openapi(
    info(title = "filedrop", description = "File upload, listing, download and ZIP archive API"),
    paths(
        file::upload_file,
        file::list_files,
        file::get_file,
        file::get_file_info,
        file::download_file,
        file::delete_file,
        archive::zip_all,
        archive::zip_selected,
    ),
    components(schemas(
        StoredFileResponse,
        FileListResponse,
        FileUploadResponse,
        ZipSelectedRequest,
    )),
    tags(
        (name = "files", description = "Upload and retrieve stored files"),
        (name = "archives", description = "Download stored files as ZIP archives")
    )
)]
pub struct ApiDoc;

/// Create a router serving the OpenAPI document at `/api-docs/openapi.json`.
pub fn create_openapi_router() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
