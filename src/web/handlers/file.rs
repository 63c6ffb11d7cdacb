//! File handlers for Web API.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::header,
    response::Response,
    Json,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::file::FileService;
use crate::web::dto::{ApiResponse, FileListResponse, FileUploadResponse, StoredFileResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Cache headers for responses that must never be reused.
pub(crate) const NO_CACHE: [(header::HeaderName, &str); 3] = [
    (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
    (header::PRAGMA, "no-cache"),
    (header::EXPIRES, "0"),
];

/// Generate a safe Content-Disposition header value.
///
/// `disposition` is `inline` or `attachment`. Control characters are removed
/// to prevent header injection, quotes and backslashes are replaced in the
/// ASCII fallback, and non-ASCII names get an RFC 5987 `filename*` parameter.
pub(crate) fn content_disposition_header(disposition: &str, filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("{disposition}; filename=\"{filename}\"");
    }

    let encoded = urlencoding::encode(filename);
    format!("{disposition}; filename=\"{sanitized}\"; filename*=UTF-8''{encoded}")
}

/// POST /api/upload - Upload a file.
///
/// Request body: multipart/form-data with a "file" field.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "files",
    responses(
        (status = 200, description = "File uploaded", body = FileUploadResponse),
        (status = 400, description = "Missing file, disallowed type, or file too large"),
        (status = 409, description = "No unique stored name could be allocated")
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<FileUploadResponse>>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        state.policy.validate_name(&filename)?;

        let mut content = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| {
            tracing::warn!("Failed to read file content: {}", e);
            ApiError::bad_request("Failed to read file")
        })? {
            state
                .policy
                .validate_size((content.len() + chunk.len()) as u64)?;
            content.extend_from_slice(&chunk);
        }

        upload = Some((filename, content));
        break;
    }

    let (filename, content) = upload.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    let service = FileService::new(&state.store, &state.policy);
    let uploaded = service.upload(&filename, &content)?;

    Ok(Json(ApiResponse::new(uploaded.into())))
}

/// GET /api/upload - Uploads must be POSTed.
pub async fn upload_method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("Method not allowed. Use POST to upload files.")
}

/// GET /api/files - List stored files, newest first.
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    responses(
        (status = 200, description = "Stored files, newest first", body = FileListResponse)
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<FileListResponse>>, ApiError> {
    let files = state.store.list()?;
    Ok(Json(ApiResponse::new(files.into())))
}

/// GET /api/files/:filename/info - Metadata for one stored file.
#[utoipa::path(
    get,
    path = "/api/files/{filename}/info",
    tag = "files",
    params(
        ("filename" = String, Path, description = "Stored name")
    ),
    responses(
        (status = 200, description = "File metadata", body = StoredFileResponse),
        (status = 400, description = "Invalid file path"),
        (status = 404, description = "File not found")
    )
)]
pub async fn get_file_info(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<ApiResponse<StoredFileResponse>>, ApiError> {
    let file = state.store.stat(&filename)?;
    Ok(Json(ApiResponse::new(file.into())))
}

/// GET /api/files/:filename - Serve a stored file inline (preview).
#[utoipa::path(
    get,
    path = "/api/files/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "Stored name")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid file path"),
        (status = 404, description = "File not found")
    )
)]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response<Body>, ApiError> {
    serve_file(&state, &filename, "inline", false).await
}

/// GET /api/download/:filename - Download a stored file.
///
/// The suggested filename is the stored name, not the original name.
#[utoipa::path(
    get,
    path = "/api/download/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "Stored name")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid file path"),
        (status = 404, description = "File not found")
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response<Body>, ApiError> {
    serve_file(&state, &filename, "attachment", true).await
}

/// DELETE /api/files/:filename - Not supported.
#[utoipa::path(
    delete,
    path = "/api/files/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "Stored name")
    ),
    responses(
        (status = 400, description = "Invalid file path"),
        (status = 501, description = "Deletion is not supported")
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.store.delete(&filename)?;
    Ok(Json(ApiResponse::new(())))
}

async fn serve_file(
    state: &AppState,
    filename: &str,
    disposition: &str,
    no_cache: bool,
) -> Result<Response<Body>, ApiError> {
    let info = state.store.stat(filename)?;
    let file = state.store.open_read(filename).await?;

    let content_type = mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string();

    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(disposition, filename),
        )
        .header(header::CONTENT_LENGTH, info.size_bytes);

    if no_cache {
        for (name, value) in NO_CACHE {
            builder = builder.header(name, value);
        }
    }

    builder
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}
