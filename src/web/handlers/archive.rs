//! ZIP archive handlers for Web API.

use axum::{body::Body, extract::State, http::header, response::Response};
use chrono::Utc;
use std::sync::Arc;

use crate::file::{zip_stream, ArchiveRequest};
use crate::web::dto::{ValidatedJson, ZipSelectedRequest};
use crate::web::error::ApiError;
use crate::web::handlers::file::{content_disposition_header, NO_CACHE};
use crate::web::handlers::AppState;

/// GET /api/zip-all - Download every stored file as one ZIP.
#[utoipa::path(
    get,
    path = "/api/zip-all",
    tag = "archives",
    responses(
        (status = 200, description = "ZIP archive", content_type = "application/zip"),
        (status = 404, description = "No files to archive")
    )
)]
pub async fn zip_all(State(state): State<Arc<AppState>>) -> Result<Response<Body>, ApiError> {
    zip_response(&state, ArchiveRequest::All)
}

/// POST /api/zip-selected - Download the selected stored files as one ZIP.
#[utoipa::path(
    post,
    path = "/api/zip-selected",
    tag = "archives",
    request_body = ZipSelectedRequest,
    responses(
        (status = 200, description = "ZIP archive", content_type = "application/zip"),
        (status = 400, description = "Malformed body, invalid file name, or a name selected twice"),
        (status = 404, description = "A selected file does not exist"),
        (status = 422, description = "Empty or oversized selection")
    )
)]
pub async fn zip_selected(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ZipSelectedRequest>,
) -> Result<Response<Body>, ApiError> {
    zip_response(&state, ArchiveRequest::Selected(req.files))
}

/// Resolve the request up front, then stream the archive.
///
/// Everything that can be reported as a JSON error (empty store, missing
/// selection entry) fails here, before the response status is committed.
fn zip_response(state: &AppState, request: ArchiveRequest) -> Result<Response<Body>, ApiError> {
    let entries = request.entries(&state.store)?;
    let filename = request.file_name(entries.len(), Utc::now());

    tracing::info!(
        archive = %filename,
        entries = entries.len(),
        "Streaming archive"
    );

    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header("attachment", &filename),
        );
    for (name, value) in NO_CACHE {
        builder = builder.header(name, value);
    }

    let body = Body::from_stream(zip_stream(state.store.clone(), entries));
    builder.body(body).map_err(|e| {
        tracing::error!("Failed to build response: {}", e);
        ApiError::internal("Failed to build response")
    })
}
