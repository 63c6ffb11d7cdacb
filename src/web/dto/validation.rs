//! Validation utilities for Web API DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::file::archive::MAX_SELECTION;
use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// Deserializes the body as JSON, then runs `validator` over it. Malformed
/// JSON is a 400; failed validation is a 422 with per-field details.
///
/// # Example
///
/// ```ignore
/// use filedrop::web::dto::ValidatedJson;
///
/// async fn zip_selected(
///     ValidatedJson(payload): ValidatedJson<ZipSelectedRequest>,
/// ) -> Result<Response, ApiError> {
///     // payload.files is non-empty here
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

// ============================================================================
// Custom Validators
// ============================================================================

/// Validate a selection of stored names: between 1 and [`MAX_SELECTION`]
/// entries, none blank, none with control characters.
pub fn stored_names(names: &[String]) -> Result<(), validator::ValidationError> {
    if names.is_empty() || names.len() > MAX_SELECTION {
        return Err(validator::ValidationError::new("stored_names")
            .with_message(format!("Select between 1 and {MAX_SELECTION} files").into()));
    }
    if names.iter().any(|n| n.trim().is_empty()) {
        return Err(validator::ValidationError::new("stored_names")
            .with_message("File names must not be empty".into()));
    }
    if names.iter().any(|n| n.chars().any(char::is_control)) {
        return Err(validator::ValidationError::new("stored_names")
            .with_message("File names must not contain control characters".into()));
    }
    Ok(())
}
