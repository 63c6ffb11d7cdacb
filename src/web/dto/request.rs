//! Request DTOs for Web API.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::validation::stored_names;

/// Body of `POST /api/zip-selected`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ZipSelectedRequest {
    /// Stored names to include, in archive order.
    #[validate(custom(function = "stored_names"))]
    pub files: Vec<String>,
}
