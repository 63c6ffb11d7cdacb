//! CORS middleware configuration.

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

/// Create a CORS layer from configuration.
///
/// With no configured origins any origin may call the API. Otherwise only the
/// listed origins are allowed. Origins that fail to parse are skipped; if none
/// remain the layer falls back to the permissive mode.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if parsed_origins.is_empty() {
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers(Any)
            .allow_origin(Any)
    } else {
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([CONTENT_TYPE, ACCEPT])
            .expose_headers([axum::http::header::CONTENT_DISPOSITION])
            .allow_origin(parsed_origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::util::ServiceExt;

    async fn preflight(origins: &[String], origin: &str) -> Option<String> {
        let app = Router::new()
            .route("/api/files", get(|| async { "[]" }))
            .layer(create_cors_layer(origins));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/files")
                    .header("Origin", origin)
                    .header("Access-Control-Request-Method", "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_empty_origins_allow_any() {
        let allowed = preflight(&[], "http://example.com").await;
        assert_eq!(allowed.as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn test_listed_origin_allowed() {
        let origins = vec!["http://localhost:5173".to_string()];
        let allowed = preflight(&origins, "http://localhost:5173").await;
        assert_eq!(allowed.as_deref(), Some("http://localhost:5173"));
    }

    #[tokio::test]
    async fn test_unlisted_origin_rejected() {
        let origins = vec!["http://localhost:5173".to_string()];
        let allowed = preflight(&origins, "http://evil.example").await;
        assert!(allowed.is_none());
    }

    #[tokio::test]
    async fn test_invalid_origins_fall_back_to_any() {
        let origins = vec!["not a\norigin".to_string()];
        let allowed = preflight(&origins, "http://example.com").await;
        assert_eq!(allowed.as_deref(), Some("*"));
    }
}
