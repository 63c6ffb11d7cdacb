//! Security headers middleware.

use axum::{
    body::Body,
    http::{header, header::HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Policy for stored files rendered inline. Uploaded content never runs
/// scripts in the app's origin.
const INLINE_FILE_CSP: &str = "default-src 'none'; img-src 'self'; style-src 'unsafe-inline'; sandbox";

/// Security headers middleware.
///
/// Adds to every response:
/// - X-Content-Type-Options: nosniff
/// - X-Frame-Options: SAMEORIGIN (the front-end previews files in a frame)
/// - Referrer-Policy: no-referrer
///
/// JSON responses without a Cache-Control get `no-store`. Responses served
/// with an `inline` Content-Disposition get a sandboxing CSP.
pub async fn security_headers(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json && !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    let is_inline = headers
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("inline"));
    if is_inline {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(INLINE_FILE_CSP),
        );
    }

    response
}
