//! Cross-origin headers for the `/api` namespace.

use hyper::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN,
};

const API_PREFIX: &str = "/api";

const ALLOWED_HEADERS: &str = "Origin, X-Requested-With, Content-Type, Accept";

/// What follows the `/api` prefix, matched without regard to case.
///
/// `None` when the path is outside the namespace (`/apis` is outside).
pub fn strip_api_prefix(path: &str) -> Option<&str> {
    let head = path.get(..API_PREFIX.len())?;
    let rest = path.get(API_PREFIX.len()..)?;
    (head.eq_ignore_ascii_case(API_PREFIX) && (rest.is_empty() || rest.starts_with('/')))
        .then_some(rest)
}

/// `/api` itself or anything below it
pub fn is_api_path(path: &str) -> bool {
    strip_api_prefix(path).is_some()
}

/// Allow cross-origin reads from any origin.
///
/// Applied to every API response whatever produced it, errors included.
pub fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
}
