//! HTTP response building module
//!
//! Builders for the responses the server sends, independent of routing.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use serde_json::Value;

use crate::error::ApiError;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Serialize `body` as compact JSON
pub fn json_response(status: StatusCode, body: &Value) -> Result<Response<Full<Bytes>>, ApiError> {
    let json = serde_json::to_vec(body)?;
    let response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
        .header(header::CONTENT_LENGTH, json.len())
        .body(Full::new(Bytes::from(json)))?;
    Ok(response)
}

/// Build the response for a failed request.
///
/// Infallible: headers are static and the body is a `Value` we built, so a
/// serialization failure falls back to a fixed body.
pub fn error_response(err: &ApiError) -> Response<Full<Bytes>> {
    let json = serde_json::to_vec(&err.body()).unwrap_or_else(|e| {
        log_build_error(err.status(), &e);
        br#"{"error":"Internal server error"}"#.to_vec()
    });
    let content_length = HeaderValue::from(json.len());

    let mut response = Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = err.status();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    headers.insert(header::CONTENT_LENGTH, content_length);
    response
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response() -> Result<Response<Full<Bytes>>, ApiError> {
    let response = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(header::ALLOW, "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::new()))?;
    Ok(response)
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str) -> Result<Response<Full<Bytes>>, ApiError> {
    let response = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(header::ETAG, etag)
        .header(header::CACHE_CONTROL, "public, max-age=0")
        .body(Full::new(Bytes::new()))?;
    Ok(response)
}

/// Build a static file response
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    etag: &str,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, data.len())
        .header(header::ETAG, etag)
        .header(header::CACHE_CONTROL, "public, max-age=0")
        .body(Full::new(data))?;
    Ok(response)
}

/// Drop the body of a response to a HEAD request, keeping its headers
pub fn strip_body(response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    let (parts, _) = response.into_parts();
    Response::from_parts(parts, Full::new(Bytes::new()))
}

fn log_build_error(status: StatusCode, error: &impl std::fmt::Display) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
