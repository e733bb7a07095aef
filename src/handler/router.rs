//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. Precedence is fixed: API routes,
//! then static files, then the JSON 404. Every path through here returns a
//! `Result`, and [`handle_request`] is the one place errors become responses.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{self, HeaderMap};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::api::{self, ApiRoute};
use super::cors;
use super::static_files;
use crate::config::AppState;
use crate::error::ApiError;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling.
///
/// Generic over the body type because no route reads the request body. This
/// is also the handler a managed host invokes directly.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    handle_request_from(req, state, None).await
}

/// Same as [`handle_request`], with the peer address for the access log
pub async fn handle_request_from<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: Option<SocketAddr>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    // No route reads the body
    let (req, _) = req.into_parts();
    let path = req.uri.path();
    let is_head = req.method == Method::HEAD;

    let response = finish(dispatch(&req, &state).await, path, is_head);

    if state.access_log_enabled() {
        log_access(&req, &response, peer_addr, started, &state);
    }

    Ok(response)
}

/// The single place a handler error becomes a JSON response.
///
/// Faults are logged here. CORS applies to any `/api` path whatever the outcome.
fn finish(
    result: Result<Response<Full<Bytes>>, ApiError>,
    path: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let mut response = match result {
        Ok(response) => response,
        Err(err) => {
            if let ApiError::Internal(message) = &err {
                logger::log_fault(message);
            }
            http::error_response(&err)
        }
    };

    if cors::is_api_path(path) {
        cors::apply_cors_headers(response.headers_mut());
    }
    if is_head {
        response = http::strip_body(response);
    }
    response
}

async fn dispatch(req: &Parts, state: &AppState) -> Result<Response<Full<Bytes>>, ApiError> {
    let path = req.uri.path();

    match req.method {
        Method::GET | Method::HEAD => {}
        Method::OPTIONS => return http::build_options_response(),
        // only reads are routed, so anything else is a route miss
        _ => {
            logger::log_debug(&format!("No route for {} {path}", req.method));
            return Err(ApiError::RouteNotFound);
        }
    }

    if let Some(route) = ApiRoute::parse(path) {
        return api::serve(route, &state.content).await;
    }

    let if_none_match = header_str(&req.headers, &header::IF_NONE_MATCH);
    let served = static_files::serve(
        &state.static_root,
        path,
        &state.config.content.index_files,
        if_none_match,
    )
    .await?;

    served.ok_or(ApiError::RouteNotFound)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn log_access(
    req: &Parts,
    response: &Response<Full<Bytes>>,
    peer_addr: Option<SocketAddr>,
    started: Instant,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.map_or_else(|| "-".to_string(), |addr| addr.ip().to_string()),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = version_label(req.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header_str(&req.headers, &header::REFERER).map(ToString::to_string);
    entry.user_agent = header_str(&req.headers, &header::USER_AGENT).map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ContentConfig, LoggingConfig, PerformanceConfig, ServerConfig};
    use crate::content::Resource;
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        data: std::path::PathBuf,
        public: std::path::PathBuf,
        state: Arc<AppState>,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let public = dir.path().join("public");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::create_dir_all(&public).unwrap();

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                workers: None,
                serverless: false,
            },
            content: ContentConfig {
                data_dir: data.to_string_lossy().into_owned(),
                static_dir: public.to_string_lossy().into_owned(),
                index_files: vec!["index.html".to_string()],
            },
            logging: LoggingConfig {
                level: "error".to_string(),
                access_log: false,
                access_log_format: "combined".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive: true,
                request_timeout: 30,
                max_connections: None,
            },
        };

        Fixture {
            _dir: dir,
            data,
            public,
            state: Arc::new(AppState::new(config)),
        }
    }

    impl Fixture {
        fn write_doc(&self, resource: Resource, contents: &str) {
            std::fs::write(self.data.join(resource.file_name()), contents).unwrap();
        }

        async fn send(&self, method: Method, path: &str) -> (StatusCode, HeaderMap, Bytes) {
            let req = Request::builder().method(method).uri(path).body(()).unwrap();
            let response = handle_request(req, Arc::clone(&self.state)).await.unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.into_body().collect().await.unwrap().to_bytes();
            (status, headers, body)
        }

        async fn get(&self, path: &str) -> (StatusCode, HeaderMap, Bytes) {
            self.send(Method::GET, path).await
        }
    }

    fn json_of(body: &Bytes) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    fn assert_cors(headers: &HeaderMap) {
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Origin, X-Requested-With, Content-Type, Accept"
        );
    }

    #[tokio::test]
    async fn test_every_document_served_verbatim() {
        let fx = fixture();
        for (i, resource) in Resource::ALL.into_iter().enumerate() {
            let raw = format!(r#"{{"resource":"{}","n":{i},"items":[{{"b":1,"a":2}}]}}"#, resource.slug());
            fx.write_doc(resource, &raw);

            let (status, headers, body) = fx.get(&format!("/api/{}", resource.slug())).await;
            assert_eq!(status, StatusCode::OK, "{resource}");
            assert_eq!(body, Bytes::from(raw), "{resource}");
            assert_cors(&headers);
        }
    }

    #[tokio::test]
    async fn test_every_missing_document_is_500() {
        let fx = fixture();
        for resource in Resource::ALL {
            let (status, headers, body) = fx.get(&format!("/api/{}", resource.slug())).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{resource}");
            let body = json_of(&body);
            assert_eq!(body["error"], format!("Failed to load {}", resource.label()));
            assert_eq!(body["code"], "load_failed");
            assert_cors(&headers);
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_500() {
        let fx = fixture();
        fx.write_doc(Resource::Mnemonics, "{\"unterminated\": ");
        let (status, _, body) = fx.get("/api/mnemonics").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_of(&body)["error"], "Failed to load mnemonics");
    }

    #[tokio::test]
    async fn test_domain_vignettes_found() {
        let fx = fixture();
        fx.write_doc(Resource::Vignettes, r#"{"cardio":["v1","v2"]}"#);
        let (status, headers, body) = fx.get("/api/vignettes/cardio").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body), json!({"domain": "cardio", "vignettes": ["v1", "v2"]}));
        assert_cors(&headers);
    }

    #[tokio::test]
    async fn test_domain_vignettes_missing_domain_is_404() {
        let fx = fixture();
        fx.write_doc(Resource::Vignettes, r#"{"cardio":["v1","v2"]}"#);
        let (status, headers, body) = fx.get("/api/vignettes/nonexistent").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json_of(&body)["error"].as_str().unwrap().contains("nonexistent"));
        assert_cors(&headers);
    }

    #[tokio::test]
    async fn test_domain_vignettes_unreadable_is_500() {
        let fx = fixture();
        let (status, _, body) = fx.get("/api/vignettes/cardio").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_of(&body)["error"], "Failed to load vignettes");
    }

    #[tokio::test]
    async fn test_health_ignores_data_files() {
        let fx = fixture();
        std::fs::remove_dir_all(&fx.data).unwrap();

        let (status, headers, body) = fx.get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        let body = json_of(&body);
        assert_eq!(body["status"], "ok");
        assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
        assert_cors(&headers);
    }

    #[tokio::test]
    async fn test_unknown_routes_are_404() {
        let fx = fixture();
        for path in ["/api/unknown", "/api", "/no/such/page.html"] {
            let (status, headers, body) = fx.get(path).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
            assert_eq!(body, Bytes::from_static(br#"{"error":"Route not found"}"#));
            assert_eq!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN), path.starts_with("/api"));
        }
    }

    #[tokio::test]
    async fn test_static_files_served_outside_api() {
        let fx = fixture();
        std::fs::write(fx.public.join("index.html"), "<h1>Shelf</h1>").unwrap();

        let (status, headers, body) = fx.get("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(body, Bytes::from_static(b"<h1>Shelf</h1>"));
        assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[tokio::test]
    async fn test_api_routes_win_over_static_files() {
        let fx = fixture();
        fx.write_doc(Resource::Domains, r#"{"from":"data"}"#);
        std::fs::create_dir_all(fx.public.join("api")).unwrap();
        std::fs::write(fx.public.join("api/domains"), "shadow").unwrap();
        std::fs::write(fx.public.join("api/readme.txt"), "docs").unwrap();

        let (_, _, body) = fx.get("/api/domains").await;
        assert_eq!(json_of(&body), json!({"from": "data"}));

        // unclaimed API paths still reach static files, with CORS
        let (status, headers, body) = fx.get("/api/readme.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Bytes::from_static(b"docs"));
        assert_cors(&headers);
    }

    #[tokio::test]
    async fn test_repeated_gets_are_identical() {
        let fx = fixture();
        fx.write_doc(Resource::Pearls, r#"{"pearls":[{"id":1,"text":"x"}],"count":1}"#);
        let (_, _, first) = fx.get("/api/pearls").await;
        for _ in 0..3 {
            let (_, _, again) = fx.get("/api/pearls").await;
            assert_eq!(again, first);
        }
    }

    #[tokio::test]
    async fn test_head_has_headers_but_no_body() {
        let fx = fixture();
        fx.write_doc(Resource::Playbook, r#"{"steps":[]}"#);
        let (status, headers, body) = fx.send(Method::HEAD, "/api/playbook").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_LENGTH], "12");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_options_preflight() {
        let fx = fixture();
        let (status, headers, _) = fx.send(Method::OPTIONS, "/api/concepts").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_cors(&headers);
    }

    #[tokio::test]
    async fn test_writes_fall_through_to_route_not_found() {
        let fx = fixture();
        fx.write_doc(Resource::Domains, r#"{"cardio":{}}"#);
        for (method, path) in [
            (Method::POST, "/api/domains"),
            (Method::PUT, "/api/vignettes/cardio"),
            (Method::DELETE, "/nope"),
        ] {
            let (status, headers, body) = fx.send(method, path).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
            assert_eq!(body, Bytes::from_static(br#"{"error":"Route not found"}"#));
            assert_eq!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN), path.starts_with("/api"));
        }
    }

    #[tokio::test]
    async fn test_route_segments_ignore_case() {
        let fx = fixture();
        fx.write_doc(Resource::Domains, r#"{"cardio":{}}"#);
        fx.write_doc(Resource::Vignettes, r#"{"cardio":["v1"]}"#);

        let (status, headers, body) = fx.get("/api/Domains").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body), json!({"cardio": {}}));
        assert_cors(&headers);

        let (status, _, body) = fx.get("/API/Vignettes/cardio").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body)["domain"], "cardio");

        // the domain value itself stays case-sensitive
        let (status, _, _) = fx.get("/api/vignettes/CARDIO").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_fault_becomes_500_with_message() {
        let response = finish(Err(ApiError::Internal("boom".to_string())), "/api/concepts", false);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(response.headers());

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(json_of(&body), json!({"error": "Internal server error", "message": "boom"}));
    }

    #[tokio::test]
    async fn test_fault_outside_api_has_no_cors() {
        let response = finish(Err(ApiError::Internal("disk".to_string())), "/app.js", true);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
        assert!(response.into_body().collect().await.unwrap().to_bytes().is_empty());
    }
}
