//! Content API routes.
//!
//! Maps paths under `/api` onto the document table and the liveness probe.

use chrono::{SecondsFormat, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde_json::{json, Value};

use super::cors;
use crate::content::{ContentStore, Resource};
use crate::error::ApiError;
use crate::http;

/// A recognised API endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRoute {
    Health,
    Document(Resource),
    DomainVignettes(String),
}

impl ApiRoute {
    /// Match a request path; `None` leaves it to static files and the 404
    /// fallback.
    ///
    /// Route segments match without regard to case and one trailing slash is
    /// tolerated. The domain segment is percent-decoded and otherwise used
    /// verbatim.
    pub fn parse(path: &str) -> Option<Self> {
        let rest = cors::strip_api_prefix(path)?.strip_prefix('/')?;
        let rest = rest.strip_suffix('/').unwrap_or(rest);

        match rest.split_once('/') {
            None if rest.eq_ignore_ascii_case("health") => Some(Self::Health),
            None => Resource::from_slug(&rest.to_ascii_lowercase()).map(Self::Document),
            Some((segment, domain))
                if segment.eq_ignore_ascii_case("vignettes")
                    && !domain.is_empty()
                    && !domain.contains('/') =>
            {
                let decoded = urlencoding::decode(domain).ok()?;
                Some(Self::DomainVignettes(decoded.into_owned()))
            }
            Some(_) => None,
        }
    }
}

pub async fn serve(route: ApiRoute, content: &ContentStore) -> Result<Response<Full<Bytes>>, ApiError> {
    let body = match route {
        ApiRoute::Health => health_body(),
        ApiRoute::Document(resource) => content.load(resource).await?,
        ApiRoute::DomainVignettes(domain) => content.vignettes_for(&domain).await?,
    };
    http::json_response(StatusCode::OK, &body)
}

/// Liveness payload; touches no data files
fn health_body() -> Value {
    json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
