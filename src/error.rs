//! Error types for content loading and request handling.
//!
//! Every API handler returns `Result<_, ApiError>`; the request boundary in
//! [`crate::handler::handle_request`] turns the error into a JSON response.

use hyper::StatusCode;
use serde_json::{json, Value};
use std::path::PathBuf;
use thiserror::Error;

use crate::content::Resource;

/// Why a backing document could not be produced
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to load {}", .resource.label())]
    Load {
        resource: Resource,
        #[source]
        source: LoadError,
    },

    #[error("Domain '{0}' not found")]
    DomainNotFound(String),

    #[error("Route not found")]
    RouteNotFound,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Load { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::DomainNotFound(_) | Self::RouteNotFound => StatusCode::NOT_FOUND,
        }
    }

    /// JSON body sent to the client; never carries file paths or causes
    /// except for the message of an internal fault
    pub fn body(&self) -> Value {
        match self {
            Self::Load { resource, .. } => json!({
                "error": self.to_string(),
                "code": "load_failed",
                "resource": resource.slug(),
            }),
            Self::DomainNotFound(domain) => json!({
                "error": self.to_string(),
                "code": "domain_not_found",
                "domain": domain,
            }),
            Self::RouteNotFound => json!({ "error": self.to_string() }),
            Self::Internal(message) => json!({
                "error": "Internal server error",
                "message": message,
            }),
        }
    }
}

impl From<hyper::http::Error> for ApiError {
    fn from(err: hyper::http::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
