//! Read-only HTTP service for pediatrics shelf-exam study content.
//!
//! `/api/*` serves pre-generated JSON documents from a data directory, read
//! fresh on every request. Every other path is served from a static root.
//! [`handle_request`] is the complete request handler; the binary only adds a
//! listener around it.

pub mod config;
pub mod content;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::{AppState, Config};
pub use error::{ApiError, LoadError};
pub use handler::handle_request;
