//! Request handler module
//!
//! Routing for the content API, the cross-origin step for `/api`, and static
//! file serving for everything else.

pub mod api;
pub mod cors;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::{handle_request, handle_request_from};
