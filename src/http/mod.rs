//! HTTP protocol layer module
//!
//! Response builders and cache validation, decoupled from routing.

pub mod cache;
pub mod response;

pub use response::{
    build_304_response, build_file_response, build_options_response, error_response,
    json_response, strip_body,
};
