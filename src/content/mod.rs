//! Content module
//!
//! The documents behind the `/api` namespace: which ones exist and how they
//! are read from disk.

mod resource;
mod store;

pub use resource::Resource;
pub use store::ContentStore;
