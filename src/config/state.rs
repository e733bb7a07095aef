// Application state module
// Immutable per-process state shared by every connection

use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;

use super::types::Config;
use crate::content::ContentStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub content: ContentStore,
    pub static_root: PathBuf,
    /// Connections currently being served
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let content = ContentStore::new(&config.content.data_dir);
        let static_root = PathBuf::from(&config.content.static_dir);
        Self {
            config,
            content,
            static_root,
            active_connections: AtomicUsize::new(0),
        }
    }

    /// Whether one access-log line should be written per request
    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
