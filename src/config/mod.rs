// Configuration module entry point
// Loads layered configuration once at startup and holds shared runtime state

mod state;
mod types;

use std::collections::HashMap;
use std::net::SocketAddr;

pub use state::AppState;
pub use types::{Config, ContentConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Default config file, looked up without extension
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Prefix for structured environment overrides (`SHELF_SERVER__PORT`, ...)
const ENV_PREFIX: &str = "SHELF";

impl Config {
    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, std::env::vars().collect())
    }

    /// Load configuration against an explicit environment map.
    ///
    /// Precedence, lowest first: defaults, config file, `SHELF_*` variables,
    /// then the deployment variables `PORT` and `VERCEL`.
    pub fn load_with_env(
        config_path: &str,
        env: HashMap<String, String>,
    ) -> Result<Self, config::ConfigError> {
        let port = env.get("PORT").cloned();
        let serverless = env.contains_key("VERCEL").then_some(true);

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env)),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.serverless", false)?
            .set_default("content.data_dir", "data")?
            .set_default("content.static_dir", "public")?
            .set_default("content.index_files", vec!["index.html"])?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.request_timeout", 30)?
            .set_override_option("server.port", port)?
            .set_override_option("server.serverless", serverless)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
