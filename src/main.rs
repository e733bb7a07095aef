use std::sync::Arc;

use shelf_server::config::{AppState, Config, DEFAULT_CONFIG_PATH};
use shelf_server::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    if cfg.server.serverless {
        // The platform calls `shelf_server::handle_request` itself
        logger::log_serverless_mode();
        return Ok(());
    }

    // One event loop unless worker threads are configured
    let runtime = match cfg.server.workers {
        Some(workers) => tokio::runtime::Builder::new_multi_thread()
            .worker_threads(workers)
            .enable_all()
            .build()?,
        None => tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?,
    };

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;
    let local_addr = listener.local_addr()?;

    if !std::path::Path::new(&cfg.content.data_dir).is_dir() {
        logger::log_warning(&format!(
            "Data directory '{}' does not exist; content endpoints will return 500",
            cfg.content.data_dir
        ));
    }

    logger::log_server_start(&local_addr, &cfg);
    let state = Arc::new(AppState::new(cfg));

    server::run(listener, state, server::signal::shutdown_signal()).await;
    logger::log_info("Server stopped");
    Ok(())
}
