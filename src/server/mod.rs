//! Server module
//!
//! Listener setup, the accept loop, per-connection serving and shutdown.

pub mod connection;
pub mod listener;
pub mod signal;

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

pub use listener::create_listener;

/// Accept connections until `shutdown` resolves.
///
/// Accept errors (e.g. descriptor exhaustion) are logged and the loop keeps
/// going; only the shutdown future ends it.
pub async fn run<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = &'static str>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(stream, peer_addr, &state);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            reason = &mut shutdown => {
                logger::log_shutdown(reason);
                return;
            }
        }
    }
}
