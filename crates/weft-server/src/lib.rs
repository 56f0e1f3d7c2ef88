//! Reference synchronization authority for weft editors.
//!
//! Serves one shared document over a WebSocket. See [`authority`] for the
//! ordering guarantees and [`ws`] for the wire framing.

pub mod authority;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod ws;

use tokio::net::TcpListener;
use tracing::info;

pub use authority::{Authority, AuthorityHandle, Connection, ConnectionId};
pub use config::Config;
pub use error::{AuthorityError, ConfigError, ServerError, WeftError};

/// Start the authority and serve until the listener fails.
pub async fn serve(config: Config) -> Result<(), WeftError> {
    let addr = config.socket_addr()?;
    let initial = config.read_initial_document()?;

    let (authority, _task) = Authority::new(&initial)
        .with_outbound_capacity(config.outbound_capacity)
        .spawn(config.queue_capacity);
    let router = ws::router(ws::AppState { authority }, &config.socket_path);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, path = %config.socket_path, "listening");

    axum::serve(listener, router)
        .await
        .map_err(|source| ServerError::Serve { source })?;
    Ok(())
}
