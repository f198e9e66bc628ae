use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::{AcceptErrorPolicy, Config};
use crate::http::connection::Connection;
use crate::http::router::Router;

/// Pause after a skipped accept failure. Keeps a persistent error such as
/// EMFILE from spinning the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Binds the configured address and serves until an accept error ends the
/// loop. A bind failure is returned immediately.
pub async fn run(cfg: &Config, router: Arc<Router>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.listen_addr))?;
    info!("Listening on {}", cfg.listen_addr);

    serve(listener, cfg, router).await
}

/// Accepts connections forever, one task per connection.
///
/// The loop never waits on a connection task. What happens on a failed
/// accept is decided by `cfg.accept_errors`.
pub async fn serve(listener: TcpListener, cfg: &Config, router: Arc<Router>) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                on_accept_error(cfg.accept_errors, e).await?;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let conn = Connection::new(socket, Arc::clone(&router))
            .with_buffer_size(cfg.read_buffer_size)
            .with_read_timeout(cfg.read_timeout());

        tokio::spawn(async move {
            if let Err(e) = conn.run().await {
                error!("Connection error from {}: {:#}", peer, e);
            }
        });
    }
}

/// `Ok` means keep accepting; `Err` stops the loop.
async fn on_accept_error(policy: AcceptErrorPolicy, e: io::Error) -> anyhow::Result<()> {
    match policy {
        AcceptErrorPolicy::Exit => Err(e).context("failed to accept connection"),
        AcceptErrorPolicy::Skip => {
            warn!(error = %e, "Failed to accept connection");
            tokio::time::sleep(ACCEPT_BACKOFF).await;
            Ok(())
        }
    }
}
