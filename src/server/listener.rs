use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::config::Config;
use crate::http::connection::Connection;
use crate::server::dispatcher::ContentHandler;
use crate::settings::Settings;

/// Binds every configured listen address and serves connections until one of
/// the accept loops fails to bind or the task is cancelled.
pub async fn run(
    settings: Settings,
    config: Arc<Config>,
    handler: Arc<dyn ContentHandler>,
) -> anyhow::Result<()> {
    let mut loops = JoinSet::new();

    for addr in &settings.listen_addrs {
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {}", addr);
        loops.spawn(accept_loop(
            listener,
            config.clone(),
            handler.clone(),
            settings.read_timeout,
        ));
    }

    while let Some(res) = loops.join_next().await {
        res??;
    }

    Ok(())
}

async fn accept_loop(
    listener: TcpListener,
    config: Arc<Config>,
    handler: Arc<dyn ContentHandler>,
    read_timeout: Duration,
) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                // Transient accept failures (out of descriptors, reset
                // before accept) must not take the process down.
                error!(error = %e, "accept failed");
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let config = config.clone();
        let handler = handler.clone();
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, config, handler, read_timeout);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
