use std::sync::Arc;

use rampart::config;
use rampart::server::dispatcher::{ContentHandler, PlaceholderHandler};
use rampart::server::listener;
use rampart::settings::Settings;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: rampart <config-file>"))?;

    // A broken configuration aborts here, before any socket is bound.
    let cfg = Arc::new(config::parse_file(&config_path)?);

    let settings = Settings::load();
    let handler: Arc<dyn ContentHandler> = Arc::new(PlaceholderHandler);

    tokio::select! {
        res = listener::run(settings, cfg, handler) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
