//! `tileforge` binary: load configuration, start logging, serve games.

use tileforge::config::ServerConfig;
use tileforge::{TileforgeError, TileforgeServerBuilder};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), TileforgeError> {
    let config = ServerConfig::load()?;

    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::info!(
        listen = %config.listen,
        path = %config.path,
        seeded = config.seed.is_some(),
        "starting server"
    );

    let server = TileforgeServerBuilder::from_config(&config).build().await?;
    server
        .run_until(async {
            // A failed signal listener is treated like the signal itself.
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("interrupt received, shutting down");
        })
        .await
}
