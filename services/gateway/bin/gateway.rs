//! Main Entrypoint for the Voice Bridge Gateway
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Handing over to `app::run`, which authenticates, connects to the audio
//!    WebSocket and serves it until it closes.

use anyhow::Context;
use tracing::info;
use voxbridge_gateway::{app, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded.");

    // --- 3. Run the Bridge ---
    app::run(config).await
}
