//! Order gateway - Entry Point
//!
//! Reads JSON-line order instructions and acknowledgements from stdin.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Order gateway driving the order management core
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via OMS_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    oms_telemetry::init_logging()?;

    info!("Starting oms-gateway v{}", env!("CARGO_PKG_VERSION"));

    // Determine config path: CLI arg > OMS_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("OMS_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");

    let config = oms_gateway::AppConfig::load(&config_path)?;
    info!(window = %config.window, "Configuration loaded");

    let app = oms_gateway::Application::new(config)?;
    app.run().await?;

    Ok(())
}
