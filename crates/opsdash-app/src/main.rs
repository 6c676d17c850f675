//! Operations dashboard synchronization engine - entry point.

use anyhow::Result;
use clap::Parser;
use opsdash_notify::LogDialog;
use std::sync::Arc;
use tracing::info;

/// Trading-bot operations dashboard synchronization engine
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via OPSDASH_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the backend base URL from the config file
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize TLS crypto provider (must be before any WS connections)
    opsdash_push::init_crypto();

    let args = Args::parse();

    opsdash_telemetry::init_logging()?;

    info!("Starting opsdash v{}", env!("CARGO_PKG_VERSION"));

    // Determine config path: CLI arg > OPSDASH_CONFIG env var > default
    let mut config = match args
        .config
        .or_else(|| std::env::var("OPSDASH_CONFIG").ok())
    {
        Some(path) => {
            info!(config_path = %path, "Loading configuration");
            opsdash_app::AppConfig::from_file(&path)?
        }
        None => opsdash_app::AppConfig::load()?,
    };

    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    info!(base_url = %config.base_url, push_url = %config.push_url, "Configuration loaded");

    // Headless dialog surface: alerts go to the log, confirms decline, so an
    // unattended run never fires destructive actions.
    let dialog = Arc::new(LogDialog::default());
    let app = opsdash_app::App::new(config, dialog.clone(), dialog)?;

    app.run().await?;

    Ok(())
}
