//! Liquidation bot entry point.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Automated liquidation bot for derivative markets
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the liquidation loop
    Start {
        /// Configuration file path (can also be set via LIQUIDATOR_CONFIG env var)
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Print the version and exit
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Start { config } => start(config).await,
    }
}

async fn start(config: Option<String>) -> Result<()> {
    // CLI arg > LIQUIDATOR_CONFIG env var > default
    let config_path = config
        .or_else(|| std::env::var("LIQUIDATOR_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    let config = liquidator_bot::AppConfig::from_file(&config_path)?;

    liquidator_telemetry::init_logging(&config.telemetry.log_level)?;
    liquidator_telemetry::install_panic_hook();

    info!("Starting liquidator-bot v{}", env!("CARGO_PKG_VERSION"));
    info!(config_path = %config_path, ?config.mode, "Configuration loaded");

    let settings = config.validate()?;
    let app = liquidator_bot::Application::new(settings)?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                signal_token.cancel();
            }
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    app.run(shutdown).await?;
    info!("Liquidator stopped");
    Ok(())
}
