//! Affirmation Mixer (amx-mixer) - Main entry point
//!
//! Serves `POST /generate-audio`: stages remote assets, mixes them, and
//! publishes the MP3 to the configured storage backend.

use std::path::PathBuf;
use std::sync::Arc;

use amx_common::config::TomlConfig;
use amx_mixer::api::{server, AppContext};
use amx_mixer::config::Config;
use amx_mixer::stager::HttpStager;
use amx_mixer::{publisher, Pipeline};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for amx-mixer
#[derive(Parser, Debug)]
#[command(name = "amx-mixer")]
#[command(about = "Affirmation audio mixing service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "AMX_PORT")]
    port: Option<u16>,

    /// Path to TOML configuration file
    #[arg(short, long, env = "AMX_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Tracing is not up yet; config errors surface through the returned error
    let toml = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let config = Config::new(toml, args.port).context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting AMX Mixer (amx-mixer) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!(
        "Storage backend: {:?}, key prefix: {}",
        config.toml.storage.backend, config.toml.storage.key_prefix
    );

    let stager = Arc::new(HttpStager::new(&config.toml.fetch).context("Failed to create stager")?);
    let publisher =
        publisher::from_config(&config.toml.storage).context("Failed to create publisher")?;
    let pipeline = Pipeline::new(stager, publisher, config.pipeline_settings())
        .context("Failed to create pipeline")?;

    server::run(&config, AppContext::new(pipeline), shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
