//! Water Sensor Guard web server
//!
//! # Usage
//!
//! ```bash
//! # Serve the prediction form on the configured address (default 0.0.0.0:5000)
//! cargo run --release
//!
//! # Custom bind address and config file
//! ./water-sensor-guard --addr 127.0.0.1:8080 --config sensor_guard.toml
//! ```
//!
//! # Environment Variables
//!
//! - `SENSOR_GUARD_CONFIG`: Path to the TOML config file
//! - `SENSOR_GUARD_ADDR`: Bind address (overridden by `--addr`)
//! - `SENSOR_GUARD_CORS_ORIGINS`: Comma-separated allowed origins
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use water_sensor_guard::api::{create_app, WebState};
use water_sensor_guard::config::{self, AppConfig};
use water_sensor_guard::logging;

#[derive(Parser, Debug)]
#[command(name = "water-sensor-guard")]
#[command(about = "Water-quality sensor fault detection web service")]
#[command(version)]
struct CliArgs {
    /// HTTP bind address (HOST:PORT)
    #[arg(short, long, env = "SENSOR_GUARD_ADDR")]
    addr: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("Ctrl+C handler unavailable, shutdown only on process exit");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let app_config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::load(),
    };

    let log_path = logging::init(&app_config.logging).context("Failed to initialize logging")?;
    if let Some(path) = log_path {
        info!(path = %path.display(), "Logging to file");
    }

    let server_addr = args.addr.clone().unwrap_or_else(|| app_config.server.addr.clone());
    config::init(app_config);
    let cfg = config::get();

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  Water Sensor Guard");
    info!("  Sensor fault detection service");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!(dir = %cfg.artifacts.dir.display(), "Artifacts directory");

    for (name, path) in [
        ("preprocessor", cfg.artifacts.preprocessor_path()),
        ("model", cfg.artifacts.model_path()),
    ] {
        if !path.exists() {
            warn!(artifact = name, path = %path.display(), "Artifact missing, predictions will fail until training runs");
        }
    }

    let app = create_app(WebState::from_config(cfg));
    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind {server_addr}"))?;
    info!(addr = %server_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Graceful shutdown complete");
    Ok(())
}
