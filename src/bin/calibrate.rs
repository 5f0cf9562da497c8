//! Recompute the calibration artifact from a training CSV.
//!
//! ```bash
//! calibrate --train-csv artifacts/train.csv --output artifacts/calibration_params.json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use water_sensor_guard::calibration;
use water_sensor_guard::config::AppConfig;
use water_sensor_guard::logging;

#[derive(Parser, Debug)]
#[command(name = "calibrate")]
#[command(about = "Compute per-channel calibration parameters from training data")]
struct Args {
    /// Training CSV (default: the configured train split)
    #[arg(long)]
    train_csv: Option<PathBuf>,

    /// Output JSON (default: the configured calibration artifact)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = match &args.config {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::load(),
    };
    logging::init(&cfg.logging).context("Failed to initialize logging")?;

    let train_csv = args.train_csv.unwrap_or_else(|| cfg.artifacts.train_path());
    let output = args.output.unwrap_or_else(|| cfg.artifacts.calibration_path());

    let table = calibration::calibrate_from_csv(&train_csv, &output)
        .with_context(|| format!("Calibration from {} failed", train_csv.display()))?;

    info!(
        channels = table.len(),
        output = %output.display(),
        "Calibration params saved"
    );
    Ok(())
}
