//! Run the full training pipeline: ingestion, calibration, preprocessing
//! and model selection.
//!
//! ```bash
//! train --source data/wafer.csv
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use water_sensor_guard::config::AppConfig;
use water_sensor_guard::logging;
use water_sensor_guard::training::TrainingPipeline;

#[derive(Parser, Debug)]
#[command(name = "train")]
#[command(about = "Train and persist the sensor fault classifier")]
struct Args {
    /// Raw dataset CSV (default: ingestion.source from config)
    #[arg(long)]
    source: Option<PathBuf>,

    /// Recompute calibration from the new train split even if the artifact exists
    #[arg(long)]
    recalibrate: bool,

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

    let source = args.source.unwrap_or_else(|| cfg.ingestion.source.clone());
    let pipeline = TrainingPipeline::new(&cfg).recalibrate(args.recalibrate);

    let summary = match pipeline.run_from(&source) {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Training pipeline failed");
            return Err(e).context("Training failed");
        }
    };

    for report in &summary.outcome.reports {
        info!(
            model = %report.family,
            test_accuracy = report.test_accuracy,
            "Model report"
        );
    }
    info!(
        model = %summary.outcome.best.family,
        accuracy = summary.outcome.accuracy(),
        path = %summary.outcome.model_path.display(),
        "Training complete"
    );
    Ok(())
}
