//! Shared fixtures: a synthetic sensor dataset and a config rooted in a
//! temporary directory.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Write as _;
use std::path::Path;

use water_sensor_guard::config::{AppConfig, ArtifactsConfig};

/// Write `n` rows shaped like the production wafer dataset: an id column,
/// ten raw sensor columns and a `Good/Bad` label (1 good, -1 faulty).
///
/// Good sensors read high on channels 1-3; every 13th row misses
/// `Sensor-4`.
pub fn write_dataset(path: &Path, n: usize, seed: u64) {
    write_rows(path, n, seed, false);
}

/// Same layout and readings as [`write_dataset`] but each label is a coin
/// flip drawn after the row's readings, so it carries no signal.
pub fn write_noise_dataset(path: &Path, n: usize, seed: u64) {
    write_rows(path, n, seed, true);
}

fn write_rows(path: &Path, n: usize, seed: u64, random_labels: bool) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut text = String::from(",Wafers");
    for i in 1..=10 {
        write!(text, ",Sensor-{i}").unwrap();
    }
    text.push_str(",Good/Bad\n");

    for row in 0..n {
        let shifted = row % 2 == 0;
        write!(text, "{row},Wafer-{row}").unwrap();
        for channel in 1..=10 {
            if channel == 4 && row % 13 == 0 {
                text.push(',');
                continue;
            }
            let mut value: f64 = rng.gen_range(0.0..100.0);
            if shifted && channel <= 3 {
                value += 80.0;
            }
            write!(text, ",{value:.4}").unwrap();
        }
        let good = if random_labels { rng.gen_bool(0.5) } else { shifted };
        writeln!(text, ",{}", if good { 1 } else { -1 }).unwrap();
    }

    std::fs::write(path, text).unwrap();
}

/// Config with every artifact under `root/artifacts`, file logging off and
/// the dataset source at `root/wafer.csv`.
pub fn test_config(root: &Path) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.artifacts = ArtifactsConfig::in_dir(root.join("artifacts"));
    cfg.ingestion.source = root.join("wafer.csv");
    cfg.logging.file_logging = false;
    cfg
}

/// Dataset written and the full training pipeline run. Returns the config.
pub fn trained(root: &Path) -> AppConfig {
    let cfg = test_config(root);
    write_dataset(&cfg.ingestion.source, 120, 11);
    water_sensor_guard::training::TrainingPipeline::new(&cfg)
        .run()
        .unwrap();
    cfg
}

/// The in-range example reading: pH 7, turbidity 5, conductivity 500, DO 8,
/// chlorine 1, nitrate 5, hardness 7, temperature 25, iron 0.1, BOD 2.
pub const EXAMPLE_READING: [f64; 10] = [7.0, 5.0, 500.0, 8.0, 1.0, 5.0, 7.0, 25.0, 0.1, 2.0];

pub fn form_body(values: &[f64]) -> String {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| format!("sensor_{}={v}", i + 1))
        .collect::<Vec<_>>()
        .join("&")
}
