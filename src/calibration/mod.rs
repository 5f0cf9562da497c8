//! Calibration computation and storage
//!
//! Pairs the observed raw range of every channel in the training data with
//! the channel's fixed physical target range. The resulting table drives the
//! rescale step of the preprocessing pipeline and the labels on the web form.

use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::dataset::{read_csv, DatasetError, SensorFrame};
use crate::storage::{load_json, save_json, ArtifactError};
use crate::types::{CalibrationEntry, CalibrationTable, CHANNELS};

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Compute the calibration table from a training frame.
///
/// Missing values are ignored when taking min/max. A missing channel column
/// is fatal; a channel without any finite value gets a degenerate 0/0
/// observed range so rescaling yields its target minimum.
pub fn compute_calibration(frame: &SensorFrame) -> Result<CalibrationTable, CalibrationError> {
    let mut entries = Vec::with_capacity(CHANNELS.len());

    for channel in &CHANNELS {
        let values = frame.column(channel.column)?;
        let (xmin, xmax) = finite_min_max(&values).unwrap_or_else(|| {
            warn!(channel = channel.column, "Channel has no finite values, using degenerate range");
            (0.0, 0.0)
        });

        entries.push(CalibrationEntry {
            channel: channel.column.to_string(),
            xmin,
            xmax,
            ymin: channel.target_min,
            ymax: channel.target_max,
        });
    }

    Ok(CalibrationTable::new(entries))
}

/// Read a training CSV, compute its calibration and persist it to `output`.
pub fn calibrate_from_csv(train_csv: &Path, output: &Path) -> Result<CalibrationTable, CalibrationError> {
    let frame = read_csv(train_csv)?;
    let table = compute_calibration(&frame)?;
    for e in &table.entries {
        info!(
            channel = %e.channel,
            xmin = e.xmin,
            xmax = e.xmax,
            ymin = e.ymin,
            ymax = e.ymax,
            "Calibration computed"
        );
    }
    save(&table, output)?;
    Ok(table)
}

pub fn save(table: &CalibrationTable, path: &Path) -> Result<(), ArtifactError> {
    save_json(table, path)
}

pub fn load(path: &Path) -> Result<CalibrationTable, ArtifactError> {
    load_json(path)
}

/// Form labels for the ten channels: `"<property> (<ymin> - <ymax>)"`, bounds
/// always printed with a decimal point (`pH (0.0 - 14.0)`).
///
/// Falls back to `Sensor-N` for any channel the table does not cover.
pub fn sensor_labels(table: Option<&CalibrationTable>) -> Vec<String> {
    CHANNELS
        .iter()
        .map(|c| match table.and_then(|t| t.get(c.column)) {
            Some(e) => format!("{} ({:?} - {:?})", c.property, e.ymin, e.ymax),
            None => c.column.to_string(),
        })
        .collect()
}

/// Load form labels from the calibration artifact, falling back to
/// `Sensor-N` labels when it is missing or unreadable.
pub fn load_sensor_labels(path: &Path) -> Vec<String> {
    match load(path) {
        Ok(table) => sensor_labels(Some(&table)),
        Err(e) => {
            warn!(error = %e, "Error loading calibration params, using default labels");
            sensor_labels(None)
        }
    }
}

fn finite_min_max(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse_csv;

    fn training_csv() -> String {
        let mut header: Vec<String> = CHANNELS.iter().map(|c| c.column.to_string()).collect();
        header.push("Good/Bad".to_string());
        let mut text = header.join(",") + "\n";
        text.push_str("1,10,100,5,0.5,3,7,20,1,2,1\n");
        text.push_str("3,,300,5,1.5,9,8,40,3,4,-1\n");
        text.push_str("2,20,200,5,1.0,6,NaN,30,2,3,1\n");
        text
    }

    #[test]
    fn test_observed_ranges_skip_missing() {
        let frame = parse_csv(&training_csv()).unwrap();
        let table = compute_calibration(&frame).unwrap();
        assert_eq!(table.len(), 10);

        let s2 = table.get("Sensor-2").unwrap();
        assert_eq!((s2.xmin, s2.xmax), (10.0, 20.0));
        assert_eq!((s2.ymin, s2.ymax), (0.0, 100.0));

        let s7 = table.get("Sensor-7").unwrap();
        assert_eq!((s7.xmin, s7.xmax), (7.0, 8.0));
    }

    #[test]
    fn test_rescale_endpoints_for_every_channel() {
        let frame = parse_csv(&training_csv()).unwrap();
        let table = compute_calibration(&frame).unwrap();
        for e in &table.entries {
            if e.is_degenerate() {
                assert_eq!(e.rescale(e.xmin), e.ymin);
            } else {
                assert!((e.rescale(e.xmin) - e.ymin).abs() < 1e-9, "{}", e.channel);
                assert!((e.rescale(e.xmax) - e.ymax).abs() < 1e-9, "{}", e.channel);
            }
        }
        // Sensor-4 is constant in the fixture
        assert!(table.get("Sensor-4").unwrap().is_degenerate());
    }

    #[test]
    fn test_missing_channel_is_fatal() {
        let frame = parse_csv("Sensor-1,Good/Bad\n1,1\n").unwrap();
        let err = compute_calibration(&frame).unwrap_err();
        assert!(matches!(err, CalibrationError::Dataset(DatasetError::MissingColumn(_))));
    }

    #[test]
    fn test_calibrate_from_csv_persists() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("train.csv");
        let out = dir.path().join("calibration_params.json");
        std::fs::write(&csv, training_csv()).unwrap();

        let table = calibrate_from_csv(&csv, &out).unwrap();
        assert_eq!(load(&out).unwrap(), table);
    }

    #[test]
    fn test_sensor_labels() {
        let frame = parse_csv(&training_csv()).unwrap();
        let table = compute_calibration(&frame).unwrap();
        let labels = sensor_labels(Some(&table));
        assert_eq!(labels[0], "pH (0.0 - 14.0)");
        assert_eq!(labels[3], "Dissolved Oxygen (0.0 - 50.0)");

        let fallback = sensor_labels(None);
        assert_eq!(fallback[9], "Sensor-10");
    }

    #[test]
    fn test_labels_fall_back_when_artifact_missing() {
        let dir = tempfile::tempdir().unwrap();
        let labels = load_sensor_labels(&dir.path().join("absent.json"));
        assert_eq!(labels[0], "Sensor-1");
    }
}
