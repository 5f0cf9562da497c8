//! Dataset handling: CSV reading, named-column frames, train/test ingestion
//! and separation of features from labels.

mod csv;
mod frame;
pub mod ingestion;

pub use self::csv::{parse_csv, read_csv};
pub use frame::SensorFrame;
pub use ingestion::{DataIngestion, IngestionOutput};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or reshaping data.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error ({}): {1}", .0.display())]
    Io(PathBuf, std::io::Error),
    #[error("dataset is empty")]
    Empty,
    #[error("missing column '{0}'")]
    MissingColumn(String),
    #[error("row {row} has {found} values, expected {expected}")]
    RowWidth { row: usize, expected: usize, found: usize },
    #[error("invalid label {value} in row {row}: labels must be integers")]
    InvalidLabel { row: usize, value: f64 },
    #[error("need at least {needed} rows, found {found}")]
    TooFewRows { needed: usize, found: usize },
}

/// Feature frame plus integer class labels, row-aligned.
#[derive(Debug, Clone)]
pub struct LabeledDataset {
    pub features: SensorFrame,
    pub labels: Vec<i64>,
}

impl LabeledDataset {
    /// Split a frame into `feature_columns` and the integer `target` column.
    ///
    /// `drop_columns` are removed first when present; a missing target or
    /// feature column is an error.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_frame(
        frame: &SensorFrame,
        target: &str,
        drop_columns: &[String],
        feature_columns: &[String],
    ) -> Result<Self, DatasetError> {
        let labels = frame
            .column(target)?
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                if v.is_finite() && v.fract() == 0.0 {
                    Ok(v as i64)
                } else {
                    Err(DatasetError::InvalidLabel { row, value: v })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut dropped: Vec<String> = drop_columns.to_vec();
        dropped.push(target.to_string());
        let features = frame.drop_columns(&dropped).select(feature_columns)?;

        Ok(Self { features, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_frame_splits_labels() {
        let frame = parse_csv("Wafers,Sensor-1,Sensor-2,Good/Bad\nW1,1,2,1\nW2,3,,-1\n").unwrap();
        let ds = LabeledDataset::from_frame(
            &frame,
            "Good/Bad",
            &["Wafers".to_string()],
            &["Sensor-1".to_string(), "Sensor-2".to_string()],
        )
        .unwrap();
        assert_eq!(ds.labels, vec![1, -1]);
        assert_eq!(ds.features.n_cols(), 2);
        assert!(ds.features.rows()[1][1].is_nan());
    }

    #[test]
    fn test_missing_target_is_error() {
        let frame = parse_csv("Sensor-1\n1\n").unwrap();
        let err = LabeledDataset::from_frame(&frame, "Good/Bad", &[], &[]).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(_)));
    }

    #[test]
    fn test_missing_label_value_is_error() {
        let frame = parse_csv("Sensor-1,Good/Bad\n1,\n").unwrap();
        let err = LabeledDataset::from_frame(&frame, "Good/Bad", &[], &["Sensor-1".to_string()]).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidLabel { row: 0, .. }));
    }
}
