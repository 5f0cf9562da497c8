//! The fitted preprocessing chain: rescale → KNN impute → robust scale.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{KnnImputer, PipelineError, RescaleTransform, RobustScaler};
use crate::dataset::SensorFrame;
use crate::storage::{load_json, save_json, ArtifactError};
use crate::types::CalibrationTable;

/// Ordered preprocessing steps, fit on training data only and persisted as
/// a single artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessingPipeline {
    rescale: RescaleTransform,
    imputer: KnnImputer,
    scaler: RobustScaler,
}

impl PreprocessingPipeline {
    /// Unfitted pipeline reading calibration from `calibration_path`.
    pub fn new(calibration_path: impl Into<PathBuf>, knn_neighbors: usize) -> Self {
        info!(knn_neighbors, "Preprocessing pipeline created");
        Self {
            rescale: RescaleTransform::new(calibration_path),
            imputer: KnnImputer::new(knn_neighbors),
            scaler: RobustScaler::new(),
        }
    }

    /// Fit every step on `frame` and return the transformed training rows.
    pub fn fit_transform(&mut self, frame: &SensorFrame) -> Result<Vec<Vec<f64>>, PipelineError> {
        self.rescale.fit(frame)?;
        self.fit_remaining(frame)
    }

    /// As [`fit_transform`](Self::fit_transform) with an in-memory calibration table.
    pub fn fit_transform_with_table(
        &mut self,
        frame: &SensorFrame,
        table: CalibrationTable,
    ) -> Result<Vec<Vec<f64>>, PipelineError> {
        self.rescale.fit_with_table(frame, table)?;
        self.fit_remaining(frame)
    }

    fn fit_remaining(&mut self, frame: &SensorFrame) -> Result<Vec<Vec<f64>>, PipelineError> {
        if frame.is_empty() {
            return Err(PipelineError::EmptyInput("pipeline"));
        }
        let rescaled = self.rescale.transform(frame)?.into_rows();
        self.imputer.fit(&rescaled)?;
        let imputed = self.imputer.transform(&rescaled)?;
        self.scaler.fit(&imputed)?;
        self.scaler.transform(&imputed)
    }

    /// Apply the fitted steps to `frame`.
    ///
    /// `frame` must contain every feature seen during fit; columns are taken
    /// in fit order.
    pub fn transform(&self, frame: &SensorFrame) -> Result<Vec<Vec<f64>>, PipelineError> {
        let names = self.feature_names_in().ok_or(PipelineError::NotFitted("pipeline"))?;
        let aligned = frame.select(names)?;
        let rescaled = self.rescale.transform(&aligned)?.into_rows();
        let imputed = self.imputer.transform(&rescaled)?;
        self.scaler.transform(&imputed)
    }

    /// Feature names captured at fit time, in order.
    pub fn feature_names_in(&self) -> Option<&[String]> {
        self.rescale.feature_names_in()
    }

    /// Calibration table the rescale step was fit with.
    pub fn calibration(&self) -> Option<&CalibrationTable> {
        self.rescale.params()
    }

    pub fn is_fitted(&self) -> bool {
        self.rescale.is_fitted()
    }

    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        save_json(self, path)
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        load_json(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{channel_columns, CalibrationEntry, CHANNELS};

    fn table() -> CalibrationTable {
        CalibrationTable::new(
            CHANNELS
                .iter()
                .map(|c| CalibrationEntry {
                    channel: c.column.to_string(),
                    xmin: 0.0,
                    xmax: 10.0,
                    ymin: c.target_min,
                    ymax: c.target_max,
                })
                .collect(),
        )
    }

    fn training_frame() -> SensorFrame {
        let rows = (0..8)
            .map(|i| {
                let mut r: Vec<f64> = (0..10).map(|j| f64::from(i + j)).collect();
                if i == 3 {
                    r[4] = f64::NAN;
                }
                r
            })
            .collect();
        SensorFrame::new(channel_columns(), rows).unwrap()
    }

    #[test]
    fn test_fit_transform_fills_and_scales() {
        let mut pipeline = PreprocessingPipeline::new("unused.json", 3);
        let out = pipeline.fit_transform_with_table(&training_frame(), table()).unwrap();
        assert_eq!(out.len(), 8);
        assert!(out.iter().flatten().all(|v| v.is_finite()));
        assert_eq!(pipeline.feature_names_in().unwrap(), channel_columns().as_slice());
    }

    #[test]
    fn test_transform_uses_fit_parameters() {
        let mut pipeline = PreprocessingPipeline::new("unused.json", 3);
        let train_out = pipeline.fit_transform_with_table(&training_frame(), table()).unwrap();
        let again = pipeline.transform(&training_frame().take_rows(&[0, 1])).unwrap();
        assert_eq!(again[0], train_out[0]);
        assert_eq!(again[1], train_out[1]);
    }

    #[test]
    fn test_transform_reorders_columns() {
        let mut pipeline = PreprocessingPipeline::new("unused.json", 3);
        pipeline.fit_transform_with_table(&training_frame(), table()).unwrap();

        let mut reversed_names = channel_columns();
        reversed_names.reverse();
        let reversed = training_frame().select(&reversed_names).unwrap();
        assert_eq!(
            pipeline.transform(&reversed).unwrap(),
            pipeline.transform(&training_frame()).unwrap()
        );
    }

    #[test]
    fn test_unfitted_pipeline_rejects_transform() {
        let pipeline = PreprocessingPipeline::new("unused.json", 3);
        assert!(matches!(
            pipeline.transform(&training_frame()),
            Err(PipelineError::NotFitted("pipeline"))
        ));
    }

    #[test]
    fn test_save_and_load_preserves_behavior() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preprocessor.json");
        let mut pipeline = PreprocessingPipeline::new("unused.json", 3);
        pipeline.fit_transform_with_table(&training_frame(), table()).unwrap();
        pipeline.save(&path).unwrap();

        let loaded = PreprocessingPipeline::load(&path).unwrap();
        let probe = training_frame().take_rows(&[3]);
        assert_eq!(loaded.transform(&probe).unwrap(), pipeline.transform(&probe).unwrap());
    }
}
