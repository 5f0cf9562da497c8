//! Inference: load the persisted preprocessor and model, align the input
//! columns, transform and predict.
//!
//! Artifacts are read from disk on every call so a retrained model is
//! picked up without restarting the server.

use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{ArtifactsConfig, LimitsConfig};
use crate::dataset::SensorFrame;
use crate::preprocessing::{PipelineError, PreprocessingPipeline};
use crate::storage::ArtifactError;
use crate::training::TrainedModel;
use crate::types::{PredictionOutcome, SensorReading};

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("failed to load {what}: {source}")]
    Artifact {
        what: &'static str,
        #[source]
        source: ArtifactError,
    },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("preprocessing pipeline is not fitted")]
    Unfitted,

    #[error("no prediction produced")]
    EmptyPrediction,
}

pub struct PredictPipeline {
    preprocessor_path: PathBuf,
    model_path: PathBuf,
}

impl PredictPipeline {
    pub fn new(artifacts: &ArtifactsConfig) -> Self {
        Self {
            preprocessor_path: artifacts.preprocessor_path(),
            model_path: artifacts.model_path(),
        }
    }

    /// Original dataset labels, one per input row.
    ///
    /// Expected features absent from `features` are filled with NaN (and
    /// imputed); extra columns are ignored.
    pub fn predict(&self, features: &SensorFrame) -> Result<Vec<i64>, PredictionError> {
        let preprocessor = PreprocessingPipeline::load(&self.preprocessor_path).map_err(|source| {
            error!(path = %self.preprocessor_path.display(), error = %source, "Failed to load preprocessor");
            PredictionError::Artifact { what: "preprocessor", source }
        })?;
        let model = TrainedModel::load(&self.model_path).map_err(|source| {
            error!(path = %self.model_path.display(), error = %source, "Failed to load model");
            PredictionError::Artifact { what: "model", source }
        })?;

        let expected = preprocessor.feature_names_in().ok_or(PredictionError::Unfitted)?;
        let (aligned, padded) = features.select_or_pad(expected);
        if !padded.is_empty() {
            warn!(missing = ?padded, "Input lacks expected features, padding with NaN");
        }

        let rows = preprocessor.transform(&aligned).map_err(|e| {
            error!(error = %e, "Preprocessing failed");
            e
        })?;
        Ok(rows.iter().map(|row| model.predict_label(row)).collect())
    }

    /// Predict a single reading.
    pub fn predict_reading(&self, reading: &SensorReading) -> Result<i64, PredictionError> {
        self.predict(&SensorFrame::from_reading(reading))?
            .first()
            .copied()
            .ok_or(PredictionError::EmptyPrediction)
    }
}

/// Range-check a reading and, when every value is plausible, classify it.
///
/// A violation short-circuits to [`PredictionOutcome::OutOfRange`] without
/// touching the model artifacts.
pub fn classify_reading(
    reading: &SensorReading,
    limits: &LimitsConfig,
    pipeline: &PredictPipeline,
) -> Result<PredictionOutcome, PredictionError> {
    if let Some((index, value, range)) = limits.first_violation(&reading.values) {
        info!(
            channel = index + 1,
            property = LimitsConfig::property(index),
            value,
            min = range.min,
            max = range.max,
            "Reading outside plausibility range"
        );
        return Ok(PredictionOutcome::OutOfRange);
    }

    let label = pipeline.predict_reading(reading)?;
    let outcome = PredictionOutcome::from_label(label);
    info!(label, outcome = %outcome, "Prediction complete");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifacts_are_handled() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ArtifactsConfig::in_dir(dir.path());
        let pipeline = PredictPipeline::new(&artifacts);
        let reading = SensorReading::new([1.0; 10]);
        let err = pipeline.predict_reading(&reading).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::Artifact { what: "preprocessor", source: ArtifactError::NotFound(_) }
        ));
    }

    #[test]
    fn test_out_of_range_skips_model() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = PredictPipeline::new(&ArtifactsConfig::in_dir(dir.path()));
        let mut values = [1.0; 10];
        values[0] = 20.0;
        let outcome = classify_reading(&SensorReading::new(values), &LimitsConfig::default(), &pipeline).unwrap();
        assert_eq!(outcome, PredictionOutcome::OutOfRange);
    }

    #[test]
    fn test_in_range_without_artifacts_errors() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = PredictPipeline::new(&ArtifactsConfig::in_dir(dir.path()));
        let result = classify_reading(&SensorReading::new([1.0; 10]), &LimitsConfig::default(), &pipeline);
        assert!(result.is_err());
    }
}
