//! End-to-end training run: ingestion → calibration → preprocessing → model
//! selection.

use std::path::Path;
use tracing::{info, warn};

use super::trainer::{ModelTrainer, TrainingOutcome};
use super::TrainingError;
use crate::calibration;
use crate::config::AppConfig;
use crate::dataset::{read_csv, DataIngestion, IngestionOutput, LabeledDataset};
use crate::preprocessing::PreprocessingPipeline;
use crate::types::{channel_by_column, channel_columns, CalibrationTable};

/// Everything a training run produced.
#[derive(Debug)]
pub struct TrainingSummary {
    pub ingestion: IngestionOutput,
    pub calibration: CalibrationTable,
    pub outcome: TrainingOutcome,
}

pub struct TrainingPipeline<'a> {
    config: &'a AppConfig,
    recalibrate: bool,
}

impl<'a> TrainingPipeline<'a> {
    pub const fn new(config: &'a AppConfig) -> Self {
        Self { config, recalibrate: false }
    }

    /// Recompute the calibration artifact from the new train split even if
    /// one already exists.
    pub const fn recalibrate(mut self, recalibrate: bool) -> Self {
        self.recalibrate = recalibrate;
        self
    }

    /// Run on the configured ingestion source.
    pub fn run(&self) -> Result<TrainingSummary, TrainingError> {
        self.run_from(&self.config.ingestion.source)
    }

    pub fn run_from(&self, source: &Path) -> Result<TrainingSummary, TrainingError> {
        let artifacts = &self.config.artifacts;
        let features = &self.config.features;

        let ingestion = DataIngestion::new(&self.config.ingestion, artifacts).initiate_from(source)?;

        let columns = channel_columns();
        let train = LabeledDataset::from_frame(
            &read_csv(&ingestion.train_path)?,
            &features.target_column,
            &features.drop_columns,
            &columns,
        )?;
        let test = LabeledDataset::from_frame(
            &read_csv(&ingestion.test_path)?,
            &features.target_column,
            &features.drop_columns,
            &columns,
        )?;
        info!(train_rows = train.len(), test_rows = test.len(), "Read train and test data");

        let calibration_path = artifacts.calibration_path();
        if self.recalibrate || !calibration_path.exists() {
            if !self.recalibrate {
                warn!(path = %calibration_path.display(), "Calibration artifact missing, computing from train split");
            }
            let table = calibration::compute_calibration(&train.features)?;
            calibration::save(&table, &calibration_path)?;
        }

        let mut preprocessor =
            PreprocessingPipeline::new(&calibration_path, self.config.preprocessing.knn_neighbors);
        let x_train = preprocessor.fit_transform(&train.features)?;
        let x_test = preprocessor.transform(&test.features)?;

        let calibration = preprocessor
            .calibration()
            .cloned()
            .unwrap_or_else(|| CalibrationTable::new(Vec::new()));
        for e in &calibration.entries {
            info!(
                channel = %e.channel,
                property = channel_by_column(&e.channel).map_or("unknown", |c| c.property),
                xmin = e.xmin,
                xmax = e.xmax,
                ymin = e.ymin,
                ymax = e.ymax,
                "Calibration applied"
            );
        }

        let preprocessor_path = artifacts.preprocessor_path();
        preprocessor.save(&preprocessor_path)?;
        info!(path = %preprocessor_path.display(), "Saved preprocessing pipeline");

        let outcome = ModelTrainer::new(&self.config.training).initiate_model_trainer(
            &x_train,
            &train.labels,
            &x_test,
            &test.labels,
            &artifacts.model_path(),
        )?;

        Ok(TrainingSummary { ingestion, calibration, outcome })
    }
}
