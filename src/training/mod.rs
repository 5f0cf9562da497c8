//! Model training: hyperparameter grids, stratified cross-validation,
//! model selection and the end-to-end training pipeline.
//!
//! ## Architecture
//! - `grid`: expands the configured grids into concrete [`ModelSpec`]s
//! - `cross_validation`: stratified k-fold splits and fold scoring
//! - `metrics`: accuracy and score summaries (statrs)
//! - `trainer`: grid search per family, refit, held-out selection
//! - `pipeline`: ingestion → calibration → preprocessing → training

pub mod cross_validation;
pub mod grid;
pub mod metrics;
pub mod pipeline;
pub mod trainer;

pub use cross_validation::{cross_val_scores, stratified_folds};
pub use grid::{expand_family, model_menu};
pub use metrics::{accuracy, summarize};
pub use pipeline::{TrainingPipeline, TrainingSummary};
pub use trainer::{ModelReport, ModelTrainer, TrainedModel, TrainingOutcome};

use thiserror::Error;

use crate::calibration::CalibrationError;
use crate::dataset::DatasetError;
use crate::models::{ModelError, ModelFamily, ModelSpec};
use crate::preprocessing::PipelineError;
use crate::storage::ArtifactError;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("{spec}: {source}")]
    Model {
        spec: String,
        #[source]
        source: ModelError,
    },

    #[error("labels: {0}")]
    Labels(#[source] ModelError),

    #[error("empty hyperparameter grid for {0}")]
    EmptyGrid(ModelFamily),

    #[error("cannot build {folds} folds from {rows} rows")]
    TooFewRows { folds: usize, rows: usize },

    #[error("no suitable model found: best was {best} with accuracy {accuracy:.4} (< {threshold})")]
    NoSuitableModel {
        best: ModelFamily,
        accuracy: f64,
        threshold: f64,
    },
}

impl TrainingError {
    pub(crate) fn model(spec: &ModelSpec, source: ModelError) -> Self {
        Self::Model { spec: format!("{} ({spec})", spec.family()), source }
    }
}
