//! Preprocessing pipeline
//!
//! Three steps, each fit on training data only:
//! - `rescale`: raw channel values → physical units via the calibration table
//! - `imputer`: KNN imputation of missing values (k = 3 by default)
//! - `scaler`: median / IQR robust scaling

pub mod imputer;
pub mod pipeline;
pub mod rescale;
pub mod scaler;

pub use imputer::KnnImputer;
pub use pipeline::PreprocessingPipeline;
pub use rescale::RescaleTransform;
pub use scaler::RobustScaler;

use thiserror::Error;

use crate::dataset::DatasetError;
use crate::storage::ArtifactError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0} step used before fit")]
    NotFitted(&'static str),
    #[error("calibration missing for channels: {}", .0.join(", "))]
    MissingCalibration(Vec<String>),
    #[error("input is missing feature '{0}'")]
    MissingFeature(String),
    #[error("{0} received no rows")]
    EmptyInput(&'static str),
    #[error("row has {found} features, expected {expected}")]
    WidthMismatch { expected: usize, found: usize },
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}
