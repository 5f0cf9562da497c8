//! Water Sensor Guard: water-quality sensor fault detection
//!
//! Flags faulty sensors from ten calibrated channel readings.
//!
//! ## Architecture
//!
//! - **Calibration**: observed raw range per channel paired with its physical target range
//! - **Preprocessing**: rescale → KNN imputation → robust scaling, fit on training data
//! - **Models**: six in-crate binary classifier families behind one `Predictor` trait
//! - **Training**: grid search with stratified CV, held-out selection, persisted winner
//! - **Prediction**: artifact loading, column alignment, range-checked classification
//! - **API**: Axum web form at `/predictdata`

pub mod api;
pub mod calibration;
pub mod config;
pub mod dataset;
pub mod logging;
pub mod models;
pub mod prediction;
pub mod preprocessing;
pub mod storage;
pub mod training;
pub mod types;

pub use config::AppConfig;
pub use prediction::{classify_reading, PredictPipeline, PredictionError};
pub use preprocessing::PreprocessingPipeline;
pub use training::{ModelTrainer, TrainedModel, TrainingError, TrainingPipeline};
pub use types::{CalibrationEntry, CalibrationTable, PredictionOutcome, SensorReading};
