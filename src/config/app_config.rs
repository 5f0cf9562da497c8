//! Application configuration - artifact locations, training knobs and form limits
//!
//! Every tunable that the training pipeline and web front end rely on lives
//! here. Each struct implements `Default` with the values the system was
//! originally tuned with, so a missing config file changes nothing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::models::Criterion;
use crate::types::{default_plausible_ranges, PlausibleRange, CHANNELS, NUM_CHANNELS};

/// Environment variable pointing at a TOML config file.
pub const CONFIG_ENV_VAR: &str = "SENSOR_GUARD_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "sensor_guard.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `AppConfig::load()` which searches:
/// 1. `$SENSOR_GUARD_CONFIG`
/// 2. `./sensor_guard.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where artifacts are read from and written to
    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    /// Raw dataset and train/test split
    #[serde(default)]
    pub ingestion: IngestionConfig,

    /// Target and ignored columns in the dataset
    #[serde(default)]
    pub features: FeatureConfig,

    /// Preprocessing pipeline parameters
    #[serde(default)]
    pub preprocessing: PreprocessingConfig,

    /// Model selection
    #[serde(default)]
    pub training: TrainingConfig,

    /// Plausibility limits applied to form submissions
    #[serde(default)]
    pub limits: LimitsConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration using the standard search order:
    /// 1. `$SENSOR_GUARD_CONFIG` environment variable
    /// 2. `./sensor_guard.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Write the config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - Test ratio strictly between 0 and 1
    /// - At least 2 cross-validation folds
    /// - Minimum accuracy within [0, 1]
    /// - Every grid non-empty with positive entries
    /// - One plausibility range per channel, with min <= max
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let ratio = self.ingestion.test_ratio;
        if !(ratio > 0.0 && ratio < 1.0) {
            errors.push(format!("ingestion.test_ratio must be in (0, 1), got {ratio}"));
        }

        if self.preprocessing.knn_neighbors == 0 {
            errors.push("preprocessing.knn_neighbors must be > 0".to_string());
        }

        let t = &self.training;
        if t.cv_folds < 2 {
            errors.push(format!("training.cv_folds must be >= 2, got {}", t.cv_folds));
        }
        if !(0.0..=1.0).contains(&t.min_accuracy) {
            errors.push(format!(
                "training.min_accuracy must be within [0, 1], got {}",
                t.min_accuracy
            ));
        }
        errors.extend(super::validation::validate_grids(&t.grids));
        errors.extend(super::validation::validate_limits(&self.limits));

        if self.features.target_column.trim().is_empty() {
            errors.push("features.target_column must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, std::io::Error),
    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(toml::ser::Error),
    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Artifacts
// ============================================================================

/// Locations of every persisted artifact, relative to `dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    #[serde(default = "default_artifacts_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_calibration_file")]
    pub calibration_file: String,
    #[serde(default = "default_preprocessor_file")]
    pub preprocessor_file: String,
    #[serde(default = "default_model_file")]
    pub model_file: String,
    #[serde(default = "default_raw_data_file")]
    pub raw_data_file: String,
    #[serde(default = "default_train_file")]
    pub train_file: String,
    #[serde(default = "default_test_file")]
    pub test_file: String,
}

fn default_artifacts_dir() -> PathBuf { PathBuf::from("artifacts") }
fn default_calibration_file() -> String { "calibration_params.json".to_string() }
fn default_preprocessor_file() -> String { "preprocessor.json".to_string() }
fn default_model_file() -> String { "model.json".to_string() }
fn default_raw_data_file() -> String { "raw.csv".to_string() }
fn default_train_file() -> String { "train.csv".to_string() }
fn default_test_file() -> String { "test.csv".to_string() }

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: default_artifacts_dir(),
            calibration_file: default_calibration_file(),
            preprocessor_file: default_preprocessor_file(),
            model_file: default_model_file(),
            raw_data_file: default_raw_data_file(),
            train_file: default_train_file(),
            test_file: default_test_file(),
        }
    }
}

impl ArtifactsConfig {
    /// All artifacts rooted at `dir`, default file names.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), ..Self::default() }
    }

    pub fn calibration_path(&self) -> PathBuf { self.dir.join(&self.calibration_file) }
    pub fn preprocessor_path(&self) -> PathBuf { self.dir.join(&self.preprocessor_file) }
    pub fn model_path(&self) -> PathBuf { self.dir.join(&self.model_file) }
    pub fn raw_data_path(&self) -> PathBuf { self.dir.join(&self.raw_data_file) }
    pub fn train_path(&self) -> PathBuf { self.dir.join(&self.train_file) }
    pub fn test_path(&self) -> PathBuf { self.dir.join(&self.test_file) }
}

// ============================================================================
// Ingestion / Features / Preprocessing
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Raw dataset CSV the train/test split is drawn from
    #[serde(default = "default_source")]
    pub source: PathBuf,
    /// Fraction of rows held out for testing
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,
    /// Shuffle seed for the split
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_source() -> PathBuf { PathBuf::from("data/wafer.csv") }
fn default_test_ratio() -> f64 { 0.2 }
fn default_seed() -> u64 { 42 }

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            test_ratio: default_test_ratio(),
            seed: default_seed(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Label column (1 = good sensor, anything else = faulty)
    #[serde(default = "default_target_column")]
    pub target_column: String,
    /// Identifier / index columns ignored when present
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,
}

fn default_target_column() -> String { "Good/Bad".to_string() }
fn default_drop_columns() -> Vec<String> { vec!["Wafers".to_string(), "Unnamed: 0".to_string()] }

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            target_column: default_target_column(),
            drop_columns: default_drop_columns(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Donors averaged by the KNN imputer
    #[serde(default = "default_knn_neighbors")]
    pub knn_neighbors: usize,
}

fn default_knn_neighbors() -> usize { 3 }

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self { knn_neighbors: default_knn_neighbors() }
    }
}

// ============================================================================
// Training
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Cross-validation folds per grid point
    #[serde(default = "default_cv_folds")]
    pub cv_folds: usize,
    /// Training aborts when the best held-out accuracy is below this
    #[serde(default = "default_min_accuracy")]
    pub min_accuracy: f64,
    /// Seed for every randomized estimator
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Hyperparameter grids per model family
    #[serde(default)]
    pub grids: GridConfig,
}

fn default_cv_folds() -> usize { 3 }
fn default_min_accuracy() -> f64 { 0.6 }

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            cv_folds: default_cv_folds(),
            min_accuracy: default_min_accuracy(),
            seed: default_seed(),
            grids: GridConfig::default(),
        }
    }
}

/// Hyperparameter grids searched for each model family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default)]
    pub decision_tree: DecisionTreeGrid,
    #[serde(default)]
    pub random_forest: RandomForestGrid,
    #[serde(default)]
    pub gradient_boosting: BoostingGrid,
    #[serde(default)]
    pub logistic_regression: LogisticGrid,
    #[serde(default)]
    pub adaboost: BoostingGrid,
    #[serde(default)]
    pub k_neighbors: KNeighborsGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeGrid {
    #[serde(default = "default_criteria")]
    pub criterion: Vec<Criterion>,
}

fn default_criteria() -> Vec<Criterion> { vec![Criterion::Gini] }

impl Default for DecisionTreeGrid {
    fn default() -> Self {
        Self { criterion: default_criteria() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestGrid {
    #[serde(default = "default_n_estimators")]
    pub n_estimators: Vec<usize>,
    #[serde(default = "default_criteria")]
    pub criterion: Vec<Criterion>,
}

fn default_n_estimators() -> Vec<usize> { vec![16, 32] }

impl Default for RandomForestGrid {
    fn default() -> Self {
        Self {
            n_estimators: default_n_estimators(),
            criterion: default_criteria(),
        }
    }
}

/// Shared grid shape for the two boosting families.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostingGrid {
    #[serde(default = "default_learning_rates")]
    pub learning_rate: Vec<f64>,
    #[serde(default = "default_n_estimators")]
    pub n_estimators: Vec<usize>,
}

fn default_learning_rates() -> Vec<f64> { vec![0.1] }

impl Default for BoostingGrid {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rates(),
            n_estimators: default_n_estimators(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticGrid {
    /// Inverse L2 regularization strength
    #[serde(default = "default_inverse_reg")]
    pub c: Vec<f64>,
    #[serde(default = "default_max_iter")]
    pub max_iter: Vec<usize>,
}

fn default_inverse_reg() -> Vec<f64> { vec![1.0] }
fn default_max_iter() -> Vec<usize> { vec![500] }

impl Default for LogisticGrid {
    fn default() -> Self {
        Self {
            c: default_inverse_reg(),
            max_iter: default_max_iter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNeighborsGrid {
    #[serde(default = "default_n_neighbors")]
    pub n_neighbors: Vec<usize>,
}

fn default_n_neighbors() -> Vec<usize> { vec![5, 7] }

impl Default for KNeighborsGrid {
    fn default() -> Self {
        Self { n_neighbors: default_n_neighbors() }
    }
}

// ============================================================================
// Form Limits
// ============================================================================

/// Static plausibility ranges, one per channel in channel order.
///
/// These are fixed operator limits, independent of the calibration learned
/// from training data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_plausible_ranges")]
    pub ranges: Vec<PlausibleRange>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { ranges: default_plausible_ranges() }
    }
}

impl LimitsConfig {
    /// Index and value of the first reading outside its range, if any.
    pub fn first_violation(&self, values: &[f64; NUM_CHANNELS]) -> Option<(usize, f64, PlausibleRange)> {
        values
            .iter()
            .zip(self.ranges.iter())
            .enumerate()
            .find(|(_, (v, r))| !r.contains(**v))
            .map(|(i, (v, r))| (i, *v, *r))
    }

    /// Property name for channel `index`, for log messages.
    pub fn property(index: usize) -> &'static str {
        CHANNELS.get(index).map_or("unknown", |c| c.property)
    }
}

// ============================================================================
// Server / Logging
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `SENSOR_GUARD_ADDR` env var or `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    "0.0.0.0:5000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { addr: default_server_addr() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory receiving one timestamped log file per process run
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    /// Disable to log to stdout only
    #[serde(default = "default_file_logging")]
    pub file_logging: bool,
}

fn default_log_dir() -> PathBuf { PathBuf::from("logs") }
fn default_file_logging() -> bool { true }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file_logging: default_file_logging(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
