//! Grid search, refit and held-out model selection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use super::cross_validation::{cross_val_scores, stratified_folds};
use super::grid::model_menu;
use super::metrics::{accuracy, summarize};
use super::TrainingError;
use crate::config::TrainingConfig;
use crate::models::{FittedModel, LabelEncoder, ModelFamily, ModelSpec, Predictor};
use crate::storage::{load_json, save_json, ArtifactError};

/// Per-family result of grid search plus refit.
#[derive(Debug, Clone)]
pub struct ModelReport {
    pub family: ModelFamily,
    pub spec: ModelSpec,
    pub cv_mean: f64,
    pub cv_std: f64,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub model: FittedModel,
}

/// The persisted winner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub family: ModelFamily,
    pub params: ModelSpec,
    pub accuracy: f64,
    pub labels: LabelEncoder,
    pub model: FittedModel,
    pub trained_at: DateTime<Utc>,
}

impl TrainedModel {
    /// Original dataset label for one preprocessed row.
    pub fn predict_label(&self, row: &[f64]) -> i64 {
        self.labels.decode(self.model.predict_row(row))
    }

    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        save_json(self, path)
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        load_json(path)
    }
}

/// Result of a successful training run.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub reports: Vec<ModelReport>,
    pub best: TrainedModel,
    pub model_path: PathBuf,
}

impl TrainingOutcome {
    pub const fn accuracy(&self) -> f64 {
        self.best.accuracy
    }
}

pub struct ModelTrainer<'a> {
    config: &'a TrainingConfig,
}

impl<'a> ModelTrainer<'a> {
    pub const fn new(config: &'a TrainingConfig) -> Self {
        Self { config }
    }

    /// Best candidate of one family by mean CV accuracy (first on ties).
    pub fn grid_search(
        &self,
        family: ModelFamily,
        candidates: &[ModelSpec],
        x: &[Vec<f64>],
        y: &[u8],
        folds: &[Vec<usize>],
    ) -> Result<(ModelSpec, f64, f64), TrainingError> {
        let mut best: Option<(ModelSpec, f64, f64)> = None;
        for spec in candidates {
            let scores = cross_val_scores(spec, x, y, folds)?;
            let (mean, std) = summarize(&scores);
            debug!(model = %family, params = %spec, cv_mean = mean, cv_std = std, "Grid point scored");
            if best.as_ref().map_or(true, |(_, m, _)| mean > *m) {
                best = Some((spec.clone(), mean, std));
            }
        }
        best.ok_or(TrainingError::EmptyGrid(family))
    }

    /// Grid-search, refit and score every family on the held-out split.
    pub fn evaluate_models(
        &self,
        x_train: &[Vec<f64>],
        y_train: &[u8],
        x_test: &[Vec<f64>],
        y_test: &[u8],
    ) -> Result<Vec<ModelReport>, TrainingError> {
        let folds = stratified_folds(y_train, self.config.cv_folds)?;
        let mut reports = Vec::new();

        for (family, candidates) in model_menu(&self.config.grids, self.config.seed) {
            let (spec, cv_mean, cv_std) = self.grid_search(family, &candidates, x_train, y_train, &folds)?;
            let model = spec.fit(x_train, y_train).map_err(|e| TrainingError::model(&spec, e))?;

            let train_accuracy = accuracy(&model.predict(x_train), y_train);
            let test_accuracy = accuracy(&model.predict(x_test), y_test);
            info!(
                model = %family,
                params = %spec,
                cv_mean,
                cv_std,
                train_accuracy,
                test_accuracy,
                "Model evaluated"
            );

            reports.push(ModelReport { family, spec, cv_mean, cv_std, train_accuracy, test_accuracy, model });
        }

        Ok(reports)
    }

    /// Train the menu, pick the best held-out accuracy (first on ties),
    /// reject it below `min_accuracy`, otherwise persist it to `model_path`.
    pub fn initiate_model_trainer(
        &self,
        x_train: &[Vec<f64>],
        labels_train: &[i64],
        x_test: &[Vec<f64>],
        labels_test: &[i64],
        model_path: &Path,
    ) -> Result<TrainingOutcome, TrainingError> {
        info!(train_rows = x_train.len(), test_rows = x_test.len(), "Model training started");

        let encoder = LabelEncoder::fit(labels_train).map_err(TrainingError::Labels)?;
        let y_train = encoder.encode(labels_train).map_err(TrainingError::Labels)?;
        let y_test = encoder.encode(labels_test).map_err(TrainingError::Labels)?;

        let reports = self.evaluate_models(x_train, &y_train, x_test, &y_test)?;

        let mut winner: Option<&ModelReport> = None;
        for report in &reports {
            if winner.map_or(true, |w| report.test_accuracy > w.test_accuracy) {
                winner = Some(report);
            }
        }
        let winner = winner.ok_or(TrainingError::EmptyGrid(ModelFamily::RandomForest))?;

        if winner.test_accuracy < self.config.min_accuracy {
            let err = TrainingError::NoSuitableModel {
                best: winner.family,
                accuracy: winner.test_accuracy,
                threshold: self.config.min_accuracy,
            };
            error!(error = %err, "Training rejected");
            return Err(err);
        }

        info!(
            model = %winner.family,
            params = %winner.spec,
            accuracy = winner.test_accuracy,
            "Best model found on both training and testing dataset"
        );

        let best = TrainedModel {
            family: winner.family,
            params: winner.spec.clone(),
            accuracy: winner.test_accuracy,
            labels: encoder,
            model: winner.model.clone(),
            trained_at: Utc::now(),
        };
        best.save(model_path)?;
        info!(path = %model_path.display(), "Saved trained model");

        Ok(TrainingOutcome {
            reports,
            best,
            model_path: model_path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn separable(n: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<i64>) {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|i| {
                let good = i % 2 == 0;
                let c = if good { 1.5 } else { -1.5 };
                (vec![c + rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)], if good { 1 } else { -1 })
            })
            .unzip()
    }

    fn small_config() -> TrainingConfig {
        let mut grids = GridConfig::default();
        grids.random_forest.n_estimators = vec![4];
        grids.gradient_boosting.n_estimators = vec![4];
        grids.adaboost.n_estimators = vec![4];
        grids.k_neighbors.n_neighbors = vec![3];
        TrainingConfig { grids, ..TrainingConfig::default() }
    }

    #[test]
    fn test_trainer_selects_and_saves_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let (x_train, y_train) = separable(60, 1);
        let (x_test, y_test) = separable(20, 2);

        let config = small_config();
        let outcome = ModelTrainer::new(&config)
            .initiate_model_trainer(&x_train, &y_train, &x_test, &y_test, &path)
            .unwrap();

        assert_eq!(outcome.reports.len(), 6);
        let max = outcome.reports.iter().map(|r| r.test_accuracy).fold(f64::MIN, f64::max);
        assert_eq!(outcome.accuracy(), max);
        let first_best = outcome.reports.iter().find(|r| r.test_accuracy == max).unwrap();
        assert_eq!(outcome.best.family, first_best.family);

        let loaded = TrainedModel::load(&path).unwrap();
        assert_eq!(loaded.family, outcome.best.family);
        assert_eq!(loaded.labels.classes(), [-1, 1]);
        for row in &x_test {
            assert_eq!(loaded.predict_label(row), outcome.best.predict_label(row));
        }
    }

    #[test]
    fn test_low_accuracy_rejected_and_nothing_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let (x_train, y_train) = separable(60, 3);
        let (x_test, y_test) = separable(20, 4);

        let config = TrainingConfig { min_accuracy: 1.01, ..small_config() };
        let err = ModelTrainer::new(&config)
            .initiate_model_trainer(&x_train, &y_train, &x_test, &y_test, &path)
            .unwrap_err();
        assert!(matches!(err, TrainingError::NoSuitableModel { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_single_class_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let x = vec![vec![0.0]; 6];
        let y = vec![1; 6];
        let config = small_config();
        let err = ModelTrainer::new(&config)
            .initiate_model_trainer(&x, &y, &x, &y, &dir.path().join("m.json"))
            .unwrap_err();
        assert!(matches!(err, TrainingError::Labels(_)));
    }

    #[test]
    fn test_grid_search_keeps_first_on_ties() {
        let x: Vec<Vec<f64>> = (0..12).map(|i| vec![if i % 2 == 0 { -3.0 } else { 3.0 }]).collect();
        let y: Vec<u8> = (0..12).map(|i| u8::from(i % 2 == 1)).collect();
        let folds = stratified_folds(&y, 3).unwrap();
        let config = small_config();
        let mut grids = GridConfig::default();
        grids.k_neighbors.n_neighbors = vec![1, 3];
        let candidates = crate::training::expand_family(&grids, ModelFamily::KNeighbors, 42);

        let (spec, mean, _) = ModelTrainer::new(&config)
            .grid_search(ModelFamily::KNeighbors, &candidates, &x, &y, &folds)
            .unwrap();
        assert_eq!(mean, 1.0);
        assert_eq!(spec, candidates[0]);
    }

    #[test]
    fn test_training_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let (x_train, y_train) = separable(40, 5);
        let (x_test, y_test) = separable(16, 6);
        let config = small_config();
        let trainer = ModelTrainer::new(&config);

        let a = trainer
            .initiate_model_trainer(&x_train, &y_train, &x_test, &y_test, &dir.path().join("a.json"))
            .unwrap();
        let b = trainer
            .initiate_model_trainer(&x_train, &y_train, &x_test, &y_test, &dir.path().join("b.json"))
            .unwrap();
        assert_eq!(a.best.family, b.best.family);
        assert_eq!(a.best.params, b.best.params);
        let accs_a: Vec<f64> = a.reports.iter().map(|r| r.test_accuracy).collect();
        let accs_b: Vec<f64> = b.reports.iter().map(|r| r.test_accuracy).collect();
        assert_eq!(accs_a, accs_b);
    }
}
