//! Binary classifiers searched by the model trainer.
//!
//! Every family exposes an unfitted parameter struct implementing
//! [`Estimator`] and a fitted counterpart implementing [`Predictor`].
//! [`ModelSpec`] and [`FittedModel`] wrap them in serializable enums so the
//! trainer can treat the menu uniformly and persist whichever model wins.
//!
//! Classifiers work on class indices `0`/`1`; [`LabelEncoder`] maps the
//! dataset's original labels onto those indices and back.

mod adaboost;
mod decision_tree;
mod gradient_boosting;
mod knn;
mod labels;
mod logistic;
mod random_forest;
mod tree;

pub use adaboost::{AdaBoost, AdaBoostParams};
pub use decision_tree::{DecisionTree, DecisionTreeParams};
pub use gradient_boosting::{GradientBoosting, GradientBoostingParams};
pub use knn::{KNeighbors, KNeighborsParams};
pub use labels::LabelEncoder;
pub use logistic::{LogisticParams, LogisticRegression};
pub use random_forest::{RandomForest, RandomForestParams};
pub use tree::{Criterion, Tree, TreeParams};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no training rows")]
    EmptyInput,

    #[error("{rows} rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },

    #[error("row {row} has {found} features, expected {expected}")]
    RaggedRows { row: usize, expected: usize, found: usize },

    #[error("non-finite feature value at row {row}, column {col}")]
    NonFinite { row: usize, col: usize },

    #[error("expected exactly 2 classes, found {0}")]
    ClassCount(usize),

    #[error("label {0} was not seen during fitting")]
    UnknownLabel(i64),

    #[error("invalid parameter: {0}")]
    InvalidParam(String),
}

/// A fitted binary classifier.
pub trait Predictor {
    /// Class index (`0` or `1`) for one feature row.
    fn predict_row(&self, row: &[f64]) -> u8;

    fn predict(&self, rows: &[Vec<f64>]) -> Vec<u8> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }
}

/// Unfitted hyperparameters for one model family.
pub trait Estimator {
    type Fitted: Predictor;

    fn fit(&self, x: &[Vec<f64>], y: &[u8]) -> Result<Self::Fitted, ModelError>;
}

/// Shape and finiteness checks shared by every `fit`. Returns the feature count.
pub(crate) fn check_training_data(x: &[Vec<f64>], y: &[u8]) -> Result<usize, ModelError> {
    if x.is_empty() {
        return Err(ModelError::EmptyInput);
    }
    if x.len() != y.len() {
        return Err(ModelError::LengthMismatch { rows: x.len(), labels: y.len() });
    }
    let width = x[0].len();
    for (r, row) in x.iter().enumerate() {
        if row.len() != width {
            return Err(ModelError::RaggedRows { row: r, expected: width, found: row.len() });
        }
        if let Some(c) = row.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite { row: r, col: c });
        }
    }
    Ok(width)
}

pub(crate) fn targets(y: &[u8]) -> Vec<f64> {
    y.iter().map(|&c| f64::from(c)).collect()
}

// ============================================================================
// Model menu
// ============================================================================

/// Model families in the order the trainer evaluates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    RandomForest,
    DecisionTree,
    GradientBoosting,
    LogisticRegression,
    AdaBoost,
    KNeighbors,
}

impl ModelFamily {
    pub const ALL: [Self; 6] = [
        Self::RandomForest,
        Self::DecisionTree,
        Self::GradientBoosting,
        Self::LogisticRegression,
        Self::AdaBoost,
        Self::KNeighbors,
    ];

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::RandomForest => "Random Forest",
            Self::DecisionTree => "Decision Tree",
            Self::GradientBoosting => "Gradient Boosting",
            Self::LogisticRegression => "Logistic Regression",
            Self::AdaBoost => "AdaBoost Classifier",
            Self::KNeighbors => "K-Neighbors Classifier",
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One point of a hyperparameter grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", content = "params", rename_all = "snake_case")]
pub enum ModelSpec {
    RandomForest(RandomForestParams),
    DecisionTree(DecisionTreeParams),
    GradientBoosting(GradientBoostingParams),
    LogisticRegression(LogisticParams),
    AdaBoost(AdaBoostParams),
    KNeighbors(KNeighborsParams),
}

impl ModelSpec {
    pub const fn family(&self) -> ModelFamily {
        match self {
            Self::RandomForest(_) => ModelFamily::RandomForest,
            Self::DecisionTree(_) => ModelFamily::DecisionTree,
            Self::GradientBoosting(_) => ModelFamily::GradientBoosting,
            Self::LogisticRegression(_) => ModelFamily::LogisticRegression,
            Self::AdaBoost(_) => ModelFamily::AdaBoost,
            Self::KNeighbors(_) => ModelFamily::KNeighbors,
        }
    }

    pub fn fit(&self, x: &[Vec<f64>], y: &[u8]) -> Result<FittedModel, ModelError> {
        Ok(match self {
            Self::RandomForest(p) => FittedModel::RandomForest(p.fit(x, y)?),
            Self::DecisionTree(p) => FittedModel::DecisionTree(p.fit(x, y)?),
            Self::GradientBoosting(p) => FittedModel::GradientBoosting(p.fit(x, y)?),
            Self::LogisticRegression(p) => FittedModel::LogisticRegression(p.fit(x, y)?),
            Self::AdaBoost(p) => FittedModel::AdaBoost(p.fit(x, y)?),
            Self::KNeighbors(p) => FittedModel::KNeighbors(p.fit(x, y)?),
        })
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RandomForest(p) => write!(f, "n_estimators={}, criterion={}", p.n_estimators, p.criterion),
            Self::DecisionTree(p) => write!(f, "criterion={}", p.criterion),
            Self::GradientBoosting(p) => {
                write!(f, "learning_rate={}, n_estimators={}", p.learning_rate, p.n_estimators)
            }
            Self::LogisticRegression(p) => write!(f, "C={}, max_iter={}", p.c, p.max_iter),
            Self::AdaBoost(p) => write!(f, "learning_rate={}, n_estimators={}", p.learning_rate, p.n_estimators),
            Self::KNeighbors(p) => write!(f, "n_neighbors={}", p.n_neighbors),
        }
    }
}

/// A fitted model of any family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "family", content = "model", rename_all = "snake_case")]
pub enum FittedModel {
    RandomForest(RandomForest),
    DecisionTree(DecisionTree),
    GradientBoosting(GradientBoosting),
    LogisticRegression(LogisticRegression),
    AdaBoost(AdaBoost),
    KNeighbors(KNeighbors),
}

impl FittedModel {
    pub const fn family(&self) -> ModelFamily {
        match self {
            Self::RandomForest(_) => ModelFamily::RandomForest,
            Self::DecisionTree(_) => ModelFamily::DecisionTree,
            Self::GradientBoosting(_) => ModelFamily::GradientBoosting,
            Self::LogisticRegression(_) => ModelFamily::LogisticRegression,
            Self::AdaBoost(_) => ModelFamily::AdaBoost,
            Self::KNeighbors(_) => ModelFamily::KNeighbors,
        }
    }
}

impl Predictor for FittedModel {
    fn predict_row(&self, row: &[f64]) -> u8 {
        match self {
            Self::RandomForest(m) => m.predict_row(row),
            Self::DecisionTree(m) => m.predict_row(row),
            Self::GradientBoosting(m) => m.predict_row(row),
            Self::LogisticRegression(m) => m.predict_row(row),
            Self::AdaBoost(m) => m.predict_row(row),
            Self::KNeighbors(m) => m.predict_row(row),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Two noisy Gaussian-ish blobs separated along both features.
    pub fn blobs(n_per_class: usize) -> (Vec<Vec<f64>>, Vec<u8>) {
        use rand::{rngs::StdRng, Rng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(7);
        let mut x = Vec::with_capacity(2 * n_per_class);
        let mut y = Vec::with_capacity(2 * n_per_class);
        for i in 0..2 * n_per_class {
            let class = u8::from(i % 2 == 1);
            let center = if class == 1 { 2.0 } else { -2.0 };
            x.push(vec![
                center + rng.gen_range(-1.0..1.0),
                center + rng.gen_range(-1.0..1.0),
            ]);
            y.push(class);
        }
        (x, y)
    }

    pub fn accuracy(pred: &[u8], y: &[u8]) -> f64 {
        let hits = pred.iter().zip(y).filter(|(a, b)| a == b).count();
        hits as f64 / y.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_display_names() {
        let names: Vec<&str> = ModelFamily::ALL.iter().map(|f| f.display_name()).collect();
        assert_eq!(
            names,
            vec![
                "Random Forest",
                "Decision Tree",
                "Gradient Boosting",
                "Logistic Regression",
                "AdaBoost Classifier",
                "K-Neighbors Classifier",
            ]
        );
    }

    #[test]
    fn test_check_training_data_rejects_nan() {
        let x = vec![vec![0.0, 1.0], vec![f64::NAN, 1.0]];
        assert!(matches!(
            check_training_data(&x, &[0, 1]),
            Err(ModelError::NonFinite { row: 1, col: 0 })
        ));
    }

    #[test]
    fn test_check_training_data_rejects_mismatch() {
        let x = vec![vec![0.0], vec![1.0]];
        assert!(matches!(check_training_data(&x, &[0]), Err(ModelError::LengthMismatch { .. })));
        assert!(matches!(check_training_data(&[], &[]), Err(ModelError::EmptyInput)));
    }

    #[test]
    fn test_every_spec_fits_and_serializes() {
        let (x, y) = fixtures::blobs(30);
        let specs = vec![
            ModelSpec::RandomForest(RandomForestParams::default()),
            ModelSpec::DecisionTree(DecisionTreeParams::default()),
            ModelSpec::GradientBoosting(GradientBoostingParams::default()),
            ModelSpec::LogisticRegression(LogisticParams::default()),
            ModelSpec::AdaBoost(AdaBoostParams::default()),
            ModelSpec::KNeighbors(KNeighborsParams::default()),
        ];
        for spec in specs {
            let model = spec.fit(&x, &y).unwrap();
            assert_eq!(model.family(), spec.family());
            let before = model.predict(&x);
            assert!(fixtures::accuracy(&before, &y) > 0.9, "{} underfits", spec.family());

            let json = serde_json::to_string(&model).unwrap();
            let restored: FittedModel = serde_json::from_str(&json).unwrap();
            assert_eq!(restored.predict(&x), before);
        }
    }
}
