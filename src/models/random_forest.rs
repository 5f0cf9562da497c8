//! Bagged decision trees with per-split feature subsampling.
//!
//! Each tree sees a bootstrap sample of the training rows (encoded as
//! integer sample weights) and considers `⌊√n_features⌋` candidate features
//! at every split. Prediction averages the trees' leaf probabilities.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{Criterion, Tree, TreeParams};
use super::{check_training_data, targets, Estimator, ModelError, Predictor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestParams {
    pub n_estimators: usize,
    pub criterion: Criterion,
    pub seed: u64,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self { n_estimators: 32, criterion: Criterion::Gini, seed: 42 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<Tree>,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn sqrt_features(n_features: usize) -> usize {
    ((n_features as f64).sqrt().floor() as usize).max(1)
}

impl RandomForest {
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_value(row)).sum();
        #[allow(clippy::cast_precision_loss)]
        let n = self.trees.len() as f64;
        sum / n
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Estimator for RandomForestParams {
    type Fitted = RandomForest;

    fn fit(&self, x: &[Vec<f64>], y: &[u8]) -> Result<RandomForest, ModelError> {
        let n_features = check_training_data(x, y)?;
        if self.n_estimators == 0 {
            return Err(ModelError::InvalidParam("n_estimators must be > 0".to_string()));
        }

        let y = targets(y);
        let n = x.len();
        let params = TreeParams {
            criterion: self.criterion,
            max_features: Some(sqrt_features(n_features)),
            ..TreeParams::default()
        };

        let mut master = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_estimators);
        for _ in 0..self.n_estimators {
            let mut tree_rng = StdRng::seed_from_u64(master.gen());
            let mut weights = vec![0.0; n];
            for _ in 0..n {
                weights[tree_rng.gen_range(0..n)] += 1.0;
            }
            trees.push(Tree::fit(x, &y, &weights, &params, Some(&mut tree_rng))?);
        }

        Ok(RandomForest { trees })
    }
}

impl Predictor for RandomForest {
    fn predict_row(&self, row: &[f64]) -> u8 {
        u8::from(self.predict_proba(row) > 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{accuracy, blobs};

    #[test]
    fn test_sqrt_features() {
        assert_eq!(sqrt_features(1), 1);
        assert_eq!(sqrt_features(10), 3);
        assert_eq!(sqrt_features(16), 4);
    }

    #[test]
    fn test_forest_separates_blobs() {
        let (x, y) = blobs(40);
        let params = RandomForestParams { n_estimators: 16, ..RandomForestParams::default() };
        let model = params.fit(&x, &y).unwrap();
        assert_eq!(model.n_trees(), 16);
        assert!(accuracy(&model.predict(&x), &y) > 0.95);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = blobs(20);
        let params = RandomForestParams { n_estimators: 8, ..RandomForestParams::default() };
        let a = params.fit(&x, &y).unwrap();
        let b = params.fit(&x, &y).unwrap();
        let probe = vec![0.1, -0.2];
        assert_eq!(a.predict_proba(&probe), b.predict_proba(&probe));
    }

    #[test]
    fn test_zero_estimators_rejected() {
        let (x, y) = blobs(5);
        let params = RandomForestParams { n_estimators: 0, ..RandomForestParams::default() };
        assert!(matches!(params.fit(&x, &y), Err(ModelError::InvalidParam(_))));
    }
}
