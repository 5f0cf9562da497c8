//! Gradient boosting on the binomial deviance.
//!
//! Starts from the log-odds of the positive class, then fits depth-3
//! regression trees to the residuals `y - p` and replaces each leaf value
//! with the one-step Newton update `Σ(y - p) / Σp(1 - p)`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::tree::{Criterion, Tree, TreeParams};
use super::{check_training_data, targets, Estimator, ModelError, Predictor};

const MAX_DEPTH: usize = 3;
const PROB_EPS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingParams {
    pub learning_rate: f64,
    pub n_estimators: usize,
}

impl Default for GradientBoostingParams {
    fn default() -> Self {
        Self { learning_rate: 0.1, n_estimators: 32 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoosting {
    init: f64,
    learning_rate: f64,
    trees: Vec<Tree>,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl GradientBoosting {
    /// Raw log-odds score.
    pub fn decision_function(&self, row: &[f64]) -> f64 {
        self.init
            + self.learning_rate * self.trees.iter().map(|t| t.predict_value(row)).sum::<f64>()
    }

    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        sigmoid(self.decision_function(row))
    }
}

impl Estimator for GradientBoostingParams {
    type Fitted = GradientBoosting;

    fn fit(&self, x: &[Vec<f64>], y: &[u8]) -> Result<GradientBoosting, ModelError> {
        check_training_data(x, y)?;
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ModelError::InvalidParam(format!(
                "learning_rate must be > 0, got {}",
                self.learning_rate
            )));
        }

        let y = targets(y);
        #[allow(clippy::cast_precision_loss)]
        let prior = (y.iter().sum::<f64>() / y.len() as f64).clamp(PROB_EPS, 1.0 - PROB_EPS);
        let init = (prior / (1.0 - prior)).ln();

        let params = TreeParams {
            criterion: Criterion::SquaredError,
            max_depth: Some(MAX_DEPTH),
            ..TreeParams::default()
        };
        let weights = vec![1.0; x.len()];
        let mut scores = vec![init; x.len()];
        let mut trees = Vec::with_capacity(self.n_estimators);

        for _ in 0..self.n_estimators {
            let probs: Vec<f64> = scores.iter().map(|&s| sigmoid(s)).collect();
            let residuals: Vec<f64> = y.iter().zip(&probs).map(|(t, p)| t - p).collect();

            let mut tree = Tree::fit(x, &residuals, &weights, &params, None)?;

            let mut leaf_sums: HashMap<usize, (f64, f64)> = HashMap::new();
            for (i, row) in x.iter().enumerate() {
                let entry = leaf_sums.entry(tree.apply(row)).or_insert((0.0, 0.0));
                entry.0 += residuals[i];
                entry.1 += probs[i] * (1.0 - probs[i]);
            }
            for (leaf, (num, den)) in leaf_sums {
                let value = if den.abs() < 1e-150 { 0.0 } else { num / den };
                tree.set_leaf_value(leaf, value);
            }

            for (score, row) in scores.iter_mut().zip(x) {
                *score += self.learning_rate * tree.predict_value(row);
            }
            trees.push(tree);
        }

        Ok(GradientBoosting { init, learning_rate: self.learning_rate, trees })
    }
}

impl Predictor for GradientBoosting {
    fn predict_row(&self, row: &[f64]) -> u8 {
        u8::from(self.decision_function(row) > 0.0)
    }
}
