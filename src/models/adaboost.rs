//! Discrete AdaBoost (SAMME) over decision stumps.

use serde::{Deserialize, Serialize};

use super::tree::{Criterion, Tree, TreeParams};
use super::{check_training_data, targets, Estimator, ModelError, Predictor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaBoostParams {
    pub learning_rate: f64,
    pub n_estimators: usize,
}

impl Default for AdaBoostParams {
    fn default() -> Self {
        Self { learning_rate: 0.1, n_estimators: 32 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WeightedStump {
    tree: Tree,
    weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaBoost {
    stumps: Vec<WeightedStump>,
}

impl AdaBoost {
    /// Weighted vote, positive for class 1.
    pub fn decision_function(&self, row: &[f64]) -> f64 {
        self.stumps
            .iter()
            .map(|s| if s.tree.predict_value(row) > 0.5 { s.weight } else { -s.weight })
            .sum()
    }

    pub fn n_stumps(&self) -> usize {
        self.stumps.len()
    }
}

impl Estimator for AdaBoostParams {
    type Fitted = AdaBoost;

    fn fit(&self, x: &[Vec<f64>], y: &[u8]) -> Result<AdaBoost, ModelError> {
        check_training_data(x, y)?;
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ModelError::InvalidParam(format!(
                "learning_rate must be > 0, got {}",
                self.learning_rate
            )));
        }

        let targets = targets(y);
        let params = TreeParams {
            criterion: Criterion::Gini,
            max_depth: Some(1),
            ..TreeParams::default()
        };
        #[allow(clippy::cast_precision_loss)]
        let mut weights = vec![1.0 / x.len() as f64; x.len()];
        let mut stumps = Vec::with_capacity(self.n_estimators);

        for round in 0..self.n_estimators {
            let tree = Tree::fit(x, &targets, &weights, &params, None)?;
            let wrong: Vec<bool> = x
                .iter()
                .zip(y)
                .map(|(row, &c)| u8::from(tree.predict_value(row) > 0.5) != c)
                .collect();

            let total: f64 = weights.iter().sum();
            let missed: f64 = weights
                .iter()
                .zip(&wrong)
                .filter(|&(_, &miss)| miss)
                .map(|(w, _)| *w)
                .sum();
            let error = missed / total;

            if error <= 0.0 {
                stumps.push(WeightedStump { tree, weight: 1.0 });
                break;
            }
            if error >= 0.5 {
                if stumps.is_empty() {
                    stumps.push(WeightedStump { tree, weight: 1.0 });
                }
                break;
            }

            let alpha = self.learning_rate * ((1.0 - error) / error).ln();
            stumps.push(WeightedStump { tree, weight: alpha });
            if round + 1 == self.n_estimators {
                break;
            }

            for (w, &miss) in weights.iter_mut().zip(&wrong) {
                if miss && *w > 0.0 {
                    *w *= alpha.exp();
                }
            }
            let norm: f64 = weights.iter().sum();
            for w in &mut weights {
                *w /= norm;
            }
        }

        Ok(AdaBoost { stumps })
    }
}

impl Predictor for AdaBoost {
    fn predict_row(&self, row: &[f64]) -> u8 {
        u8::from(self.decision_function(row) > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{accuracy, blobs};

    #[test]
    fn test_perfect_stump_stops_early() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let y = vec![0, 0, 1, 1];
        let model = AdaBoostParams::default().fit(&x, &y).unwrap();
        assert_eq!(model.n_stumps(), 1);
        assert_eq!(model.predict(&x), y);
    }

    #[test]
    fn test_boosted_stumps_separate_blobs() {
        let (x, y) = blobs(40);
        let model = AdaBoostParams::default().fit(&x, &y).unwrap();
        assert!(model.n_stumps() >= 1);
        assert!(accuracy(&model.predict(&x), &y) > 0.9);
    }

    #[test]
    fn test_uninformative_features_keep_one_stump() {
        let x = vec![vec![1.0], vec![1.0], vec![1.0], vec![1.0]];
        let y = vec![0, 1, 0, 1];
        let model = AdaBoostParams::default().fit(&x, &y).unwrap();
        assert_eq!(model.n_stumps(), 1);
    }
}
