use serde::{Deserialize, Serialize};

use super::tree::{Criterion, Tree, TreeParams};
use super::{check_training_data, targets, Estimator, ModelError, Predictor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeParams {
    pub criterion: Criterion,
    pub max_depth: Option<usize>,
}

impl Default for DecisionTreeParams {
    fn default() -> Self {
        Self { criterion: Criterion::Gini, max_depth: None }
    }
}

/// Single fully grown classification tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    tree: Tree,
}

impl DecisionTree {
    /// Fraction of positive-class training samples in the leaf `row` reaches.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        self.tree.predict_value(row)
    }

    pub const fn tree(&self) -> &Tree {
        &self.tree
    }
}

impl Estimator for DecisionTreeParams {
    type Fitted = DecisionTree;

    fn fit(&self, x: &[Vec<f64>], y: &[u8]) -> Result<DecisionTree, ModelError> {
        check_training_data(x, y)?;
        let params = TreeParams {
            criterion: self.criterion,
            max_depth: self.max_depth,
            ..TreeParams::default()
        };
        let tree = Tree::fit(x, &targets(y), &vec![1.0; x.len()], &params, None)?;
        Ok(DecisionTree { tree })
    }
}

impl Predictor for DecisionTree {
    fn predict_row(&self, row: &[f64]) -> u8 {
        u8::from(self.predict_proba(row) > 0.5)
    }
}
