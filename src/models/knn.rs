use serde::{Deserialize, Serialize};

use super::{check_training_data, Estimator, ModelError, Predictor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KNeighborsParams {
    pub n_neighbors: usize,
}

impl Default for KNeighborsParams {
    fn default() -> Self {
        Self { n_neighbors: 5 }
    }
}

/// Uniform-vote k-nearest-neighbors over Euclidean distance.
///
/// Stores the training set verbatim. Distance ties are broken by training
/// order and vote ties go to class 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNeighbors {
    n_neighbors: usize,
    rows: Vec<Vec<f64>>,
    classes: Vec<u8>,
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl KNeighbors {
    /// Effective k: never more than the number of stored rows.
    pub fn k(&self) -> usize {
        self.n_neighbors.min(self.rows.len())
    }

    /// Fraction of positive votes among the k nearest rows.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let mut ranked: Vec<(f64, usize)> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| (squared_distance(row, r), i))
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let k = self.k();
        if k == 0 {
            return 0.0;
        }
        let positives = ranked[..k].iter().filter(|(_, i)| self.classes[*i] == 1).count();
        #[allow(clippy::cast_precision_loss)]
        let proba = positives as f64 / k as f64;
        proba
    }
}

impl Estimator for KNeighborsParams {
    type Fitted = KNeighbors;

    fn fit(&self, x: &[Vec<f64>], y: &[u8]) -> Result<KNeighbors, ModelError> {
        check_training_data(x, y)?;
        if self.n_neighbors == 0 {
            return Err(ModelError::InvalidParam("n_neighbors must be > 0".to_string()));
        }
        Ok(KNeighbors {
            n_neighbors: self.n_neighbors,
            rows: x.to_vec(),
            classes: y.to_vec(),
        })
    }
}

impl Predictor for KNeighbors {
    fn predict_row(&self, row: &[f64]) -> u8 {
        u8::from(self.predict_proba(row) > 0.5)
    }
}
