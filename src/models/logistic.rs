//! L2-regularized logistic regression solved with damped Newton steps.
//!
//! Minimizes `Σ logloss + ‖w‖² / (2C)`; the intercept is not penalized.

use serde::{Deserialize, Serialize};

use super::{check_training_data, Estimator, ModelError, Predictor};

const GRAD_TOL: f64 = 1e-6;
const MAX_HALVINGS: usize = 30;
const RIDGE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    pub c: f64,
    pub max_iter: usize,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self { c: 1.0, max_iter: 500 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    coefficients: Vec<f64>,
    intercept: f64,
    iterations: usize,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// `ln(1 + e^z)` without overflow.
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

fn linear(theta: &[f64], row: &[f64]) -> f64 {
    let n = row.len();
    theta[n] + row.iter().zip(theta).map(|(x, w)| x * w).sum::<f64>()
}

fn objective(theta: &[f64], x: &[Vec<f64>], y: &[f64], c: f64) -> f64 {
    let n = theta.len() - 1;
    let loss: f64 = x
        .iter()
        .zip(y)
        .map(|(row, &t)| {
            let z = linear(theta, row);
            softplus(z) - t * z
        })
        .sum();
    let penalty: f64 = theta[..n].iter().map(|w| w * w).sum::<f64>() / (2.0 * c);
    loss + penalty
}

/// Solve `a · v = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-300 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut v = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * v[k]).sum();
        v[row] = (b[row] - tail) / a[row][row];
    }
    Some(v)
}

impl LogisticRegression {
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub const fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Newton iterations used before convergence (or `max_iter`).
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn decision_function(&self, row: &[f64]) -> f64 {
        self.intercept + row.iter().zip(&self.coefficients).map(|(x, w)| x * w).sum::<f64>()
    }

    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        sigmoid(self.decision_function(row))
    }
}

impl Estimator for LogisticParams {
    type Fitted = LogisticRegression;

    fn fit(&self, x: &[Vec<f64>], y: &[u8]) -> Result<LogisticRegression, ModelError> {
        let n_features = check_training_data(x, y)?;
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(ModelError::InvalidParam(format!("C must be > 0, got {}", self.c)));
        }

        let y: Vec<f64> = y.iter().map(|&c| f64::from(c)).collect();
        let dim = n_features + 1;
        let mut theta = vec![0.0; dim];
        let mut iterations = 0;

        for _ in 0..self.max_iter {
            let mut grad = vec![0.0; dim];
            let mut hess = vec![vec![0.0; dim]; dim];
            for (row, &t) in x.iter().zip(&y) {
                let p = sigmoid(linear(&theta, row));
                let r = p - t;
                let s = p * (1.0 - p);
                for j in 0..dim {
                    let xj = if j < n_features { row[j] } else { 1.0 };
                    grad[j] += r * xj;
                    for k in j..dim {
                        let xk = if k < n_features { row[k] } else { 1.0 };
                        hess[j][k] += s * xj * xk;
                    }
                }
            }
            for j in 0..dim {
                if j < n_features {
                    grad[j] += theta[j] / self.c;
                    hess[j][j] += 1.0 / self.c;
                }
                hess[j][j] += RIDGE;
                for k in 0..j {
                    hess[j][k] = hess[k][j];
                }
            }

            if grad.iter().all(|g| g.abs() < GRAD_TOL) {
                break;
            }
            iterations += 1;

            let direction = solve(hess, grad.clone()).unwrap_or_else(|| grad.clone());
            let slope: f64 = grad.iter().zip(&direction).map(|(g, d)| g * d).sum();
            let current = objective(&theta, x, &y, self.c);

            let mut step = 1.0;
            let mut next = theta.clone();
            for _ in 0..MAX_HALVINGS {
                for j in 0..dim {
                    next[j] = theta[j] - step * direction[j];
                }
                if objective(&next, x, &y, self.c) <= current - 1e-4 * step * slope {
                    break;
                }
                step *= 0.5;
            }
            theta = next;
        }

        let intercept = theta[n_features];
        theta.truncate(n_features);
        Ok(LogisticRegression { coefficients: theta, intercept, iterations })
    }
}

impl Predictor for LogisticRegression {
    fn predict_row(&self, row: &[f64]) -> u8 {
        u8::from(self.decision_function(row) > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{accuracy, blobs};

    #[test]
    fn test_solve_small_system() {
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let v = solve(a, vec![3.0, 5.0]).unwrap();
        assert!((v[0] - 0.8).abs() < 1e-12);
        assert!((v[1] - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_solve_singular() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert!(solve(a, vec![1.0, 2.0]).is_none());
    }

    #[test]
    fn test_softplus_is_stable() {
        assert!((softplus(0.0) - 2f64.ln()).abs() < 1e-12);
        assert!((softplus(800.0) - 800.0).abs() < 1e-9);
        assert!(softplus(-800.0) >= 0.0);
    }

    #[test]
    fn test_separates_blobs() {
        let (x, y) = blobs(40);
        let model = LogisticParams::default().fit(&x, &y).unwrap();
        assert!(accuracy(&model.predict(&x), &y) > 0.95);
        assert!(model.coefficients().iter().all(|w| *w > 0.0));
        assert!(model.iterations() < 50);
    }

    #[test]
    fn test_balanced_symmetric_data_has_zero_intercept() {
        let x = vec![vec![-1.0], vec![-2.0], vec![1.0], vec![2.0]];
        let y = vec![0, 0, 1, 1];
        let model = LogisticParams::default().fit(&x, &y).unwrap();
        assert!(model.intercept().abs() < 1e-6);
        assert!((model.predict_proba(&[0.0]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_stronger_penalty_shrinks_weights() {
        let (x, y) = blobs(30);
        let loose = LogisticParams { c: 10.0, max_iter: 100 }.fit(&x, &y).unwrap();
        let tight = LogisticParams { c: 0.01, max_iter: 100 }.fit(&x, &y).unwrap();
        let norm = |m: &LogisticRegression| m.coefficients().iter().map(|w| w * w).sum::<f64>();
        assert!(norm(&tight) < norm(&loose));
    }
}
