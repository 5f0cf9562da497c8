//! Stratified k-fold cross-validation.
//!
//! Folds are built without shuffling: each class's row indices, in dataset
//! order, are cut into `k` contiguous chunks whose sizes differ by at most
//! one, and fold `f` takes chunk `f` of every class. Every row lands in
//! exactly one test fold.

use tracing::warn;

use super::metrics::accuracy;
use super::TrainingError;
use crate::models::{ModelSpec, Predictor};

/// Test-index sets for `k` stratified folds over class labels `y`.
pub fn stratified_folds(y: &[u8], k: usize) -> Result<Vec<Vec<usize>>, TrainingError> {
    if k < 2 || y.len() < k {
        return Err(TrainingError::TooFewRows { folds: k, rows: y.len() });
    }

    let mut folds = vec![Vec::new(); k];
    for class in [0u8, 1] {
        let members: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
        if !members.is_empty() && members.len() < k {
            warn!(class, members = members.len(), folds = k, "Least populated class has fewer members than folds");
        }
        let base = members.len() / k;
        let extra = members.len() % k;
        let mut start = 0;
        for (f, fold) in folds.iter_mut().enumerate() {
            let size = base + usize::from(f < extra);
            fold.extend_from_slice(&members[start..start + size]);
            start += size;
        }
    }

    for fold in &mut folds {
        fold.sort_unstable();
    }
    Ok(folds)
}

/// Accuracy of `spec` on each held-out fold after fitting on the rest.
pub fn cross_val_scores(
    spec: &ModelSpec,
    x: &[Vec<f64>],
    y: &[u8],
    folds: &[Vec<usize>],
) -> Result<Vec<f64>, TrainingError> {
    let mut scores = Vec::with_capacity(folds.len());
    let mut in_test = vec![false; y.len()];

    for fold in folds {
        in_test.iter_mut().for_each(|t| *t = false);
        for &i in fold {
            in_test[i] = true;
        }

        let (mut x_fit, mut y_fit) = (Vec::new(), Vec::new());
        for i in (0..y.len()).filter(|&i| !in_test[i]) {
            x_fit.push(x[i].clone());
            y_fit.push(y[i]);
        }
        let x_val: Vec<Vec<f64>> = fold.iter().map(|&i| x[i].clone()).collect();
        let y_val: Vec<u8> = fold.iter().map(|&i| y[i]).collect();

        let model = spec.fit(&x_fit, &y_fit).map_err(|e| TrainingError::model(spec, e))?;
        scores.push(accuracy(&model.predict(&x_val), &y_val));
    }

    Ok(scores)
}
