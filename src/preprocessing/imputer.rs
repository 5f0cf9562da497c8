//! K-nearest-neighbor imputation of missing feature values.
//!
//! Distances use the NaN-aware Euclidean metric: only coordinates present in
//! both rows contribute, and the sum is scaled up by
//! `n_features / n_present` so rows with gaps stay comparable. Each missing
//! cell is filled with the uniform mean of the `k` nearest training rows
//! that have that feature; with no such donor the training column mean is
//! used.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::PipelineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnImputer {
    n_neighbors: usize,
    #[serde(with = "missing_cells")]
    fit_rows: Option<Vec<Vec<f64>>>,
    column_means: Vec<f64>,
}

impl KnnImputer {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors: n_neighbors.max(1),
            fit_rows: None,
            column_means: Vec::new(),
        }
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    /// Remember the training rows as donors.
    pub fn fit(&mut self, rows: &[Vec<f64>]) -> Result<(), PipelineError> {
        let width = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || width == 0 {
            return Err(PipelineError::EmptyInput("imputer"));
        }

        self.column_means = (0..width)
            .map(|j| {
                let (sum, count) = rows
                    .iter()
                    .map(|r| r[j])
                    .filter(|v| !v.is_nan())
                    .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
                if count == 0 {
                    tracing::warn!(column = j, "Column is entirely missing in training data, imputing 0");
                    0.0
                } else {
                    #[allow(clippy::cast_precision_loss)]
                    let mean = sum / count as f64;
                    mean
                }
            })
            .collect();
        self.fit_rows = Some(rows.to_vec());
        Ok(())
    }

    /// Fill every NaN in `rows` from the fitted donors.
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, PipelineError> {
        let donors = self.fit_rows.as_ref().ok_or(PipelineError::NotFitted("imputer"))?;
        let width = self.column_means.len();

        rows.iter()
            .map(|row| {
                if row.len() != width {
                    return Err(PipelineError::WidthMismatch { expected: width, found: row.len() });
                }
                if !row.iter().any(|v| v.is_nan()) {
                    return Ok(row.clone());
                }

                let distances: Vec<f64> = donors.iter().map(|d| nan_euclidean(row, d)).collect();
                let mut filled = row.clone();
                for (j, cell) in filled.iter_mut().enumerate() {
                    if cell.is_nan() {
                        *cell = self.impute_cell(donors, &distances, j);
                    }
                }
                Ok(filled)
            })
            .collect()
    }

    fn impute_cell(&self, donors: &[Vec<f64>], distances: &[f64], column: usize) -> f64 {
        let mut candidates: Vec<(f64, f64)> = donors
            .iter()
            .zip(distances.iter())
            .filter(|(d, dist)| !d[column].is_nan() && dist.is_finite())
            .map(|(d, dist)| (*dist, d[column]))
            .collect();

        if candidates.is_empty() {
            return self.column_means[column];
        }

        candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        let k = self.n_neighbors.min(candidates.len());
        #[allow(clippy::cast_precision_loss)]
        let mean = candidates[..k].iter().map(|(_, v)| v).sum::<f64>() / k as f64;
        mean
    }
}

/// Donor rows keep their gaps; JSON has no NaN, so missing cells travel as
/// `null`.
mod missing_cells {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(rows: &Option<Vec<Vec<f64>>>, s: S) -> Result<S::Ok, S::Error> {
        let wire: Option<Vec<Vec<Option<f64>>>> = rows.as_ref().map(|rows| {
            rows.iter()
                .map(|r| r.iter().map(|v| (!v.is_nan()).then_some(*v)).collect())
                .collect()
        });
        wire.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<Vec<f64>>>, D::Error> {
        let wire = Option::<Vec<Vec<Option<f64>>>>::deserialize(d)?;
        Ok(wire.map(|rows| {
            rows.into_iter()
                .map(|r| r.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
                .collect()
        }))
    }
}

/// NaN-aware Euclidean distance. NaN when the rows share no present coordinate.
pub fn nan_euclidean(a: &[f64], b: &[f64]) -> f64 {
    let (sum, present) = a
        .iter()
        .zip(b.iter())
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .fold((0.0, 0usize), |(s, n), (x, y)| (s + (x - y).powi(2), n + 1));
    if present == 0 {
        return f64::NAN;
    }
    #[allow(clippy::cast_precision_loss)]
    let weight = a.len() as f64 / present as f64;
    (weight * sum).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAN: f64 = f64::NAN;

    #[test]
    fn test_nan_euclidean_scales_for_missing() {
        assert!((nan_euclidean(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-12);
        // one of two coordinates present: sqrt(2 * 9)
        assert!((nan_euclidean(&[0.0, NAN], &[3.0, 4.0]) - 18.0_f64.sqrt()).abs() < 1e-12);
        assert!(nan_euclidean(&[NAN, 1.0], &[1.0, NAN]).is_nan());
    }

    #[test]
    fn test_fills_from_nearest_donors() {
        let train = vec![
            vec![0.0, 10.0],
            vec![1.0, 20.0],
            vec![2.0, 30.0],
            vec![100.0, 1000.0],
        ];
        let mut imputer = KnnImputer::new(3);
        imputer.fit(&train).unwrap();
        let out = imputer.transform(&[vec![1.0, NAN]]).unwrap();
        assert!((out[0][1] - 20.0).abs() < 1e-12);
        assert_eq!(out[0][0], 1.0);
    }

    #[test]
    fn test_donor_must_have_feature() {
        let train = vec![vec![0.0, NAN], vec![5.0, 7.0]];
        let mut imputer = KnnImputer::new(1);
        imputer.fit(&train).unwrap();
        let out = imputer.transform(&[vec![0.0, NAN]]).unwrap();
        assert_eq!(out[0][1], 7.0);
    }

    #[test]
    fn test_falls_back_to_column_mean() {
        let train = vec![vec![NAN, 2.0], vec![NAN, 4.0]];
        let mut imputer = KnnImputer::new(3);
        imputer.fit(&train).unwrap();
        // no overlap with any donor: all distances undefined
        let out = imputer.transform(&[vec![1.0, NAN]]).unwrap();
        assert!((out[0][1] - 3.0).abs() < 1e-12);
        assert_eq!(out[0][0], 1.0);
    }

    #[test]
    fn test_complete_rows_untouched() {
        let mut imputer = KnnImputer::new(3);
        imputer.fit(&[vec![1.0, 2.0]]).unwrap();
        assert_eq!(imputer.transform(&[vec![9.0, 9.0]]).unwrap(), vec![vec![9.0, 9.0]]);
    }

    #[test]
    fn test_gaps_survive_json_round_trip() {
        let mut imputer = KnnImputer::new(1);
        imputer.fit(&[vec![1.0, NAN], vec![2.0, 3.0]]).unwrap();

        let json = serde_json::to_string(&imputer).unwrap();
        assert!(json.contains("[1.0,null]"));
        let loaded: KnnImputer = serde_json::from_str(&json).unwrap();

        let donors = loaded.fit_rows.as_ref().unwrap();
        assert_eq!(donors[0][0], 1.0);
        assert!(donors[0][1].is_nan());
        assert_eq!(donors[1], vec![2.0, 3.0]);
        // the donor without the feature is still skipped after reload
        let out = loaded.transform(&[vec![1.0, NAN]]).unwrap();
        assert_eq!(out[0][1], 3.0);
    }

    #[test]
    fn test_unfitted_survives_json_round_trip() {
        let json = serde_json::to_string(&KnnImputer::new(2)).unwrap();
        let loaded: KnnImputer = serde_json::from_str(&json).unwrap();
        assert!(matches!(loaded.transform(&[vec![1.0]]), Err(PipelineError::NotFitted("imputer"))));
    }

    #[test]
    fn test_unfitted_is_error() {
        let imputer = KnnImputer::new(3);
        assert!(matches!(imputer.transform(&[vec![1.0]]), Err(PipelineError::NotFitted("imputer"))));
    }
}
