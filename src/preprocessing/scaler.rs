//! Outlier-robust feature scaling: `(x - median) / IQR`.

use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median};

use super::PipelineError;

/// Per-feature centering on the median and scaling by the interquartile range.
///
/// A feature with zero IQR keeps scale 1 so constant columns only get centered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RobustScaler {
    center: Option<Vec<f64>>,
    scale: Option<Vec<f64>>,
}

impl RobustScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, rows: &[Vec<f64>]) -> Result<(), PipelineError> {
        let width = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || width == 0 {
            return Err(PipelineError::EmptyInput("scaler"));
        }

        let mut center = Vec::with_capacity(width);
        let mut scale = Vec::with_capacity(width);
        for j in 0..width {
            let mut column: Vec<f64> = rows.iter().map(|r| r[j]).filter(|v| !v.is_nan()).collect();
            if column.is_empty() {
                center.push(0.0);
                scale.push(1.0);
                continue;
            }
            column.sort_by(f64::total_cmp);

            center.push(Data::new(column.clone()).median());
            let iqr = percentile_sorted(&column, 75.0) - percentile_sorted(&column, 25.0);
            scale.push(if iqr.abs() < 10.0 * f64::EPSILON { 1.0 } else { iqr });
        }

        self.center = Some(center);
        self.scale = Some(scale);
        Ok(())
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, PipelineError> {
        let (center, scale) = match (&self.center, &self.scale) {
            (Some(c), Some(s)) => (c, s),
            _ => return Err(PipelineError::NotFitted("scaler")),
        };

        rows.iter()
            .map(|row| {
                if row.len() != center.len() {
                    return Err(PipelineError::WidthMismatch { expected: center.len(), found: row.len() });
                }
                Ok(row
                    .iter()
                    .zip(center.iter().zip(scale.iter()))
                    .map(|(x, (c, s))| (x - c) / s)
                    .collect())
            })
            .collect()
    }

    pub fn center(&self) -> Option<&[f64]> {
        self.center.as_deref()
    }

    pub fn scale(&self) -> Option<&[f64]> {
        self.scale.as_deref()
    }
}

/// Percentile of sorted data with linear interpolation between closest ranks.
pub fn percentile_sorted(sorted: &[f64], pct: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            #[allow(clippy::cast_precision_loss)]
            let pos = (pct / 100.0) * (n - 1) as f64;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            #[allow(clippy::cast_precision_loss)]
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_linear() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile_sorted(&v, 25.0) - 1.75).abs() < 1e-12);
        assert!((percentile_sorted(&v, 50.0) - 2.5).abs() < 1e-12);
        assert!((percentile_sorted(&v, 75.0) - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_median_maps_to_zero() {
        let rows: Vec<Vec<f64>> = [1.0, 2.0, 3.0, 4.0, 100.0].iter().map(|v| vec![*v]).collect();
        let mut scaler = RobustScaler::new();
        scaler.fit(&rows).unwrap();
        assert_eq!(scaler.center().unwrap(), &[3.0]);
        assert_eq!(scaler.scale().unwrap(), &[2.0]);
        let out = scaler.transform(&[vec![3.0], vec![5.0]]).unwrap();
        assert_eq!(out, vec![vec![0.0], vec![1.0]]);
    }

    #[test]
    fn test_constant_column_keeps_unit_scale() {
        let mut scaler = RobustScaler::new();
        scaler.fit(&[vec![7.0], vec![7.0], vec![7.0]]).unwrap();
        assert_eq!(scaler.scale().unwrap(), &[1.0]);
        assert_eq!(scaler.transform(&[vec![9.0]]).unwrap(), vec![vec![2.0]]);
    }

    #[test]
    fn test_unfitted_is_error() {
        let scaler = RobustScaler::new();
        assert!(matches!(scaler.transform(&[vec![1.0]]), Err(PipelineError::NotFitted("scaler"))));
    }

    #[test]
    fn test_width_mismatch() {
        let mut scaler = RobustScaler::new();
        scaler.fit(&[vec![1.0, 2.0]]).unwrap();
        assert!(matches!(
            scaler.transform(&[vec![1.0]]),
            Err(PipelineError::WidthMismatch { expected: 2, found: 1 })
        ));
    }
}
