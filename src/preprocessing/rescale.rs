//! Rescale raw channel readings into physical units.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::PipelineError;
use crate::calibration;
use crate::dataset::SensorFrame;
use crate::types::{channel_columns, CalibrationTable};

/// Affine per-channel rescale driven by a calibration table.
///
/// Must be fit before use: fitting loads the calibration table and captures
/// the feature names of the training frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescaleTransform {
    param_path: PathBuf,
    params: Option<CalibrationTable>,
    feature_names_in: Option<Vec<String>>,
}

impl RescaleTransform {
    pub fn new(param_path: impl Into<PathBuf>) -> Self {
        Self {
            param_path: param_path.into(),
            params: None,
            feature_names_in: None,
        }
    }

    /// Load calibration from `param_path` and fit on `frame`.
    pub fn fit(&mut self, frame: &SensorFrame) -> Result<(), PipelineError> {
        let table = calibration::load(&self.param_path)?;
        self.fit_with_table(frame, table)
    }

    /// Fit on `frame` with an already loaded calibration table.
    pub fn fit_with_table(&mut self, frame: &SensorFrame, table: CalibrationTable) -> Result<(), PipelineError> {
        let required = channel_columns();
        let missing = table.missing_channels(&required);
        if !missing.is_empty() {
            return Err(PipelineError::MissingCalibration(
                missing.into_iter().map(str::to_string).collect(),
            ));
        }
        self.params = Some(table);
        self.feature_names_in = Some(frame.columns().to_vec());
        Ok(())
    }

    pub fn is_fitted(&self) -> bool {
        self.params.is_some() && self.feature_names_in.is_some()
    }

    pub fn param_path(&self) -> &Path {
        &self.param_path
    }

    pub fn params(&self) -> Option<&CalibrationTable> {
        self.params.as_ref()
    }

    pub fn feature_names_in(&self) -> Option<&[String]> {
        self.feature_names_in.as_deref()
    }

    /// Rescale every calibrated channel; other columns pass through.
    ///
    /// Returns a new frame; calibration state is never modified.
    pub fn transform(&self, frame: &SensorFrame) -> Result<SensorFrame, PipelineError> {
        let params = self.params.as_ref().ok_or(PipelineError::NotFitted("rescale"))?;

        let mapping = params
            .entries
            .iter()
            .map(|e| {
                frame
                    .column_index(&e.channel)
                    .map(|idx| (idx, e))
                    .ok_or_else(|| PipelineError::MissingFeature(e.channel.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rows = frame
            .rows()
            .iter()
            .map(|row| {
                let mut out = row.clone();
                for (idx, entry) in &mapping {
                    out[*idx] = entry.rescale(row[*idx]);
                }
                out
            })
            .collect();

        Ok(SensorFrame::new(frame.columns().to_vec(), rows)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CalibrationEntry, CHANNELS};

    fn table() -> CalibrationTable {
        CalibrationTable::new(
            CHANNELS
                .iter()
                .map(|c| CalibrationEntry {
                    channel: c.column.to_string(),
                    xmin: 0.0,
                    xmax: 2.0,
                    ymin: c.target_min,
                    ymax: c.target_max,
                })
                .collect(),
        )
    }

    fn frame() -> SensorFrame {
        SensorFrame::new(channel_columns(), vec![vec![0.0; 10], vec![2.0; 10], vec![1.0; 10]]).unwrap()
    }

    #[test]
    fn test_transform_before_fit_is_error() {
        let rescale = RescaleTransform::new("unused.json");
        let err = rescale.transform(&frame()).unwrap_err();
        assert!(matches!(err, PipelineError::NotFitted("rescale")));
    }

    #[test]
    fn test_maps_observed_range_onto_target() {
        let mut rescale = RescaleTransform::new("unused.json");
        rescale.fit_with_table(&frame(), table()).unwrap();
        let out = rescale.transform(&frame()).unwrap();
        for (i, c) in CHANNELS.iter().enumerate() {
            assert!((out.rows()[0][i] - c.target_min).abs() < 1e-9);
            assert!((out.rows()[1][i] - c.target_max).abs() < 1e-9);
        }
        // Sensor-3 midpoint: 0..2000
        assert!((out.rows()[2][2] - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_requires_all_channels() {
        let mut partial = table();
        partial.entries.truncate(9);
        let mut rescale = RescaleTransform::new("unused.json");
        let err = rescale.fit_with_table(&frame(), partial).unwrap_err();
        assert!(matches!(err, PipelineError::MissingCalibration(ref m) if m == &vec!["Sensor-10".to_string()]));
    }

    #[test]
    fn test_fit_loads_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calibration_params.json");
        calibration::save(&table(), &path).unwrap();

        let mut rescale = RescaleTransform::new(&path);
        rescale.fit(&frame()).unwrap();
        assert!(rescale.is_fitted());
        assert_eq!(rescale.feature_names_in().unwrap().len(), 10);
    }

    #[test]
    fn test_fit_with_missing_artifact_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut rescale = RescaleTransform::new(dir.path().join("absent.json"));
        assert!(matches!(rescale.fit(&frame()), Err(PipelineError::Artifact(_))));
    }
}
