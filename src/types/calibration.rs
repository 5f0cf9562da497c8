//! Calibration types: per-channel affine mapping from raw to physical units.

use serde::{Deserialize, Serialize};

/// Observed ranges narrower than this are treated as degenerate.
pub const DEGENERATE_RANGE_EPS: f64 = 1e-12;

/// Calibration for a single channel.
///
/// `xmin`/`xmax` are the raw values observed in the training data,
/// `ymin`/`ymax` the physical range they are mapped onto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationEntry {
    pub channel: String,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl CalibrationEntry {
    /// Whether the observed range collapses to a single point.
    pub fn is_degenerate(&self) -> bool {
        (self.xmax - self.xmin).abs() <= DEGENERATE_RANGE_EPS
    }

    /// Map a raw reading into physical units.
    ///
    /// Missing values (NaN) stay missing. A degenerate observed range maps
    /// every reading to `ymin`.
    pub fn rescale(&self, value: f64) -> f64 {
        if value.is_nan() {
            return value;
        }
        if self.is_degenerate() {
            return self.ymin;
        }
        let span = (self.xmax - self.xmin).max(DEGENERATE_RANGE_EPS);
        (value - self.xmin) * (self.ymax - self.ymin) / span + self.ymin
    }
}

/// Calibration for every channel, in channel order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTable {
    pub entries: Vec<CalibrationEntry>,
}

impl CalibrationTable {
    pub fn new(entries: Vec<CalibrationEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, channel: &str) -> Option<&CalibrationEntry> {
        self.entries.iter().find(|e| e.channel == channel)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Channels listed in `required` that have no entry.
    pub fn missing_channels<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
        required
            .iter()
            .filter(|ch| self.get(ch).is_none())
            .map(String::as_str)
            .collect()
    }
}
