//! Prediction inputs and outcomes.

use serde::{Deserialize, Serialize};

use super::channel::{CHANNELS, NUM_CHANNELS};

/// Ten raw channel readings for a single sample, in channel order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub values: [f64; NUM_CHANNELS],
}

impl SensorReading {
    pub fn new(values: [f64; NUM_CHANNELS]) -> Self {
        Self { values }
    }

    /// Column-name / value pairs (`Sensor-1` .. `Sensor-10`).
    pub fn named_values(&self) -> Vec<(String, f64)> {
        CHANNELS
            .iter()
            .zip(self.values.iter())
            .map(|(c, v)| (c.column.to_string(), *v))
            .collect()
    }
}

/// Result shown to the operator for one submitted sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionOutcome {
    /// Model says the sensor is healthy
    Good,
    /// Model says the sensor is faulty
    Faulty,
    /// A reading fell outside its plausibility range; the model was not run
    OutOfRange,
}

impl PredictionOutcome {
    /// Map a predicted dataset label to an outcome. Label `1` means good.
    pub fn from_label(label: i64) -> Self {
        if label == 1 {
            Self::Good
        } else {
            Self::Faulty
        }
    }

    pub fn is_range_violation(&self) -> bool {
        matches!(self, Self::OutOfRange)
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Good => "Good Water Sensor",
            Self::Faulty => "Faulty Water Sensor",
            Self::OutOfRange => "Faulty Water Sensor (out of range values)",
        }
    }
}

impl std::fmt::Display for PredictionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
