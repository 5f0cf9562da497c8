//! Channel catalogue: the ten sensor channels and their physical properties.

use serde::{Deserialize, Serialize};

/// Number of sensor channels fed to the classifier.
pub const NUM_CHANNELS: usize = 10;

/// Static description of one sensor channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSpec {
    /// Column name in the training CSV (`Sensor-N`)
    pub column: &'static str,
    /// Form field name on the web page (`sensor_N`)
    pub field: &'static str,
    /// Water property measured by this channel
    pub property: &'static str,
    /// Lower bound of the physical target range
    pub target_min: f64,
    /// Upper bound of the physical target range
    pub target_max: f64,
}

impl ChannelSpec {
    /// Target physical range as a `(min, max)` pair.
    pub const fn target_range(&self) -> (f64, f64) {
        (self.target_min, self.target_max)
    }
}

/// All channels in training-column order.
pub const CHANNELS: [ChannelSpec; NUM_CHANNELS] = [
    ChannelSpec { column: "Sensor-1", field: "sensor_1", property: "pH", target_min: 0.0, target_max: 14.0 },
    ChannelSpec { column: "Sensor-2", field: "sensor_2", property: "Turbidity", target_min: 0.0, target_max: 100.0 },
    ChannelSpec { column: "Sensor-3", field: "sensor_3", property: "Conductivity", target_min: 0.0, target_max: 2000.0 },
    ChannelSpec { column: "Sensor-4", field: "sensor_4", property: "Dissolved Oxygen", target_min: 0.0, target_max: 50.0 },
    ChannelSpec { column: "Sensor-5", field: "sensor_5", property: "Chlorine Level", target_min: 0.0, target_max: 10.0 },
    ChannelSpec { column: "Sensor-6", field: "sensor_6", property: "Nitrate", target_min: 0.0, target_max: 50.0 },
    ChannelSpec { column: "Sensor-7", field: "sensor_7", property: "Hardness", target_min: 0.0, target_max: 14.0 },
    ChannelSpec { column: "Sensor-8", field: "sensor_8", property: "Temperature", target_min: 0.0, target_max: 500.0 },
    ChannelSpec { column: "Sensor-9", field: "sensor_9", property: "Iron Content", target_min: 0.0, target_max: 200.0 },
    ChannelSpec { column: "Sensor-10", field: "sensor_10", property: "BOD", target_min: 0.0, target_max: 10.0 },
];

/// Training-column names in channel order.
pub fn channel_columns() -> Vec<String> {
    CHANNELS.iter().map(|c| c.column.to_string()).collect()
}

/// Look up a channel by its CSV column name.
pub fn channel_by_column(column: &str) -> Option<&'static ChannelSpec> {
    CHANNELS.iter().find(|c| c.column == column)
}

/// Inclusive plausibility range for a raw reading submitted through the form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlausibleRange {
    pub min: f64,
    pub max: f64,
}

impl PlausibleRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within `[min, max]`. NaN is never in range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Default plausibility ranges: the static target ranges of each channel.
pub fn default_plausible_ranges() -> Vec<PlausibleRange> {
    CHANNELS
        .iter()
        .map(|c| PlausibleRange::new(c.target_min, c.target_max))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_order_matches_columns() {
        for (i, c) in CHANNELS.iter().enumerate() {
            assert_eq!(c.column, format!("Sensor-{}", i + 1));
            assert_eq!(c.field, format!("sensor_{}", i + 1));
        }
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let r = PlausibleRange::new(0.0, 14.0);
        assert!(r.contains(0.0));
        assert!(r.contains(14.0));
        assert!(!r.contains(14.0001));
        assert!(!r.contains(-0.1));
        assert!(!r.contains(f64::NAN));
    }

    #[test]
    fn test_lookup_by_column() {
        let ph = channel_by_column("Sensor-1").unwrap();
        assert_eq!(ph.property, "pH");
        assert!(channel_by_column("Sensor-11").is_none());
    }
}
