//! Shared data structures for water-sensor fault detection
//!
//! - `channel`: the ten sensor channels, their properties and plausibility ranges
//! - `calibration`: per-channel raw → physical-unit affine mapping
//! - `prediction`: submitted readings and the outcome shown to the operator

mod channel;
mod calibration;
mod prediction;

pub use channel::*;
pub use calibration::*;
pub use prediction::*;
