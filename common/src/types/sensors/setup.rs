use serde::{Deserialize, Serialize};

use crate::types::sensors::SensorKind;

/// Magnetometer operating presets. Each preset fixes the output data rate
/// ceiling and the number of repetitions averaged per reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagPreset {
    LowPower,
    #[default]
    Regular,
    EnhancedRegular,
    HighAccuracy,
}

/// Measurement range applied together with the sampling rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RangeSetting {
    /// Full scale in g
    Accelerometer(f64),
    /// Full scale in degrees per second
    Gyroscope(f64),
    Magnetometer(MagPreset),
}

/// Hardware configuration for one sensor subsystem, already validated against the
/// values the board supports.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorSetup {
    pub kind: SensorKind,
    /// Output data rate in Hz
    pub rate_hz: f64,
    /// Position of `rate_hz` in the sensor's supported-rate table
    pub odr_index: usize,
    pub range: RangeSetting,
}
