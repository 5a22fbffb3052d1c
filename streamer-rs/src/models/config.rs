use serde::{Deserialize, Serialize};

use common::types::{MagPreset, SensorKind};

use crate::models::rates::{
    DEFAULT_ACCELEROMETER_HZ, DEFAULT_ACCELEROMETER_RANGE_G, DEFAULT_GYROSCOPE_HZ,
    DEFAULT_GYROSCOPE_RANGE_DPS, DEFAULT_MAGNETOMETER_HZ,
};

/// Requested sampling rate per sensor, in Hz. Values the hardware does not support
/// are resolved to defaults rather than rejected.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    pub accel: f64,
    pub gyro: f64,
    pub mag: f64,
}

impl SensorConfig {
    pub fn new(accel: f64, gyro: f64, mag: f64) -> Self {
        Self { accel, gyro, mag }
    }

    pub fn requested_hz(&self, kind: SensorKind) -> f64 {
        match kind {
            SensorKind::Accelerometer => self.accel,
            SensorKind::Gyroscope => self.gyro,
            SensorKind::Magnetometer => self.mag,
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            accel: DEFAULT_ACCELEROMETER_HZ,
            gyro: DEFAULT_GYROSCOPE_HZ,
            mag: DEFAULT_MAGNETOMETER_HZ,
        }
    }
}

/// Measurement ranges written together with the sampling rates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareOptions {
    pub accel_range_g: f64,
    pub gyro_range_dps: f64,
    pub mag_preset: MagPreset,
}

impl Default for HardwareOptions {
    fn default() -> Self {
        Self {
            accel_range_g: DEFAULT_ACCELEROMETER_RANGE_G,
            gyro_range_dps: DEFAULT_GYROSCOPE_RANGE_DPS,
            mag_preset: MagPreset::default(),
        }
    }
}

/// Number of samples written per sensor in the current session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SampleCounts {
    pub accel: u64,
    pub gyro: u64,
    pub mag: u64,
}

impl SampleCounts {
    pub fn get(&self, kind: SensorKind) -> u64 {
        match kind {
            SensorKind::Accelerometer => self.accel,
            SensorKind::Gyroscope => self.gyro,
            SensorKind::Magnetometer => self.mag,
        }
    }

    pub fn total(&self) -> u64 {
        self.accel + self.gyro + self.mag
    }
}
