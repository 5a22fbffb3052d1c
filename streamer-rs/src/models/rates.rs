//! Sensor configuration resolver.
//!
//! Maps a requested sampling frequency to a rate the sensor hardware supports. Each
//! sensor owns an ordered table of output data rates; the position in that table is
//! the ODR code written to the board.
//!
//! Requests outside the table follow a [`RatePolicy`]. The default policy,
//! [`RatePolicy::ExactOrDefault`], only accepts exact table values and silently
//! falls back to the sensor default otherwise, so `resolve(Accelerometer, 999.0)`
//! yields 100 Hz. [`RatePolicy::Nearest`] snaps to the closest supported value.

use serde::{Deserialize, Serialize};

use common::types::{RangeSetting, SensorKind, SensorSetup};

use crate::models::config::HardwareOptions;

/// Values closer than this are considered equal when matching a table entry
const RATE_TOLERANCE: f64 = 1e-6;

const ACCELEROMETER_RATES_HZ: [f64; 12] = [
    0.78125, 1.5625, 3.125, 6.25, 12.5, 25.0, 50.0, 100.0, 200.0, 400.0, 800.0, 1600.0,
];
const GYROSCOPE_RATES_HZ: [f64; 8] = [25.0, 50.0, 100.0, 200.0, 400.0, 800.0, 1600.0, 3200.0];
const MAGNETOMETER_RATES_HZ: [f64; 8] = [2.0, 6.0, 8.0, 10.0, 15.0, 20.0, 25.0, 30.0];

const ACCELEROMETER_RANGES_G: [f64; 4] = [2.0, 4.0, 8.0, 16.0];
const GYROSCOPE_RANGES_DPS: [f64; 5] = [125.0, 250.0, 500.0, 1000.0, 2000.0];

pub const DEFAULT_ACCELEROMETER_HZ: f64 = 100.0;
pub const DEFAULT_GYROSCOPE_HZ: f64 = 100.0;
pub const DEFAULT_MAGNETOMETER_HZ: f64 = 25.0;
pub const DEFAULT_ACCELEROMETER_RANGE_G: f64 = 16.0;
pub const DEFAULT_GYROSCOPE_RANGE_DPS: f64 = 2000.0;

/// How a request that is not an exact table value gets resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePolicy {
    /// Exact table lookup, the sensor default for anything else
    #[default]
    ExactOrDefault,
    /// Closest supported value. Ties go to the lower value.
    Nearest,
}

/// Ordered set of supported values plus the fallback used for unknown requests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateTable {
    values: &'static [f64],
    default: f64,
}

impl RateTable {
    pub fn sampling_rates(kind: SensorKind) -> Self {
        match kind {
            SensorKind::Accelerometer => Self {
                values: &ACCELEROMETER_RATES_HZ,
                default: DEFAULT_ACCELEROMETER_HZ,
            },
            SensorKind::Gyroscope => Self {
                values: &GYROSCOPE_RATES_HZ,
                default: DEFAULT_GYROSCOPE_HZ,
            },
            SensorKind::Magnetometer => Self {
                values: &MAGNETOMETER_RATES_HZ,
                default: DEFAULT_MAGNETOMETER_HZ,
            },
        }
    }

    /// Full-scale ranges. The magnetometer is driven by presets instead and has none.
    pub fn ranges(kind: SensorKind) -> Option<Self> {
        match kind {
            SensorKind::Accelerometer => Some(Self {
                values: &ACCELEROMETER_RANGES_G,
                default: DEFAULT_ACCELEROMETER_RANGE_G,
            }),
            SensorKind::Gyroscope => Some(Self {
                values: &GYROSCOPE_RANGES_DPS,
                default: DEFAULT_GYROSCOPE_RANGE_DPS,
            }),
            SensorKind::Magnetometer => None,
        }
    }

    pub fn values(&self) -> &'static [f64] {
        self.values
    }

    pub fn default_value(&self) -> f64 {
        self.default
    }

    fn position(&self, value: f64) -> Option<usize> {
        self.values
            .iter()
            .position(|v| (v - value).abs() < RATE_TOLERANCE)
    }

    fn nearest(&self, value: f64) -> usize {
        let mut best = 0;
        for (idx, v) in self.values.iter().enumerate() {
            if (v - value).abs() < (self.values[best] - value).abs() {
                best = idx;
            }
        }
        best
    }

    /// Returns the table index and value chosen for `requested`.
    pub fn resolve(&self, requested: f64, policy: RatePolicy) -> (usize, f64) {
        let idx = if !requested.is_finite() || requested <= 0.0 {
            None
        } else {
            match policy {
                RatePolicy::ExactOrDefault => self.position(requested),
                RatePolicy::Nearest => Some(self.nearest(requested)),
            }
        };
        let idx = idx
            .or_else(|| self.position(self.default))
            .unwrap_or_default();
        (idx, self.values[idx])
    }
}

/// A sampling frequency the sensor supports, chosen from a requested value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedRate {
    pub kind: SensorKind,
    pub hz: f64,
    pub odr_index: usize,
}

/// Resolves `requested_hz` for `kind` with the given policy. Never fails.
pub fn resolve_with(kind: SensorKind, requested_hz: f64, policy: RatePolicy) -> ResolvedRate {
    let (odr_index, hz) = RateTable::sampling_rates(kind).resolve(requested_hz, policy);
    if (hz - requested_hz).abs() >= RATE_TOLERANCE {
        log::debug!("{kind} rate {requested_hz} Hz resolved to {hz} Hz");
    }
    ResolvedRate {
        kind,
        hz,
        odr_index,
    }
}

/// Resolves `requested_hz` for `kind` with the exact-match-or-default policy.
pub fn resolve(kind: SensorKind, requested_hz: f64) -> ResolvedRate {
    resolve_with(kind, requested_hz, RatePolicy::default())
}

/// Combines a resolved rate with the sensor's range setting into the configuration
/// written to the board.
pub fn sensor_setup(rate: ResolvedRate, options: &HardwareOptions, policy: RatePolicy) -> SensorSetup {
    let range = match rate.kind {
        SensorKind::Accelerometer => {
            RangeSetting::Accelerometer(resolve_range(rate.kind, options.accel_range_g, policy))
        }
        SensorKind::Gyroscope => {
            RangeSetting::Gyroscope(resolve_range(rate.kind, options.gyro_range_dps, policy))
        }
        SensorKind::Magnetometer => RangeSetting::Magnetometer(options.mag_preset),
    };
    SensorSetup {
        kind: rate.kind,
        rate_hz: rate.hz,
        odr_index: rate.odr_index,
        range,
    }
}

fn resolve_range(kind: SensorKind, requested: f64, policy: RatePolicy) -> f64 {
    RateTable::ranges(kind)
        .map(|table| table.resolve(requested, policy).1)
        .unwrap_or(requested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::types::MagPreset;

    #[test]
    fn test_supported_rates_resolve_to_themselves() {
        for kind in SensorKind::ALL {
            for (idx, rate) in RateTable::sampling_rates(kind).values().iter().enumerate() {
                let resolved = resolve(kind, *rate);
                assert_eq!(resolved.hz, *rate);
                assert_eq!(resolved.odr_index, idx);
                assert_eq!(resolved.kind, kind);
            }
        }
    }

    #[test]
    fn test_table_sizes() {
        assert_eq!(RateTable::sampling_rates(SensorKind::Accelerometer).values().len(), 12);
        assert_eq!(RateTable::sampling_rates(SensorKind::Gyroscope).values().len(), 8);
        assert_eq!(RateTable::sampling_rates(SensorKind::Magnetometer).values().len(), 8);
    }

    #[test]
    fn test_unknown_accelerometer_rate_falls_back_to_default() {
        let resolved = resolve(SensorKind::Accelerometer, 999.0);
        assert_eq!(resolved.hz, 100.0);
        assert_eq!(resolved.odr_index, 7);
    }

    #[test]
    fn test_defaults_per_sensor() {
        assert_eq!(resolve(SensorKind::Accelerometer, 10.0).hz, 100.0);
        assert_eq!(resolve(SensorKind::Gyroscope, 10.0).hz, 100.0);
        assert_eq!(resolve(SensorKind::Magnetometer, 5.0).hz, 25.0);
    }

    #[test]
    fn test_invalid_requests_resolve_to_default_with_any_policy() {
        for policy in [RatePolicy::ExactOrDefault, RatePolicy::Nearest] {
            for requested in [f64::NAN, f64::INFINITY, -25.0, 0.0] {
                assert_eq!(resolve_with(SensorKind::Magnetometer, requested, policy).hz, 25.0);
            }
        }
    }

    #[test]
    fn test_resolved_value_is_always_in_table() {
        let requests = [0.1, 0.78125, 3.0, 24.9, 99.99, 100.0, 150.0, 1599.0, 5000.0, 1e9];
        for kind in SensorKind::ALL {
            let table = RateTable::sampling_rates(kind);
            for policy in [RatePolicy::ExactOrDefault, RatePolicy::Nearest] {
                for requested in requests {
                    let resolved = resolve_with(kind, requested, policy);
                    assert!(table.values().contains(&resolved.hz));
                }
            }
        }
    }

    #[test]
    fn test_nearest_policy_snaps() {
        assert_eq!(
            resolve_with(SensorKind::Accelerometer, 999.0, RatePolicy::Nearest).hz,
            800.0
        );
        assert_eq!(
            resolve_with(SensorKind::Gyroscope, 10.0, RatePolicy::Nearest).hz,
            25.0
        );
        assert_eq!(
            resolve_with(SensorKind::Magnetometer, 100.0, RatePolicy::Nearest).hz,
            30.0
        );
        // tie between 6 and 8 goes to the lower rate
        assert_eq!(
            resolve_with(SensorKind::Magnetometer, 7.0, RatePolicy::Nearest).hz,
            6.0
        );
    }

    #[test]
    fn test_sensor_setup_ranges() {
        let options = HardwareOptions {
            accel_range_g: 4.0,
            gyro_range_dps: 300.0,
            mag_preset: MagPreset::HighAccuracy,
        };
        let accel = sensor_setup(
            resolve(SensorKind::Accelerometer, 200.0),
            &options,
            RatePolicy::ExactOrDefault,
        );
        assert_eq!(accel.range, RangeSetting::Accelerometer(4.0));
        assert_eq!(accel.rate_hz, 200.0);

        let gyro = sensor_setup(
            resolve(SensorKind::Gyroscope, 100.0),
            &options,
            RatePolicy::ExactOrDefault,
        );
        assert_eq!(gyro.range, RangeSetting::Gyroscope(2000.0));

        let mag = sensor_setup(
            resolve(SensorKind::Magnetometer, 25.0),
            &options,
            RatePolicy::ExactOrDefault,
        );
        assert_eq!(mag.range, RangeSetting::Magnetometer(MagPreset::HighAccuracy));
    }
}
