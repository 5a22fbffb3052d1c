use std::f64::consts::TAU;

use common::types::{SensorKind, XYZ};

/// Frequency of the simulated wrist motion, in Hz
const MOTION_HZ: f64 = 0.5;
/// Earth's field in the board frame, in uT
const EARTH_FIELD_UT: [f64; 3] = [22.0, -4.5, 41.0];

/// Noise-free readings of a board swaying gently around a resting position.
/// Accelerometer in g, gyroscope in deg/s, magnetometer in uT.
pub(super) fn reading(kind: SensorKind, t_millis: f64) -> XYZ {
    let phase = TAU * MOTION_HZ * t_millis / 1000.0;
    match kind {
        SensorKind::Accelerometer => XYZ::new([0.05 * phase.sin(), 0.05 * phase.cos(), 1.0]),
        SensorKind::Gyroscope => XYZ::new([
            15.0 * phase.cos(),
            -15.0 * phase.sin(),
            2.0 * (2.0 * phase).sin(),
        ]),
        SensorKind::Magnetometer => {
            let [x, y, z] = EARTH_FIELD_UT;
            let tilt = 0.1 * phase.sin();
            XYZ::new([
                x * tilt.cos() - y * tilt.sin(),
                x * tilt.sin() + y * tilt.cos(),
                z,
            ])
        }
    }
}

/// Device-local sample clock of one sensor.
pub(super) struct SampleClock {
    period_millis: f64,
    next_millis: f64,
}

impl SampleClock {
    pub(super) fn new(start_millis: i64, rate_hz: f64) -> Self {
        Self {
            period_millis: 1000.0 / rate_hz,
            next_millis: start_millis as f64,
        }
    }

    /// Timestamps of the samples acquired up to `until_millis`, inclusive.
    pub(super) fn advance(&mut self, until_millis: f64) -> Vec<f64> {
        let mut stamps = Vec::new();
        while self.next_millis <= until_millis {
            stamps.push(self.next_millis);
            self.next_millis += self.period_millis;
        }
        stamps
    }
}
