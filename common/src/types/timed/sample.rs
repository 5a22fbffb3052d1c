use crate::constants::N_XYZ_COORDINATES;
use crate::types::sensors::SensorKind;
use crate::types::untimed::XYZ;

/// A 3-axis reading stamped with the device-local acquisition time.
///
/// # Examples
///
/// ```
/// use common::types::{Sample, SensorKind, XYZ};
///
/// let sample = Sample::new(SensorKind::Accelerometer, 1_627_846_267_000, [1.0, 2.0, 3.0]);
///
/// assert_eq!(sample.timestamp_millis(), 1_627_846_267_000);
/// assert_eq!(sample.measurement(), &XYZ::from([1.0, 2.0, 3.0]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    kind: SensorKind,
    timestamp_millis: i64,
    measurement: XYZ,
}

impl Sample {
    pub fn new(kind: SensorKind, timestamp_millis: i64, measurement: [f64; N_XYZ_COORDINATES]) -> Self {
        Self {
            kind,
            timestamp_millis,
            measurement: XYZ::new(measurement),
        }
    }

    pub fn from_xyz(kind: SensorKind, timestamp_millis: i64, measurement: XYZ) -> Self {
        Self {
            kind,
            timestamp_millis,
            measurement,
        }
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp_millis
    }

    pub fn measurement(&self) -> &XYZ {
        &self.measurement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_new() {
        let sample = Sample::new(SensorKind::Gyroscope, 42, [1.0, 2.0, 3.0]);

        assert_eq!(sample.kind(), SensorKind::Gyroscope);
        assert_eq!(sample.timestamp_millis(), 42);
        assert_eq!(sample.measurement().inner(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sample_from_xyz() {
        let xyz = XYZ::new([0.5, -0.5, 9.81]);
        let sample = Sample::from_xyz(SensorKind::Accelerometer, 7, xyz.clone());

        assert_eq!(sample.measurement(), &xyz);
    }
}
