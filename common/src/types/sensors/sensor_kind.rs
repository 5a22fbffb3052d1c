use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::N_SENSORS;

/// Sensor subsystems streamed from the board.
///
/// # Examples
///
/// ```
/// use common::types::sensors::SensorKind;
///
/// let sensor = SensorKind::try_from("Gyro").unwrap();
/// assert_eq!(sensor, SensorKind::Gyroscope);
/// assert_eq!(usize::from(sensor), 1);
/// assert_eq!(sensor.file_name(), "gyroscope.csv");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
    Magnetometer,
}

impl SensorKind {
    /// All sensor kinds, sorted by index
    pub const ALL: [SensorKind; N_SENSORS] = [
        SensorKind::Accelerometer,
        SensorKind::Gyroscope,
        SensorKind::Magnetometer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::Gyroscope => "gyroscope",
            SensorKind::Magnetometer => "magnetometer",
        }
    }

    /// Name of the per-sensor file inside a session directory
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name())
    }
}

impl From<&SensorKind> for usize {
    fn from(value: &SensorKind) -> Self {
        match value {
            SensorKind::Accelerometer => 0,
            SensorKind::Gyroscope => 1,
            SensorKind::Magnetometer => 2,
        }
    }
}

impl From<SensorKind> for usize {
    fn from(value: SensorKind) -> Self {
        usize::from(&value)
    }
}

impl TryFrom<&str> for SensorKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower_case_value = value.to_lowercase();
        if lower_case_value.starts_with("acc") {
            Ok(Self::Accelerometer)
        } else if lower_case_value.starts_with("gyr") {
            Ok(Self::Gyroscope)
        } else if lower_case_value.starts_with("mag") {
            Ok(Self::Magnetometer)
        } else {
            Err(format!("Unknown sensor: {value}"))
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_follows_declaration_order() {
        for (idx, kind) in SensorKind::ALL.iter().enumerate() {
            assert_eq!(usize::from(kind), idx);
        }
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!(
            SensorKind::try_from("ACCEleroMeter").unwrap(),
            SensorKind::Accelerometer
        );
        assert_eq!(
            SensorKind::try_from("gyrosCOPE").unwrap(),
            SensorKind::Gyroscope
        );
        assert_eq!(
            SensorKind::try_from("magneTometer").unwrap(),
            SensorKind::Magnetometer
        );
    }

    #[test]
    fn test_from_str_partial_match() {
        assert_eq!(SensorKind::try_from("acc").unwrap(), SensorKind::Accelerometer);
        assert_eq!(SensorKind::try_from("GyR").unwrap(), SensorKind::Gyroscope);
        assert_eq!(SensorKind::try_from("Mag").unwrap(), SensorKind::Magnetometer);
        assert!(SensorKind::try_from("barometer").is_err());
    }

    #[test]
    fn test_file_names() {
        assert_eq!(SensorKind::Accelerometer.file_name(), "accelerometer.csv");
        assert_eq!(SensorKind::Gyroscope.file_name(), "gyroscope.csv");
        assert_eq!(SensorKind::Magnetometer.file_name(), "magnetometer.csv");
    }
}
