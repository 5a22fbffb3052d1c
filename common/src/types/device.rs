use serde::{Deserialize, Serialize};
use std::fmt;

const MAC_OCTETS: usize = 6;

/// Physical address of a wireless board, normalized to upper case
/// `XX:XX:XX:XX:XX:XX`.
///
/// # Examples
///
/// ```
/// use common::types::DeviceAddress;
///
/// let address = DeviceAddress::try_from("d4:5e:82:e1:15:01").unwrap();
/// assert_eq!(address.as_str(), "D4:5E:82:E1:15:01");
/// assert!(DeviceAddress::try_from("not-a-mac").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeviceAddress(String);

impl DeviceAddress {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<&str> for DeviceAddress {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let octets: Vec<&str> = value.trim().split(':').collect();
        let well_formed = octets.len() == MAC_OCTETS
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()));
        if !well_formed {
            return Err(format!("Invalid device address: {value}"));
        }
        Ok(Self(octets.join(":").to_uppercase()))
    }
}

impl TryFrom<String> for DeviceAddress {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DeviceAddress::try_from(value.as_str())
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Link layer parameters requested right after a connection is established.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionParameters {
    pub min_interval_ms: f64,
    pub max_interval_ms: f64,
    pub latency: u16,
    pub supervision_timeout_ms: u16,
}

impl Default for ConnectionParameters {
    fn default() -> Self {
        Self {
            min_interval_ms: 7.5,
            max_interval_ms: 7.5,
            latency: 0,
            supervision_timeout_ms: 6000,
        }
    }
}

/// Battery reading reported by the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BatteryState {
    /// Charge in percent
    pub charge: u8,
    /// Voltage in millivolts
    pub voltage_mv: u16,
}
