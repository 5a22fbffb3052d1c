pub mod sensor_kind;
pub mod setup;

pub use crate::types::sensors::sensor_kind::SensorKind;
pub use crate::types::sensors::setup::{MagPreset, RangeSetting, SensorSetup};
