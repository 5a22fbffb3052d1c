//! General functionality for `imu-streamer` library
//!
//! Shared vocabulary between the streaming core, the device adapters and the test
//! doubles: sensor kinds, timed 3-axis samples, device descriptions and the ports
//! a wireless transport must implement.

pub mod constants;

#[doc(hidden)]
pub mod traits;
#[doc(hidden)]
pub mod types;

// Re-export traits
#[doc(inline)]
pub use traits::transport::{BoardPort, RoutePort, TransportPort};
#[doc(inline)]
pub use traits::Notifiable;

// Re-export types
#[doc(inline)]
pub use types::{
    BatteryState, Callback, Clock, ConnectionParameters, DeviceAddress, DisconnectCallback,
    MagPreset, RangeSetting, Sample, SampleCallback, SensorKind, SensorSetup, XYZ,
};
