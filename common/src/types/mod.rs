pub mod callback;
pub mod clock;
pub mod device;
pub mod sensors;
pub mod timed;
pub mod untimed;

pub use callback::{Callback, DisconnectCallback, SampleCallback};
pub use clock::Clock;
pub use device::{BatteryState, ConnectionParameters, DeviceAddress};
pub use sensors::{MagPreset, RangeSetting, SensorKind, SensorSetup};
pub use timed::Sample;
pub use untimed::XYZ;
