pub mod config;
pub mod errors;
pub mod rates;
pub mod shutdown;
pub mod state;

pub use config::{SampleCounts, SensorConfig};
pub use errors::StreamerError;
pub use rates::{RatePolicy, RateTable};
pub use state::{ConnectionState, SessionState};
