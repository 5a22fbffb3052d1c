//! Ports a wireless transport stack must implement to be driven by the streamer.
//!
//! Errors crossing these ports are plain `String` causes; the streaming core wraps
//! them into its own error kinds.

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::{
    BatteryState, ConnectionParameters, DeviceAddress, DisconnectCallback, SampleCallback,
    SensorKind, SensorSetup,
};

/// Wireless service able to hand out boards by physical address.
pub trait TransportPort: Send + Sync {
    /// Binds the underlying service. Called at construction and on every re-initialize.
    fn bind(&self) -> Result<(), String>;
    /// Releases the service binding.
    fn unbind(&self);
    /// Returns false once the binding is lost, until the next successful `bind`.
    fn is_bound(&self) -> bool;
    /// Resolves an address into a board. The link is not opened.
    fn board(&self, address: &DeviceAddress) -> Result<Arc<dyn BoardPort>, String>;
}

/// A multi-sensor board reachable over the wireless link.
#[async_trait]
pub trait BoardPort: Send + Sync {
    /// Opens the link. Resolves once the transport confirms the connection.
    async fn connect(&self) -> Result<(), String>;
    async fn disconnect(&self) -> Result<(), String>;
    fn is_connected(&self) -> bool;
    /// Registers the handler invoked when the link drops unexpectedly.
    fn on_unexpected_disconnect(&self, handler: DisconnectCallback);
    async fn set_connection_parameters(&self, params: &ConnectionParameters)
        -> Result<(), String>;
    /// Writes rate and range configuration to one sensor subsystem.
    async fn configure(&self, setup: &SensorSetup) -> Result<(), String>;
    /// Subscribes `on_sample` to the sensor's output signal.
    async fn open_route(
        &self,
        kind: SensorKind,
        on_sample: SampleCallback,
    ) -> Result<Box<dyn RoutePort>, String>;
    async fn read_battery(&self) -> Result<BatteryState, String>;
    /// Soft reset. The board drops the link afterwards.
    async fn reset(&self) -> Result<(), String>;
}

/// Live subscription to one sensor. `start` and `stop` enable and disable sampling
/// on the board.
#[async_trait]
pub trait RoutePort: Send + Sync {
    async fn start(&self) -> Result<(), String>;
    async fn stop(&self) -> Result<(), String>;
}
