//! Connection manager: owns the transport binding and the single device link.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use common::traits::{BoardPort, TransportPort};
use common::types::{BatteryState, ConnectionParameters, DeviceAddress, DisconnectCallback};

use crate::helpers::with_timeout;
use crate::models::{ConnectionState, StreamerError};

/// Shared reference to a board the manager connected to. Clones observe the same
/// connection state, so a link drop reported by the board is visible to every holder.
#[derive(Clone)]
pub struct DeviceHandle {
    id: Uuid,
    address: DeviceAddress,
    state: Arc<RwLock<ConnectionState>>,
    board: Arc<dyn BoardPort>,
}

impl DeviceHandle {
    fn new(address: DeviceAddress, board: Arc<dyn BoardPort>) -> Self {
        Self {
            id: Uuid::new_v4(),
            address,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            board,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn address(&self) -> &DeviceAddress {
        &self.address
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub(crate) fn board(&self) -> &dyn BoardPort {
        self.board.as_ref()
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    /// Moves a `Connecting` handle to `Connected`. False when the link dropped since.
    fn finish_connecting(&self) -> bool {
        let mut state = self.state.write();
        if *state != ConnectionState::Connecting {
            return false;
        }
        *state = ConnectionState::Connected;
        true
    }

    fn link_loss_handler(&self) -> DisconnectCallback {
        let state = self.state.clone();
        let address = self.address.clone();
        Arc::new(move || {
            let mut state = state.write();
            if *state != ConnectionState::Disconnected {
                log::warn!("Lost connection to {}", address);
                *state = ConnectionState::Disconnected;
            }
        })
    }
}

impl fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("id", &self.id)
            .field("address", &self.address)
            .field("state", &self.state())
            .finish()
    }
}

/// Connects to one board at a time through an injected transport.
///
/// The transport is bound when the manager is built and on [`reinitialize`], and
/// released on [`teardown`] or drop. While unbound every operation fails with
/// [`StreamerError::ServiceUnavailable`].
///
/// [`reinitialize`]: ConnectionManager::reinitialize
/// [`teardown`]: ConnectionManager::teardown
pub struct ConnectionManager<T>
where
    T: TransportPort,
{
    transport: Arc<T>,
    parameters: ConnectionParameters,
    command_timeout: Option<Duration>,
    device: Mutex<Option<DeviceHandle>>,
}

impl<T> ConnectionManager<T>
where
    T: TransportPort,
{
    pub fn new(
        transport: Arc<T>,
        parameters: ConnectionParameters,
        command_timeout: Option<Duration>,
    ) -> Self {
        if let Err(e) = transport.bind() {
            log::error!("Error binding transport service: {}", e);
        }
        Self {
            transport,
            parameters,
            command_timeout,
            device: Mutex::new(None),
        }
    }

    /// Opens the link to the board at `address`. Resolves once the transport confirms
    /// the connection. Asking for the board already connected returns its handle.
    pub async fn connect(&self, address: &str) -> Result<DeviceHandle, StreamerError> {
        let address = DeviceAddress::try_from(address).map_err(StreamerError::ConnectionFailed)?;
        self.ensure_bound()?;

        let mut device = self.device.lock().await;
        if let Some(current) = device.as_ref() {
            if current.address == address && current.is_connected() {
                return Ok(current.clone());
            }
        }
        if let Some(previous) = device.take() {
            if previous.is_connected() {
                log::info!("Disconnecting {} before connecting to {}", previous.address, address);
                if let Err(e) = self.close_link(&previous).await {
                    log::warn!("{}", e);
                }
            }
        }

        let board = self
            .transport
            .board(&address)
            .map_err(StreamerError::ConnectionFailed)?;
        let handle = DeviceHandle::new(address, board);
        handle.set_state(ConnectionState::Connecting);
        log::info!("Connecting to {}", handle.address);

        if let Err(e) = with_timeout(self.command_timeout, "connect", handle.board().connect()).await
        {
            handle.set_state(ConnectionState::Disconnected);
            return Err(StreamerError::ConnectionFailed(format!(
                "{}: {}",
                handle.address, e
            )));
        }
        handle.board().on_unexpected_disconnect(handle.link_loss_handler());

        if let Err(e) = with_timeout(
            self.command_timeout,
            "connection parameters",
            handle.board().set_connection_parameters(&self.parameters),
        )
        .await
        {
            log::warn!("Connection parameters not applied to {}: {}", handle.address, e);
        }

        if !handle.finish_connecting() {
            return Err(StreamerError::ConnectionFailed(format!(
                "{}: link lost during connect",
                handle.address
            )));
        }
        log::info!("Connected to {}", handle.address);
        *device = Some(handle.clone());
        Ok(handle)
    }

    /// Tears the link down. Succeeds without doing anything when no board is connected.
    pub async fn disconnect(&self) -> Result<(), StreamerError> {
        self.ensure_bound()?;
        let mut device = self.device.lock().await;
        let Some(current) = device.as_ref() else {
            return Ok(());
        };
        if current.is_connected() {
            self.close_link(current).await?;
        }
        *device = None;
        Ok(())
    }

    /// Handle of the board currently held by the manager, connected or not.
    pub async fn device(&self) -> Option<DeviceHandle> {
        self.device.lock().await.clone()
    }

    pub async fn battery_state(&self) -> Result<BatteryState, StreamerError> {
        let device = self.connected_device().await?;
        let battery = with_timeout(
            self.command_timeout,
            "battery read",
            device.board().read_battery(),
        )
        .await
        .map_err(StreamerError::Command)?;
        log::debug!(
            "Battery of {}: {}% {} mV",
            device.address,
            battery.charge,
            battery.voltage_mv
        );
        Ok(battery)
    }

    /// Soft-resets the board. The link is considered dropped afterwards.
    pub async fn reset_device(&self) -> Result<(), StreamerError> {
        let device = self.connected_device().await?;
        with_timeout(self.command_timeout, "reset", device.board().reset())
            .await
            .map_err(StreamerError::Command)?;
        device.set_state(ConnectionState::Disconnected);
        log::info!("Reset {}", device.address);
        Ok(())
    }

    /// Binds the transport service again, e.g. after the binding was lost.
    pub fn reinitialize(&self) -> Result<(), StreamerError> {
        self.transport.bind().map_err(|e| {
            log::error!("Error binding transport service: {}", e);
            StreamerError::ServiceUnavailable
        })
    }

    /// Disconnects the board, best effort, and releases the transport service.
    pub async fn teardown(&self) {
        if self.transport.is_bound() {
            if let Err(e) = self.disconnect().await {
                log::warn!("{}", e);
            }
        }
        self.transport.unbind();
    }

    fn ensure_bound(&self) -> Result<(), StreamerError> {
        if self.transport.is_bound() {
            Ok(())
        } else {
            Err(StreamerError::ServiceUnavailable)
        }
    }

    async fn connected_device(&self) -> Result<DeviceHandle, StreamerError> {
        self.ensure_bound()?;
        match self.device.lock().await.as_ref() {
            Some(device) if device.is_connected() => Ok(device.clone()),
            _ => Err(StreamerError::NotConnected),
        }
    }

    async fn close_link(&self, device: &DeviceHandle) -> Result<(), StreamerError> {
        with_timeout(self.command_timeout, "disconnect", device.board().disconnect())
            .await
            .map_err(|e| StreamerError::DisconnectFailed(format!("{}: {}", device.address, e)))?;
        device.set_state(ConnectionState::Disconnected);
        log::info!("Disconnected from {}", device.address);
        Ok(())
    }
}

impl<T> Drop for ConnectionManager<T>
where
    T: TransportPort,
{
    fn drop(&mut self) {
        self.transport.unbind();
    }
}
