use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use common::traits::TransportPort;
use common::types::BatteryState;
use uploader_rs::{UploadError, UploadRelay, UploadReport};

use crate::adapters::simulated::SimulatedTransport;
use crate::connection::{ConnectionManager, DeviceHandle};
use crate::models::{shutdown, SampleCounts, SensorConfig, SessionState, StreamerError};
use crate::session::StreamingSession;
use crate::settings::StreamerSettings;
use crate::storage;

/// Control surface of the streamer: one connection manager, one streaming session
/// and, when an endpoint is configured, an upload relay.
pub struct StreamerService<T>
where
    T: TransportPort,
{
    settings: StreamerSettings,
    connection: ConnectionManager<T>,
    session: StreamingSession,
    uploader: Option<UploadRelay>,
}

impl<T> StreamerService<T>
where
    T: TransportPort,
{
    /// Binds the transport and prepares the session.
    /// Returns a Settings error if the upload client cannot be created.
    pub fn new(transport: Arc<T>, settings: StreamerSettings) -> Result<Self, StreamerError> {
        let uploader = settings
            .upload
            .as_ref()
            .map(UploadRelay::new)
            .transpose()
            .map_err(|e| StreamerError::Settings(e.to_string()))?;
        let connection = ConnectionManager::new(
            transport,
            settings.connection.clone(),
            settings.command_timeout(),
        );
        let session = StreamingSession::new(&settings);

        Ok(Self {
            settings,
            connection,
            session,
            uploader,
        })
    }

    pub fn settings(&self) -> &StreamerSettings {
        &self.settings
    }

    pub async fn connect(&self, address: &str) -> Result<DeviceHandle, StreamerError> {
        self.connection.connect(address).await
    }

    pub async fn disconnect(&self) -> Result<(), StreamerError> {
        self.connection.disconnect().await
    }

    /// Starts a session on the connected board and returns its directory.
    pub async fn start(&self, config: SensorConfig) -> Result<PathBuf, StreamerError> {
        let device = self
            .connection
            .device()
            .await
            .ok_or(StreamerError::NotConnected)?;
        self.session.start(&device, config).await
    }

    /// Starts a session with the rates from the settings file.
    pub async fn start_default(&self) -> Result<PathBuf, StreamerError> {
        self.start(self.settings.sensors).await
    }

    pub async fn stop(&self) -> Result<PathBuf, StreamerError> {
        self.session.stop().await
    }

    pub fn sample_counts(&self) -> SampleCounts {
        self.session.sample_counts()
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn latest_session_directory(&self) -> Result<PathBuf, StreamerError> {
        storage::latest_session_directory(&self.settings.data_root)
    }

    /// Uploads a finished session directory in the background. Fails right away if no
    /// upload endpoint is configured.
    pub fn upload(
        &self,
        directory: impl Into<PathBuf>,
    ) -> Result<JoinHandle<Result<UploadReport, UploadError>>, StreamerError> {
        let uploader = self.uploader.as_ref().ok_or_else(|| {
            StreamerError::Settings("no upload endpoint configured".to_string())
        })?;
        Ok(uploader.upload(directory))
    }

    pub async fn battery_state(&self) -> Result<BatteryState, StreamerError> {
        self.connection.battery_state().await
    }

    pub async fn reset_device(&self) -> Result<(), StreamerError> {
        self.connection.reset_device().await
    }

    /// Binds the transport service again after it was lost.
    pub fn reinitialize(&self) -> Result<(), StreamerError> {
        self.connection.reinitialize()
    }

    /// Stops an active session, disconnects and releases the transport.
    pub async fn shutdown(&self) {
        self.session.shutdown().await;
        self.connection.teardown().await;
    }

    /// Records one session on the board at `address` until `run_for` elapses, or until
    /// Ctrl+C when `run_for` is `None`, and returns the finalized directory.
    pub async fn record(
        &self,
        address: &str,
        config: SensorConfig,
        run_for: Option<Duration>,
    ) -> Result<PathBuf, StreamerError> {
        self.connect(address).await?;
        let path = self.start(config).await?;
        log::info!("Recording to {}", path.display());

        let abort_signal = Arc::new(Notify::new());
        shutdown::listen_for_shutdown(abort_signal.clone(), run_for);
        abort_signal.notified().await;

        let path = self.stop().await?;
        let counts = self.sample_counts();
        log::info!(
            "Recorded {} samples ({} accelerometer, {} gyroscope, {} magnetometer)",
            counts.total(),
            counts.accel,
            counts.gyro,
            counts.mag
        );
        Ok(path)
    }
}

/// Starts a streamer on a simulated board and records one session in the background.
///
/// Returns a tuple containing:
/// - A `tokio::task::JoinHandle` resolving to the finalized session directory.
/// - An `Arc<StreamerService<SimulatedTransport>>` instance, allowing further interaction
///   with the streamer while it records, e.g. polling sample counts.
pub fn run_simulated_service(
    settings: StreamerSettings,
    address: &str,
    config: SensorConfig,
    add_sensor_noise: bool,
    run_for: Duration,
) -> Result<
    (
        JoinHandle<Result<PathBuf, StreamerError>>,
        Arc<StreamerService<SimulatedTransport>>,
    ),
    StreamerError,
> {
    let transport = Arc::new(SimulatedTransport::new(add_sensor_noise));
    let service = Arc::new(StreamerService::new(transport, settings)?);
    let handle = tokio::spawn({
        let service = service.clone();
        let address = address.to_string();
        async move {
            let result = service.record(&address, config, Some(run_for)).await;
            if let Err(e) = result.as_ref() {
                log::error!("Error in recording: {}", e);
            }
            result
        }
    });
    Ok((handle, service))
}
