//! Streaming session: drives one recording from hardware setup to closed files.
//!
//! ```text
//! Idle -> Starting -> Active -> Stopping -> Finalized
//!             \-> Failed
//! ```
//!
//! Control operations (`start`, `stop`, `shutdown`) are serialized. Sample counters
//! and the session state are readable at any time, from any thread.

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use common::types::{Sample, SampleCallback, SensorKind};

use crate::connection::DeviceHandle;
use crate::helpers::{join_causes, with_timeout};
use crate::models::config::HardwareOptions;
use crate::models::rates::{resolve_with, sensor_setup};
use crate::models::{RatePolicy, SampleCounts, SensorConfig, SessionState, StreamerError};
use crate::route::DataRoute;
use crate::settings::StreamerSettings;
use crate::storage;
use crate::writer::SessionWriter;

/// Part of the session readable without waiting for a control operation.
#[derive(Default)]
struct Status {
    state: SessionState,
    id: Option<Uuid>,
    path: Option<PathBuf>,
    writers: Vec<Arc<SessionWriter>>,
}

/// Hardware side of a session. Routes are kept after `stop` so that deliveries
/// still in flight land on a closed writer instead of a dropped one.
struct Hardware {
    device: DeviceHandle,
    routes: Vec<DataRoute>,
}

pub struct StreamingSession {
    data_root: PathBuf,
    rate_policy: RatePolicy,
    hardware_options: HardwareOptions,
    command_timeout: Option<Duration>,
    status: RwLock<Status>,
    hardware: Mutex<Option<Hardware>>,
}

impl StreamingSession {
    pub fn new(settings: &StreamerSettings) -> Self {
        Self {
            data_root: settings.data_root.clone(),
            rate_policy: settings.rate_policy,
            hardware_options: settings.hardware,
            command_timeout: settings.command_timeout(),
            status: RwLock::new(Status::default()),
            hardware: Mutex::new(None),
        }
    }

    /// Starts a new session on `device` and returns its directory.
    ///
    /// Counters are reset, a fresh directory is created under the data root, one writer
    /// is opened per sensor, rates are resolved and written to the board, and one route
    /// per sensor is opened and started. If any step fails the session moves to
    /// `Failed`, its writers are closed and routes already started are stopped. The
    /// configuration already written to the board is left in place.
    pub async fn start(
        &self,
        device: &DeviceHandle,
        config: SensorConfig,
    ) -> Result<PathBuf, StreamerError> {
        let mut hardware = self.hardware.lock().await;
        for cause in self.settle_interrupted(hardware.as_ref()).await {
            log::warn!("{}", cause);
        }
        if self.state() == SessionState::Active {
            return Err(StreamerError::StreamSetupFailed(
                "session already active".to_string(),
            ));
        }
        if !device.is_connected() {
            return Err(StreamerError::NotConnected);
        }

        // Previous routes go away before the counters are reset
        *hardware = None;
        *self.status.write() = Status {
            state: SessionState::Starting,
            ..Status::default()
        };

        let (name, path) = match storage::create_session_dir(&self.data_root) {
            Ok(created) => created,
            Err(e) => {
                self.status.write().state = SessionState::Failed;
                return Err(StreamerError::StreamSetupFailed(format!(
                    "session directory: {e}"
                )));
            }
        };
        let id = Uuid::new_v4();
        {
            let mut status = self.status.write();
            status.id = Some(id);
            status.path = Some(path.clone());
        }
        log::info!("Starting session {} ({}) on {}", name, id, device.address());

        // Routes land in `hardware` as soon as they open, so a caller dropping this
        // future leaves nothing the next control operation cannot release.
        let current = hardware.insert(Hardware {
            device: device.clone(),
            routes: Vec::with_capacity(SensorKind::ALL.len()),
        });
        match self.bring_up(current, config, &path).await {
            Ok(()) => {
                self.status.write().state = SessionState::Active;
                log::info!("Session {} active", name);
                Ok(path)
            }
            Err(cause) => {
                self.release(Some(&*current)).await;
                self.status.write().state = SessionState::Failed;
                log::error!("Session {} failed to start: {}", name, cause);
                Err(StreamerError::StreamSetupFailed(cause))
            }
        }
    }

    async fn bring_up(
        &self,
        hardware: &mut Hardware,
        config: SensorConfig,
        path: &Path,
    ) -> Result<(), String> {
        let device = &hardware.device;
        for kind in SensorKind::ALL {
            let writer = SessionWriter::open(kind, path.join(kind.file_name()))
                .map_err(|e| format!("{kind} writer: {e}"))?;
            self.status.write().writers.push(Arc::new(writer));
        }

        let writers = self.status.read().writers.clone();
        for writer in writers {
            let kind = writer.kind();
            let rate = resolve_with(kind, config.requested_hz(kind), self.rate_policy);
            let setup = sensor_setup(rate, &self.hardware_options, self.rate_policy);
            with_timeout(
                self.command_timeout,
                &format!("{kind} configuration"),
                device.board().configure(&setup),
            )
            .await
            .map_err(|e| format!("{kind} configuration: {e}"))?;

            let on_sample: SampleCallback = Arc::new(move |sample: Sample| {
                writer.write(&sample);
            });
            let route = DataRoute::open(device.board(), &setup, on_sample, self.command_timeout)
                .await
                .map_err(|e| match e {
                    StreamerError::StreamSetupFailed(cause) => cause,
                    other => other.to_string(),
                })?;
            hardware.routes.push(route);
        }

        for route in hardware.routes.iter() {
            route
                .start()
                .await
                .map_err(|e| format!("{} route start: {e}", route.kind()))?;
        }
        Ok(())
    }

    /// Stops the hardware streams, closes the files and finalizes the session.
    ///
    /// Every route is asked to stop even if another one fails, and the writers are
    /// closed regardless. Stop failures are then reported as `StopFailed`, with the
    /// session already `Finalized`. Stopping a finalized or failed session returns its
    /// directory again. A start that was cancelled part way is released and the
    /// session moves to `Failed`.
    pub async fn stop(&self) -> Result<PathBuf, StreamerError> {
        let hardware = self.hardware.lock().await;
        let (state, path) = {
            let status = self.status.read();
            (status.state, status.path.clone())
        };
        let Some(path) = path else {
            return Err(StreamerError::NoSession);
        };
        match state {
            // `Stopping` here is a stop that was cancelled, finish it
            SessionState::Active | SessionState::Stopping => {}
            SessionState::Starting => {
                let causes = self.settle_interrupted(hardware.as_ref()).await;
                return if causes.is_empty() {
                    Ok(path)
                } else {
                    Err(StreamerError::StopFailed(join_causes(&causes)))
                };
            }
            _ => return Ok(path),
        }

        self.status.write().state = SessionState::Stopping;
        let causes = self.release(hardware.as_ref()).await;
        self.status.write().state = SessionState::Finalized;

        let counts = self.sample_counts();
        log::info!(
            "Session finalized at {}: {} accelerometer, {} gyroscope, {} magnetometer samples",
            path.display(),
            counts.accel,
            counts.gyro,
            counts.mag
        );
        if causes.is_empty() {
            Ok(path)
        } else {
            Err(StreamerError::StopFailed(join_causes(&causes)))
        }
    }

    /// Stops the session unless it already ended. Errors are logged.
    pub async fn shutdown(&self) {
        if !matches!(
            self.state(),
            SessionState::Active | SessionState::Starting | SessionState::Stopping
        ) {
            return;
        }
        if let Err(e) = self.stop().await {
            log::error!("Error stopping session on shutdown: {}", e);
        }
    }

    /// Live counters while active or stopping, final counters once finalized, zero
    /// otherwise.
    pub fn sample_counts(&self) -> SampleCounts {
        let status = self.status.read();
        match status.state {
            SessionState::Active | SessionState::Stopping | SessionState::Finalized => {
                let mut counts = SampleCounts::default();
                for writer in status.writers.iter() {
                    let count = writer.sample_count();
                    match writer.kind() {
                        SensorKind::Accelerometer => counts.accel = count,
                        SensorKind::Gyroscope => counts.gyro = count,
                        SensorKind::Magnetometer => counts.mag = count,
                    }
                }
                counts
            }
            _ => SampleCounts::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.status.read().state
    }

    pub fn id(&self) -> Option<Uuid> {
        self.status.read().id
    }

    /// Directory of the current or last session.
    pub fn path(&self) -> Option<PathBuf> {
        self.status.read().path.clone()
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Number of writers still open.
    pub fn open_writers(&self) -> usize {
        self.status
            .read()
            .writers
            .iter()
            .filter(|writer| !writer.is_closed())
            .count()
    }

    /// Ends a `start` or `stop` whose caller dropped the future part way: a cancelled
    /// start becomes `Failed`, a cancelled stop `Finalized`. Only called with the
    /// hardware lock held, where neither state can belong to an operation in progress.
    async fn settle_interrupted(&self, hardware: Option<&Hardware>) -> Vec<String> {
        let settled = match self.state() {
            SessionState::Starting => SessionState::Failed,
            SessionState::Stopping => SessionState::Finalized,
            _ => return Vec::new(),
        };
        log::warn!("Releasing session left {:?} by a cancelled call", self.state());
        let causes = self.release(hardware).await;
        self.status.write().state = settled;
        causes
    }

    /// Stops every route, even after one fails, then closes the writers.
    async fn release(&self, hardware: Option<&Hardware>) -> Vec<String> {
        let mut causes = Vec::new();
        if let Some(hardware) = hardware {
            for route in hardware.routes.iter() {
                if let Err(e) = route.stop().await {
                    log::error!("Error stopping {} route: {}", route.kind(), e);
                    causes.push(format!("{} route stop: {e}", route.kind()));
                }
            }
        }
        causes.extend(self.close_writers());
        causes
    }

    fn close_writers(&self) -> Vec<String> {
        let writers = self.status.read().writers.clone();
        writers
            .iter()
            .filter_map(|writer| {
                writer
                    .close()
                    .err()
                    .map(|e| format!("{} writer close: {e}", writer.kind()))
            })
            .collect()
    }
}

impl Drop for StreamingSession {
    fn drop(&mut self) {
        let closed_state = match self.state() {
            SessionState::Active | SessionState::Stopping => SessionState::Finalized,
            SessionState::Starting => SessionState::Failed,
            _ => return,
        };
        log::warn!("Session dropped while {:?}, closing it", self.state());
        for cause in self.close_writers() {
            log::error!("{}", cause);
        }
        self.status.get_mut().state = closed_state;

        let Some(hardware) = self.hardware.get_mut().take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    for route in hardware.routes.iter() {
                        if let Err(e) = route.stop().await {
                            log::error!("Error stopping {} route: {}", route.kind(), e);
                        }
                    }
                    log::debug!("Released routes of {}", hardware.device.address());
                });
            }
            Err(_) => log::warn!("No runtime left to stop the hardware streams"),
        }
    }
}
