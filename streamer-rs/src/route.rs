//! Data route: one live subscription to a sensor's output.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::traits::{BoardPort, RoutePort};
use common::types::{Sample, SampleCallback, SensorKind, SensorSetup};

use crate::helpers::with_timeout;
use crate::models::StreamerError;

/// Subscription to one sensor signal. `start` and `stop` are idempotent.
///
/// The delivery callback is armed only once the board confirmed the subscription, so
/// a route that failed to open never delivers. Dropping the route disarms it.
pub struct DataRoute {
    kind: SensorKind,
    rate_hz: f64,
    port: Box<dyn RoutePort>,
    armed: Arc<AtomicBool>,
    running: AtomicBool,
    command_timeout: Option<Duration>,
}

impl DataRoute {
    pub async fn open(
        board: &dyn BoardPort,
        setup: &SensorSetup,
        on_sample: SampleCallback,
        command_timeout: Option<Duration>,
    ) -> Result<Self, StreamerError> {
        let kind = setup.kind;
        let armed = Arc::new(AtomicBool::new(false));
        let gated: SampleCallback = {
            let armed = armed.clone();
            Arc::new(move |sample: Sample| {
                if armed.load(Ordering::Acquire) {
                    on_sample(sample);
                }
            })
        };

        let port = with_timeout(
            command_timeout,
            &format!("{kind} route setup"),
            board.open_route(kind, gated),
        )
        .await
        .map_err(|e| StreamerError::StreamSetupFailed(format!("{kind} route: {e}")))?;
        armed.store(true, Ordering::Release);

        log::debug!("Opened {} route at {} Hz", kind, setup.rate_hz);
        Ok(Self {
            kind,
            rate_hz: setup.rate_hz,
            port,
            armed,
            running: AtomicBool::new(false),
            command_timeout,
        })
    }

    /// Enables sampling on the board. No-op when already started.
    pub async fn start(&self) -> Result<(), String> {
        if self.running.load(Ordering::Acquire) {
            return Ok(());
        }
        with_timeout(
            self.command_timeout,
            &format!("{} start", self.kind),
            self.port.start(),
        )
        .await?;
        self.running.store(true, Ordering::Release);
        log::info!("Started {} stream at {} Hz", self.kind, self.rate_hz);
        Ok(())
    }

    /// Disables sampling on the board. Samples already in flight may still be delivered.
    /// No-op when not started. A failed stop leaves the route marked as running so it can
    /// be retried.
    pub async fn stop(&self) -> Result<(), String> {
        if !self.running.load(Ordering::Acquire) {
            return Ok(());
        }
        with_timeout(
            self.command_timeout,
            &format!("{} stop", self.kind),
            self.port.stop(),
        )
        .await?;
        self.running.store(false, Ordering::Release);
        log::info!("Stopped {} stream", self.kind);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }
}

impl Drop for DataRoute {
    fn drop(&mut self) {
        self.armed.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::HardwareOptions;
    use crate::models::rates::{resolve, sensor_setup};
    use crate::models::RatePolicy;
    use std::sync::atomic::AtomicUsize;
    use test_utils::{Fault, ScriptedBoard};

    fn setup(kind: SensorKind) -> SensorSetup {
        sensor_setup(
            resolve(kind, 100.0),
            &HardwareOptions::default(),
            RatePolicy::default(),
        )
    }

    fn counter() -> (Arc<AtomicUsize>, SampleCallback) {
        let count = Arc::new(AtomicUsize::new(0));
        let callback: SampleCallback = {
            let count = count.clone();
            Arc::new(move |_sample: Sample| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        (count, callback)
    }

    #[tokio::test]
    async fn test_start_and_stop_are_idempotent() {
        let board = ScriptedBoard::new();
        let (_, callback) = counter();
        let route = DataRoute::open(&board, &setup(SensorKind::Gyroscope), callback, None)
            .await
            .unwrap();

        route.stop().await.unwrap();
        route.start().await.unwrap();
        route.start().await.unwrap();
        assert!(route.is_running());
        route.stop().await.unwrap();
        route.stop().await.unwrap();
        assert!(!route.is_running());

        let commands = board.commands();
        assert_eq!(commands.iter().filter(|c| *c == "start gyroscope").count(), 1);
        assert_eq!(commands.iter().filter(|c| *c == "stop gyroscope").count(), 1);
    }

    #[tokio::test]
    async fn test_open_failure_is_setup_error() {
        let board = ScriptedBoard::new();
        board.fail(Fault::OpenRoute(SensorKind::Accelerometer));
        let (count, callback) = counter();

        let result = DataRoute::open(&board, &setup(SensorKind::Accelerometer), callback, None).await;

        assert!(matches!(result, Err(StreamerError::StreamSetupFailed(_))));
        board.emit_many(SensorKind::Accelerometer, 0, 3);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delivery_follows_subscription() {
        let board = ScriptedBoard::new();
        let (count, callback) = counter();
        let route = DataRoute::open(&board, &setup(SensorKind::Magnetometer), callback, None)
            .await
            .unwrap();

        board.emit_many(SensorKind::Magnetometer, 0, 2);
        route.start().await.unwrap();
        route.stop().await.unwrap();
        // stop does not cut deliveries already in flight
        board.emit_many(SensorKind::Magnetometer, 100, 1);
        assert_eq!(count.load(Ordering::SeqCst), 3);

        drop(route);
        board.emit_many(SensorKind::Magnetometer, 200, 5);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failed_stop_can_be_retried() {
        let board = ScriptedBoard::new();
        let (_, callback) = counter();
        let route = DataRoute::open(&board, &setup(SensorKind::Accelerometer), callback, None)
            .await
            .unwrap();
        route.start().await.unwrap();

        board.fail(Fault::Stop(SensorKind::Accelerometer));
        assert!(route.stop().await.is_err());
        assert!(route.is_running());

        board.clear_faults();
        route.stop().await.unwrap();
        assert!(!route.is_running());
    }

    #[tokio::test]
    async fn test_start_timeout() {
        let board = ScriptedBoard::new();
        board.hang(Fault::Start(SensorKind::Gyroscope));
        let (_, callback) = counter();
        let route = DataRoute::open(
            &board,
            &setup(SensorKind::Gyroscope),
            callback,
            Some(Duration::from_millis(20)),
        )
        .await
        .unwrap();

        let err = route.start().await.unwrap_err();
        assert_eq!(err, "gyroscope start timed out after 20 ms");
        assert!(!route.is_running());
    }
}
