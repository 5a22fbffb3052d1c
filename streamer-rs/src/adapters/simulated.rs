// Emulates a wireless board streaming accelerometer, gyroscope and magnetometer data

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use uuid::Uuid;

use common::traits::{BoardPort, RoutePort, TransportPort};
use common::types::{
    BatteryState, Clock, ConnectionParameters, DeviceAddress, DisconnectCallback, Sample,
    SampleCallback, SensorKind, SensorSetup,
};
use publisher::{Listener, PublisherManager};

mod gaussian;
mod waveform;

use gaussian::GaussianNoise;
use waveform::{reading, SampleClock};

const LINK_LATENCY: Duration = Duration::from_millis(20);
const TICK_PERIOD: Duration = Duration::from_millis(10);
const GAUSSIAN_SENSOR_MEAN: f64 = 0f64;
const GAUSSIAN_ACCEL_STDEV: f64 = 0.005;
const GAUSSIAN_GYRO_STDEV: f64 = 0.2;
const GAUSSIAN_MAG_STDEV: f64 = 0.3;
const SIMULATED_BATTERY: BatteryState = BatteryState {
    charge: 100,
    voltage_mv: 4150,
};

/// In-process stand-in for the wireless service. Every address resolves to a
/// simulated board.
pub struct SimulatedTransport {
    bound: AtomicBool,
    add_sensor_noise: bool,
    boards: Mutex<HashMap<DeviceAddress, Arc<SimulatedBoard>>>,
}

impl SimulatedTransport {
    pub fn new(add_sensor_noise: bool) -> Self {
        Self {
            bound: AtomicBool::new(false),
            add_sensor_noise,
            boards: Mutex::new(HashMap::new()),
        }
    }

    /// Board served for `address`, created on first use.
    pub fn board_at(&self, address: &DeviceAddress) -> Arc<SimulatedBoard> {
        self.boards
            .lock()
            .entry(address.clone())
            .or_insert_with(|| Arc::new(SimulatedBoard::new(address.clone(), self.add_sensor_noise)))
            .clone()
    }
}

impl TransportPort for SimulatedTransport {
    fn bind(&self) -> Result<(), String> {
        self.bound.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn unbind(&self) {
        self.bound.store(false, Ordering::SeqCst);
    }

    fn is_bound(&self) -> bool {
        self.bound.load(Ordering::SeqCst)
    }

    fn board(&self, address: &DeviceAddress) -> Result<Arc<dyn BoardPort>, String> {
        if !self.is_bound() {
            return Err("transport service not bound".to_string());
        }
        let board = self.board_at(address);
        Ok(board)
    }
}

/// A sensor that is sampling: the task producing its readings and the signal to end it.
struct Stream {
    stop: Arc<Notify>,
    handle: JoinHandle<()>,
}

struct BoardState {
    address: DeviceAddress,
    connected: AtomicBool,
    add_sensor_noise: bool,
    setups: Mutex<HashMap<SensorKind, SensorSetup>>,
    signals: PublisherManager<Sample, SensorKind>,
    streams: Mutex<HashMap<SensorKind, Stream>>,
    on_disconnect: Mutex<Option<DisconnectCallback>>,
}

impl BoardState {
    fn ensure_connected(&self) -> Result<(), String> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(format!("board {} not connected", self.address))
        }
    }

    fn noise(&self, kind: SensorKind) -> Result<Option<GaussianNoise>, String> {
        if !self.add_sensor_noise {
            return Ok(None);
        }
        let stdev = match kind {
            SensorKind::Accelerometer => GAUSSIAN_ACCEL_STDEV,
            SensorKind::Gyroscope => GAUSSIAN_GYRO_STDEV,
            SensorKind::Magnetometer => GAUSSIAN_MAG_STDEV,
        };
        GaussianNoise::new(GAUSSIAN_SENSOR_MEAN, stdev).map(Some)
    }

    fn start_stream(&self, kind: SensorKind) -> Result<(), String> {
        self.ensure_connected()?;
        let rate_hz = self
            .setups
            .lock()
            .get(&kind)
            .map(|setup| setup.rate_hz)
            .ok_or_else(|| format!("{kind} not configured"))?;
        let noise = self.noise(kind)?;

        let mut streams = self.streams.lock();
        if streams.contains_key(&kind) {
            return Ok(());
        }
        let stop = Arc::new(Notify::new());
        let handle = tokio::spawn(produce_samples(
            kind,
            rate_hz,
            noise,
            self.signals.clone(),
            stop.clone(),
        ));
        streams.insert(kind, Stream { stop, handle });
        log::debug!("{}: {} sampling at {} Hz", self.address, kind, rate_hz);
        Ok(())
    }

    async fn stop_stream(&self, kind: SensorKind) {
        let stream = self.streams.lock().remove(&kind);
        if let Some(stream) = stream {
            stream.stop.notify_one();
            if let Err(e) = stream.handle.await {
                log::warn!("{}: {} producer ended abnormally: {}", self.address, kind, e);
            }
        }
    }

    async fn stop_all(&self) {
        for kind in SensorKind::ALL {
            self.stop_stream(kind).await;
        }
    }

    fn abort_all(&self) {
        for (_, stream) in self.streams.lock().drain() {
            stream.handle.abort();
        }
    }

    fn notify_disconnect(&self) {
        let handler = self.on_disconnect.lock().clone();
        if let Some(handler) = handler {
            handler();
        }
    }
}

async fn produce_samples(
    kind: SensorKind,
    rate_hz: f64,
    noise: Option<GaussianNoise>,
    signals: PublisherManager<Sample, SensorKind>,
    stop: Arc<Notify>,
) {
    let mut rng = StdRng::from_entropy();
    let origin = Clock::now().as_millis();
    let mut clock = SampleClock::new(origin, rate_hz);
    let mut ticker = tokio::time::interval(TICK_PERIOD);

    loop {
        tokio::select! {
            _ = stop.notified() => break,
            _ = ticker.tick() => {
                let now = Clock::now().as_millis() as f64;
                for stamp in clock.advance(now) {
                    let mut measurement = reading(kind, stamp - origin as f64);
                    if let Some(noise) = noise.as_ref() {
                        measurement = noise.add_noise_xyz(&mut rng, measurement);
                    }
                    let sample = Sample::from_xyz(kind, stamp as i64, measurement);
                    signals.notify_listeners(kind, Arc::new(sample));
                }
            }
        }
    }
}

/// Simulated board. Sensors sample at their configured rate once a route is started.
pub struct SimulatedBoard {
    state: Arc<BoardState>,
}

impl SimulatedBoard {
    fn new(address: DeviceAddress, add_sensor_noise: bool) -> Self {
        Self {
            state: Arc::new(BoardState {
                address,
                connected: AtomicBool::new(false),
                add_sensor_noise,
                setups: Mutex::new(HashMap::new()),
                signals: PublisherManager::new(&SensorKind::ALL),
                streams: Mutex::new(HashMap::new()),
                on_disconnect: Mutex::new(None),
            }),
        }
    }

    /// Drops the link as if the board went out of range.
    pub fn drop_link(&self) {
        self.state.abort_all();
        self.state.connected.store(false, Ordering::SeqCst);
        log::warn!("{}: link dropped", self.state.address);
        self.state.notify_disconnect();
    }

    pub fn is_streaming(&self, kind: SensorKind) -> bool {
        self.state.streams.lock().contains_key(&kind)
    }
}

#[async_trait]
impl BoardPort for SimulatedBoard {
    async fn connect(&self) -> Result<(), String> {
        tokio::time::sleep(LINK_LATENCY).await;
        self.state.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), String> {
        self.state.stop_all().await;
        self.state.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }

    fn on_unexpected_disconnect(&self, handler: DisconnectCallback) {
        *self.state.on_disconnect.lock() = Some(handler);
    }

    async fn set_connection_parameters(
        &self,
        params: &ConnectionParameters,
    ) -> Result<(), String> {
        self.state.ensure_connected()?;
        log::debug!(
            "{}: connection interval {}-{} ms, latency {}, timeout {} ms",
            self.state.address,
            params.min_interval_ms,
            params.max_interval_ms,
            params.latency,
            params.supervision_timeout_ms
        );
        Ok(())
    }

    async fn configure(&self, setup: &SensorSetup) -> Result<(), String> {
        self.state.ensure_connected()?;
        self.state.setups.lock().insert(setup.kind, *setup);
        Ok(())
    }

    async fn open_route(
        &self,
        kind: SensorKind,
        on_sample: SampleCallback,
    ) -> Result<Box<dyn RoutePort>, String> {
        self.state.ensure_connected()?;
        let mut listener = Listener::new(move |_id: Uuid, sample: Arc<Sample>| {
            on_sample((*sample).clone());
        });
        let listener_id = self.state.signals.add_listener(&mut listener, &kind)?;
        Ok(Box::new(SimulatedRoute {
            kind,
            listener_id,
            board: self.state.clone(),
        }))
    }

    async fn read_battery(&self) -> Result<BatteryState, String> {
        self.state.ensure_connected()?;
        Ok(SIMULATED_BATTERY)
    }

    async fn reset(&self) -> Result<(), String> {
        self.state.ensure_connected()?;
        self.state.stop_all().await;
        self.state.setups.lock().clear();
        self.state.connected.store(false, Ordering::SeqCst);
        self.state.notify_disconnect();
        Ok(())
    }
}

/// Subscription to one simulated sensor.
pub struct SimulatedRoute {
    kind: SensorKind,
    listener_id: Uuid,
    board: Arc<BoardState>,
}

#[async_trait]
impl RoutePort for SimulatedRoute {
    async fn start(&self) -> Result<(), String> {
        self.board.start_stream(self.kind)
    }

    async fn stop(&self) -> Result<(), String> {
        self.board.stop_stream(self.kind).await;
        Ok(())
    }
}

impl Drop for SimulatedRoute {
    fn drop(&mut self) {
        let _ = self.board.signals.remove_listener(self.listener_id);
    }
}
