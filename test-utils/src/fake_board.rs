//! Emulates a wireless transport and its boards. Every command can be scripted to
//! fail or to hang, and samples are injected by hand with [`ScriptedBoard::emit`].

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use common::traits::{BoardPort, RoutePort, TransportPort};
use common::types::{
    BatteryState, ConnectionParameters, DeviceAddress, DisconnectCallback, Sample,
    SampleCallback, SensorKind, SensorSetup,
};
use publisher::{Listener, PublisherManager};

/// Board commands that can be scripted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fault {
    Connect,
    Disconnect,
    ConnectionParameters,
    Configure(SensorKind),
    OpenRoute(SensorKind),
    Start(SensorKind),
    Stop(SensorKind),
    Battery,
    Reset,
}

#[derive(Default)]
struct Script {
    failing: HashSet<Fault>,
    hanging: HashSet<Fault>,
}

impl Script {
    async fn run(script: &Mutex<Script>, fault: Fault) -> Result<(), String> {
        let (fails, hangs) = {
            let script = script.lock();
            (script.failing.contains(&fault), script.hanging.contains(&fault))
        };
        if hangs {
            future::pending::<()>().await;
        }
        if fails {
            return Err(format!("{:?} failed", fault));
        }
        Ok(())
    }
}

/// Scriptable stand-in for the wireless service.
pub struct ScriptedTransport {
    bound: AtomicBool,
    bind_fails: AtomicBool,
    bind_calls: AtomicUsize,
    boards: Mutex<HashMap<DeviceAddress, Arc<ScriptedBoard>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            bound: AtomicBool::new(false),
            bind_fails: AtomicBool::new(false),
            bind_calls: AtomicUsize::new(0),
            boards: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the board served for `address`, creating it on first use.
    pub fn board_at(&self, address: &str) -> Arc<ScriptedBoard> {
        let address = DeviceAddress::try_from(address).expect("valid test address");
        self.boards
            .lock()
            .entry(address)
            .or_insert_with(|| Arc::new(ScriptedBoard::new()))
            .clone()
    }

    /// Makes the next `bind` calls fail.
    pub fn set_bind_fails(&self, fails: bool) {
        self.bind_fails.store(fails, Ordering::SeqCst);
    }

    /// Simulates the service going away behind the caller's back.
    pub fn lose_binding(&self) {
        self.bound.store(false, Ordering::SeqCst);
    }

    pub fn bind_calls(&self) -> usize {
        self.bind_calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportPort for ScriptedTransport {
    fn bind(&self) -> Result<(), String> {
        self.bind_calls.fetch_add(1, Ordering::SeqCst);
        if self.bind_fails.load(Ordering::SeqCst) {
            return Err("service refused binding".to_string());
        }
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
        let board = self.board_at(address.as_str());
        Ok(board)
    }
}

/// Board whose sensors only produce what the test emits.
pub struct ScriptedBoard {
    connected: AtomicBool,
    script: Arc<Mutex<Script>>,
    signals: PublisherManager<Sample, SensorKind>,
    streaming: Arc<Mutex<HashSet<SensorKind>>>,
    configured: Mutex<Vec<SensorSetup>>,
    connection_parameters: Mutex<Option<ConnectionParameters>>,
    on_disconnect: Mutex<Option<DisconnectCallback>>,
    battery: Mutex<BatteryState>,
    commands: Arc<Mutex<Vec<String>>>,
}

impl ScriptedBoard {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            script: Arc::new(Mutex::new(Script::default())),
            signals: PublisherManager::new(&SensorKind::ALL),
            streaming: Arc::new(Mutex::new(HashSet::new())),
            configured: Mutex::new(Vec::new()),
            connection_parameters: Mutex::new(None),
            on_disconnect: Mutex::new(None),
            battery: Mutex::new(BatteryState {
                charge: 87,
                voltage_mv: 4012,
            }),
            commands: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Makes `fault` return an error until cleared.
    pub fn fail(&self, fault: Fault) {
        self.script.lock().failing.insert(fault);
    }

    /// Makes `fault` never complete until cleared.
    pub fn hang(&self, fault: Fault) {
        self.script.lock().hanging.insert(fault);
    }

    pub fn clear_faults(&self) {
        let mut script = self.script.lock();
        script.failing.clear();
        script.hanging.clear();
    }

    /// Delivers a sample to every route subscribed to `kind`, started or not, like a
    /// packet already in flight.
    pub fn emit(&self, sample: Sample) {
        self.signals.notify_listeners(sample.kind(), Arc::new(sample));
    }

    /// Emits `n` samples for `kind` with increasing timestamps starting at `t0`.
    pub fn emit_many(&self, kind: SensorKind, t0: i64, n: usize) {
        for i in 0..n {
            let v = i as f64;
            self.emit(Sample::new(kind, t0 + i as i64 * 10, [v, v * 0.5, -v]));
        }
    }

    /// Drops the link as if the board went out of range.
    pub fn drop_link(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.streaming.lock().clear();
        let handler = self.on_disconnect.lock().clone();
        if let Some(handler) = handler {
            handler();
        }
    }

    pub fn is_streaming(&self, kind: SensorKind) -> bool {
        self.streaming.lock().contains(&kind)
    }

    pub fn route_count(&self, kind: SensorKind) -> usize {
        self.signals.listener_count(&kind)
    }

    pub fn configured(&self) -> Vec<SensorSetup> {
        self.configured.lock().clone()
    }

    pub fn connection_parameters(&self) -> Option<ConnectionParameters> {
        self.connection_parameters.lock().clone()
    }

    pub fn set_battery(&self, state: BatteryState) {
        *self.battery.lock() = state;
    }

    /// Successful commands received so far, oldest first.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }

    fn record(&self, command: String) {
        self.commands.lock().push(command);
    }
}

impl Default for ScriptedBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BoardPort for ScriptedBoard {
    async fn connect(&self) -> Result<(), String> {
        Script::run(&self.script, Fault::Connect).await?;
        self.connected.store(true, Ordering::SeqCst);
        self.record("connect".to_string());
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), String> {
        Script::run(&self.script, Fault::Disconnect).await?;
        self.connected.store(false, Ordering::SeqCst);
        self.streaming.lock().clear();
        self.record("disconnect".to_string());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn on_unexpected_disconnect(&self, handler: DisconnectCallback) {
        *self.on_disconnect.lock() = Some(handler);
    }

    async fn set_connection_parameters(
        &self,
        params: &ConnectionParameters,
    ) -> Result<(), String> {
        Script::run(&self.script, Fault::ConnectionParameters).await?;
        *self.connection_parameters.lock() = Some(params.clone());
        Ok(())
    }

    async fn configure(&self, setup: &SensorSetup) -> Result<(), String> {
        Script::run(&self.script, Fault::Configure(setup.kind)).await?;
        self.configured.lock().push(*setup);
        self.record(format!("configure {}", setup.kind));
        Ok(())
    }

    async fn open_route(
        &self,
        kind: SensorKind,
        on_sample: SampleCallback,
    ) -> Result<Box<dyn RoutePort>, String> {
        Script::run(&self.script, Fault::OpenRoute(kind)).await?;
        let mut listener = Listener::new(move |_id: Uuid, sample: Arc<Sample>| {
            on_sample((*sample).clone());
        });
        let listener_id = self.signals.add_listener(&mut listener, &kind)?;
        self.record(format!("route {}", kind));
        Ok(Box::new(ScriptedRoute {
            kind,
            listener_id,
            signals: self.signals.clone(),
            script: self.script.clone(),
            streaming: self.streaming.clone(),
            commands: self.commands.clone(),
        }))
    }

    async fn read_battery(&self) -> Result<BatteryState, String> {
        Script::run(&self.script, Fault::Battery).await?;
        Ok(*self.battery.lock())
    }

    async fn reset(&self) -> Result<(), String> {
        Script::run(&self.script, Fault::Reset).await?;
        self.record("reset".to_string());
        self.drop_link();
        Ok(())
    }
}

/// Route handed out by [`ScriptedBoard`]. Unsubscribes from the signal when dropped.
pub struct ScriptedRoute {
    kind: SensorKind,
    listener_id: Uuid,
    signals: PublisherManager<Sample, SensorKind>,
    script: Arc<Mutex<Script>>,
    streaming: Arc<Mutex<HashSet<SensorKind>>>,
    commands: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl RoutePort for ScriptedRoute {
    async fn start(&self) -> Result<(), String> {
        Script::run(&self.script, Fault::Start(self.kind)).await?;
        self.streaming.lock().insert(self.kind);
        self.commands.lock().push(format!("start {}", self.kind));
        Ok(())
    }

    async fn stop(&self) -> Result<(), String> {
        Script::run(&self.script, Fault::Stop(self.kind)).await?;
        self.streaming.lock().remove(&self.kind);
        self.commands.lock().push(format!("stop {}", self.kind));
        Ok(())
    }
}

impl Drop for ScriptedRoute {
    fn drop(&mut self) {
        let _ = self.signals.remove_listener(self.listener_id);
    }
}
