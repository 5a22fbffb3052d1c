//! # Crate streamer-rs
//!
//! ## streamer-rs
//!
//! The `streamer-rs` crate records time-series telemetry from a wireless multi-sensor board
//! (accelerometer, gyroscope and magnetometer) into per-sensor CSV files, one directory per
//! recording session, ready to be handed to an upload endpoint.
//!
//! Features include:
//! - Connection management over an injected wireless transport ([`common::TransportPort`]).
//! - Independent sampling rate per sensor, resolved against the rates the hardware supports.
//! - Concurrent data routes multiplexed into per-sensor session files with live sample counts.
//! - Clean shutdown: hardware streams stopped and files closed however the session ends.
//! - Background upload of finished sessions.
//! - A simulated board to record without hardware.
//!
//! ```no_run
//! use std::time::Duration;
//! use streamer_rs::models::SensorConfig;
//! use streamer_rs::services;
//! use streamer_rs::settings::StreamerSettings;
//!
//! # async fn run() -> Result<(), streamer_rs::models::StreamerError> {
//! let (handle, streamer) = services::run_simulated_service(
//!     StreamerSettings::default(),
//!     "D4:5E:82:E1:15:01",
//!     SensorConfig::new(100.0, 100.0, 25.0),
//!     true,
//!     Duration::from_secs(5),
//! )?;
//! println!("{:?}", streamer.sample_counts());
//! let session_dir = handle.await.expect("recording task panicked")?;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod connection;
mod helpers;
pub mod models;
pub mod route;
pub mod services;
pub mod session;
pub mod settings;
pub mod storage;
pub mod writer;

pub use connection::{ConnectionManager, DeviceHandle};
pub use services::StreamerService;
pub use session::StreamingSession;
