//! Streamer settings, read from a TOML file.
//!
//! ```toml
//! data_root = "/var/lib/imu/sessions"
//! command_timeout_ms = 5000
//! rate_policy = "exact_or_default"
//!
//! [sensors]
//! accel = 100.0
//! gyro = 100.0
//! mag = 25.0
//!
//! [hardware]
//! accel_range_g = 16.0
//! gyro_range_dps = 2000.0
//! mag_preset = "regular"
//!
//! [upload]
//! endpoint = "https://storage.example.com/imu"
//! ```
//!
//! Every key is optional.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use common::types::ConnectionParameters;
use uploader_rs::UploadSettings;

use crate::models::config::HardwareOptions;
use crate::models::{RatePolicy, SensorConfig, StreamerError};

const APP_DIR: &str = "imu-streamer";
const SESSIONS_DIR: &str = "sessions";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StreamerSettings {
    /// Directory holding one subdirectory per session
    pub data_root: PathBuf,
    /// Upper bound for each board command. Unset waits indefinitely.
    pub command_timeout_ms: Option<u64>,
    pub rate_policy: RatePolicy,
    /// Rates used when the caller does not pass its own
    pub sensors: SensorConfig,
    pub hardware: HardwareOptions,
    pub connection: ConnectionParameters,
    pub upload: Option<UploadSettings>,
}

impl Default for StreamerSettings {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            command_timeout_ms: None,
            rate_policy: RatePolicy::default(),
            sensors: SensorConfig::default(),
            hardware: HardwareOptions::default(),
            connection: ConnectionParameters::default(),
            upload: None,
        }
    }
}

impl StreamerSettings {
    /// Reads settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StreamerError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| StreamerError::Settings(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, StreamerError> {
        toml::from_str(content).map_err(|e| StreamerError::Settings(e.to_string()))
    }

    /// Same settings with sessions stored under `data_root`.
    pub fn with_data_root(mut self, data_root: impl Into<PathBuf>) -> Self {
        self.data_root = data_root.into();
        self
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_ms.map(Duration::from_millis)
    }
}

/// `<platform data dir>/imu-streamer/sessions`, or a relative `sessions` directory on
/// platforms without a data dir.
pub fn default_data_root() -> PathBuf {
    dirs_next::data_dir()
        .map(|dir| dir.join(APP_DIR).join(SESSIONS_DIR))
        .unwrap_or_else(|| PathBuf::from(SESSIONS_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::types::MagPreset;

    #[test]
    fn test_empty_settings_take_defaults() {
        let settings = StreamerSettings::from_toml("").unwrap();
        assert_eq!(settings.data_root, default_data_root());
        assert_eq!(settings.command_timeout(), None);
        assert_eq!(settings.rate_policy, RatePolicy::ExactOrDefault);
        assert_eq!(settings.sensors, SensorConfig::default());
        assert_eq!(settings.connection, ConnectionParameters::default());
        assert!(settings.upload.is_none());
    }

    #[test]
    fn test_settings_sections() {
        let settings = StreamerSettings::from_toml(
            r#"
            data_root = "/tmp/imu"
            command_timeout_ms = 2500
            rate_policy = "nearest"

            [sensors]
            accel = 800.0
            gyro = 400.0
            mag = 10.0

            [hardware]
            accel_range_g = 4.0
            mag_preset = "high_accuracy"

            [connection]
            supervision_timeout_ms = 4000

            [upload]
            endpoint = "http://localhost:9000/bucket"
            prefix = "lab"
            "#,
        )
        .unwrap();

        assert_eq!(settings.data_root, PathBuf::from("/tmp/imu"));
        assert_eq!(settings.command_timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(settings.rate_policy, RatePolicy::Nearest);
        assert_eq!(settings.sensors, SensorConfig::new(800.0, 400.0, 10.0));
        assert_eq!(settings.hardware.accel_range_g, 4.0);
        assert_eq!(settings.hardware.gyro_range_dps, 2000.0);
        assert_eq!(settings.hardware.mag_preset, MagPreset::HighAccuracy);
        assert_eq!(settings.connection.supervision_timeout_ms, 4000);
        assert_eq!(settings.connection.min_interval_ms, 7.5);

        let upload = settings.upload.unwrap();
        assert_eq!(upload.endpoint, "http://localhost:9000/bucket");
        assert_eq!(upload.prefix.as_deref(), Some("lab"));
    }

    #[test]
    fn test_malformed_settings() {
        assert!(matches!(
            StreamerSettings::from_toml("command_timeout_ms = \"soon\""),
            Err(StreamerError::Settings(_))
        ));
        assert!(matches!(
            StreamerSettings::from_file("/definitely/not/here.toml"),
            Err(StreamerError::Settings(_))
        ));
    }
}
