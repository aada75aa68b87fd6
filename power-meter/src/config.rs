use csp_sensor::SensorInfo;
use serde::Deserialize;
use std::time::Duration;

use crate::notifier::Settings;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Websocket address the producer serves power updates on.
    pub server_url: String,
    pub notification_interval_ms: u64,
    pub notification_jitter_ms: u64,
    pub stale_after_ms: u64,
    pub sensor: SensorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub name: String,
    pub model_number: String,
    pub serial_number: String,
}

impl Config {
    /// Load configuration from a TOML file and environment.
    ///
    /// Everything defaults to the fixed values the meter has always used, so
    /// no config file is needed to run.
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("power-meter/config").required(false))
            .add_source(config::Environment::with_prefix("POWER_METER"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn notifier_settings(&self) -> Settings {
        Settings {
            interval: Duration::from_millis(self.notification_interval_ms),
            max_jitter_ms: self.notification_jitter_ms,
            stale_after: Duration::from_millis(self.stale_after_ms),
        }
    }

    pub fn sensor_info(&self) -> SensorInfo {
        SensorInfo {
            name: self.sensor.name.clone(),
            model_number: self.sensor.model_number.clone(),
            serial_number: self.sensor.serial_number.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "ws://localhost:54399".to_string(),
            notification_interval_ms: 700,
            notification_jitter_ms: 20,
            stale_after_ms: 4000,
            sensor: SensorConfig::default(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        let info = SensorInfo::default();

        Self {
            name: info.name,
            model_number: info.model_number,
            serial_number: info.serial_number,
        }
    }
}
