use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the websocket broadcast server listens on.
    pub listen_addr: String,
    /// Advertised-name prefix identifying the speed sensor.
    pub sensor_name_prefix: String,
    pub wheel_circumference_mm: u32,
    pub scan_retry_ms: u64,
    pub connect_timeout_ms: u64,
}

impl Config {
    /// Load configuration from a TOML file and environment. Every field has
    /// a default, so the server runs with no config file present.
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("speed-server/config").required(false))
            .add_source(config::Environment::with_prefix("SPEED_SERVER"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn scan_retry(&self) -> Duration {
        Duration::from_millis(self.scan_retry_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:54399".to_string(),
            sensor_name_prefix: "SPD".to_string(),
            wheel_circumference_mm: csc::DEFAULT_WHEEL_CIRCUMFERENCE_MM,
            scan_retry_ms: 500,
            connect_timeout_ms: 5000,
        }
    }
}
