mod config;
mod notifier;
mod reading;
mod updates;

use crate::config::Config;
use csp_sensor::ConsoleSensor;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::load().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {}", err);
        std::process::exit(1);
    });

    log::info!(
        "power meter '{}' notifying every {} ms (+ up to {} ms jitter), stale after {} ms",
        config.sensor.name,
        config.notification_interval_ms,
        config.notification_jitter_ms,
        config.stale_after_ms
    );

    let (update_tx, update_rx) = mpsc::channel(16);
    tokio::spawn(updates::run(config.server_url.clone(), update_tx));

    let mut sensor = ConsoleSensor::new(config.sensor_info());
    notifier::run(update_rx, &mut sensor, config.notifier_settings()).await;
}
