mod config;
mod gear;
mod publisher;
mod sensor;

use crate::config::Config;
use btleplug::api::{Manager as _, Peripheral as _};
use btleplug::platform::Manager;
use power_model::Gear;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::load().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {}", err);
        std::process::exit(1);
    });

    log::info!(
        "speed server on {}, looking for '{}*' sensors",
        config.listen_addr,
        config.sensor_name_prefix
    );

    let listener = TcpListener::bind(&config.listen_addr).await.unwrap_or_else(|err| {
        eprintln!("Failed to bind {}: {}", config.listen_addr, err);
        std::process::exit(1);
    });

    let (update_tx, _) = broadcast::channel(16);
    tokio::spawn(publisher::run(listener, update_tx.clone()));

    let (gear_tx, gear_rx) = watch::channel(Gear::default());
    tokio::spawn(gear::run(gear_tx));

    let manager = Manager::new().await.unwrap_or_else(|err| {
        eprintln!("Failed to initialize Bluetooth: {}", err);
        std::process::exit(1);
    });
    let adapter = match manager.adapters().await {
        Ok(adapters) => match adapters.into_iter().next() {
            Some(adapter) => adapter,
            None => {
                eprintln!("No Bluetooth adapters found");
                std::process::exit(1);
            }
        },
        Err(err) => {
            eprintln!("Failed to list Bluetooth adapters: {}", err);
            std::process::exit(1);
        }
    };

    // Scan, stream, and go back to scanning whenever the sensor drops.
    loop {
        let peripheral = match sensor::find_speed_sensor(
            &adapter,
            &config.sensor_name_prefix,
            config.scan_retry(),
        )
        .await
        {
            Ok(peripheral) => peripheral,
            Err(e) => {
                log::error!("scan failed: {}", e);
                tokio::time::sleep(Duration::from_secs(1)).await;
                continue;
            }
        };

        match sensor::connect(&peripheral, config.connect_timeout()).await {
            Ok(_) => {
                if let Err(e) = sensor::run_session(
                    &peripheral,
                    config.wheel_circumference_mm,
                    gear_rx.clone(),
                    update_tx.clone(),
                )
                .await
                {
                    log::error!("sensor session ended: {}", e);
                }
            }
            Err(e) => log::error!("failed to connect to sensor: {}", e),
        }

        let _ = peripheral.disconnect().await;
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}
