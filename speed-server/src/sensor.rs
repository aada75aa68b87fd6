//! BLE central side: finding the speed sensor and streaming its measurements.

use btleplug::api::{Central, Characteristic, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Peripheral};
use csc::{CscMeasurement, SpeedTracker};
use futures::StreamExt;
use power_model::Gear;
use sensor_protocol::PowerUpdate;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio::time::timeout;
use uuid::Uuid;

/// CSC Measurement characteristic (0x2A5B, notify).
pub const CSC_MEASUREMENT_UUID: Uuid = Uuid::from_u128(0x00002a5b_0000_1000_8000_00805f9b34fb);

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("bluetooth error: {0}")]
    Ble(#[from] btleplug::Error),
    #[error("timed out connecting to sensor")]
    ConnectTimeout,
    #[error("sensor has no CSC Measurement characteristic")]
    MissingMeasurementCharacteristic,
}

/// Scan until a peripheral advertising the given name prefix shows up.
///
/// Retries forever; the sensor may simply not be powered on yet.
pub async fn find_speed_sensor(
    adapter: &Adapter,
    name_prefix: &str,
    retry: Duration,
) -> Result<Peripheral, SensorError> {
    adapter.start_scan(ScanFilter::default()).await?;

    loop {
        for peripheral in adapter.peripherals().await? {
            if let Some(props) = peripheral.properties().await? {
                if let Some(name) = props.local_name {
                    if name.starts_with(name_prefix) {
                        adapter.stop_scan().await?;
                        log::info!("found speed sensor '{}'", name);
                        return Ok(peripheral);
                    }
                }
            }
        }

        tokio::time::sleep(retry).await;
    }
}

/// Connect, discover services and subscribe to the CSC Measurement
/// characteristic.
pub async fn connect(
    peripheral: &Peripheral,
    connect_timeout: Duration,
) -> Result<Characteristic, SensorError> {
    timeout(connect_timeout, peripheral.connect())
        .await
        .map_err(|_| SensorError::ConnectTimeout)??;

    peripheral.discover_services().await?;

    let characteristic = peripheral
        .characteristics()
        .iter()
        .find(|c| c.uuid == CSC_MEASUREMENT_UUID)
        .cloned()
        .ok_or(SensorError::MissingMeasurementCharacteristic)?;

    peripheral.subscribe(&characteristic).await?;

    Ok(characteristic)
}

/// Consume measurement notifications until the sensor disconnects,
/// broadcasting a power update for every derived speed sample.
pub async fn run_session(
    peripheral: &Peripheral,
    circumference_mm: u32,
    gear: watch::Receiver<Gear>,
    updates: broadcast::Sender<String>,
) -> Result<(), SensorError> {
    let mut notifications = peripheral.notifications().await?;
    let mut tracker = SpeedTracker::new(circumference_mm);

    while let Some(notification) = notifications.next().await {
        if notification.uuid != CSC_MEASUREMENT_UUID {
            continue;
        }

        let measurement = match CscMeasurement::from_bytes(&notification.value) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("bad CSC payload: {}", e);
                continue;
            }
        };

        let Some(wheel) = measurement.wheel else {
            continue;
        };

        if let Some(speed_kmh) = tracker.update(wheel) {
            let gear = *gear.borrow();
            let watts = power_model::speed_to_power(speed_kmh, gear);
            log::debug!(
                "speed {:.2} km/h, gear {} -> {:.1} W",
                speed_kmh,
                gear.number(),
                watts
            );

            match PowerUpdate::new(watts).to_json() {
                // Send fails only when no client is connected; that's fine.
                Ok(json) => {
                    let _ = updates.send(json);
                }
                Err(e) => log::error!("error serializing update: {}", e),
            }
        }
    }

    log::info!("notification stream ended");
    Ok(())
}
