//! Cycling Power Service peripheral seam.
//!
//! Presenting a GATT peripheral from desktop Rust is platform-dependent and
//! there is no portable crate for it, so the BLE stack sits behind the
//! [`PowerSensor`] trait. This crate carries the device identity, the
//! Cycling Power Measurement payload a backend notifies, and the service and
//! characteristic UUIDs a backend registers. [`ConsoleSensor`] is the default
//! runtime sink; [`mock::MockSensor`] backs the tests.

pub mod mock;

use std::convert::Infallible;

use uuid::Uuid;

/// Cycling Power service (0x1818).
pub const CYCLING_POWER_SERVICE_UUID: Uuid =
    Uuid::from_u128(0x00001818_0000_1000_8000_00805f9b34fb);

/// Cycling Power Measurement characteristic (0x2A63, notify).
pub const CYCLING_POWER_MEASUREMENT_UUID: Uuid =
    Uuid::from_u128(0x00002a63_0000_1000_8000_00805f9b34fb);

/// Identity the peripheral advertises and exposes via Device Information.
#[derive(Debug, Clone)]
pub struct SensorInfo {
    pub name: String,
    pub model_number: String,
    pub serial_number: String,
}

impl Default for SensorInfo {
    fn default() -> Self {
        Self {
            name: "LT Power 530".to_string(),
            model_number: "PWR-32390".to_string(),
            serial_number: "0xleft/speed-to-power".to_string(),
        }
    }
}

/// A Cycling Power Measurement characteristic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerMeasurement {
    pub watts: i16,
}

impl PowerMeasurement {
    /// Clamp a derived wattage into the characteristic's i16 range.
    pub fn from_watts(watts: f64) -> Self {
        let watts = watts.round().clamp(0.0, i16::MAX as f64) as i16;

        Self { watts }
    }

    /// Encode the characteristic value: flags (u16 LE, instantaneous power
    /// only) followed by instantaneous power (i16 LE).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4);
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&self.watts.to_le_bytes());

        buf
    }
}

/// The seam to a platform BLE peripheral stack.
pub trait PowerSensor {
    type Error: std::error::Error;

    /// Notify subscribers of an instantaneous power reading.
    fn notify(&mut self, watts: i16) -> Result<(), Self::Error>;
}

/// Sink that logs each notification instead of driving a radio.
pub struct ConsoleSensor {
    info: SensorInfo,
}

impl ConsoleSensor {
    pub fn new(info: SensorInfo) -> Self {
        log::info!(
            "sensor '{}' (model {}, serial {}) ready",
            info.name,
            info.model_number,
            info.serial_number
        );

        Self { info }
    }
}

impl PowerSensor for ConsoleSensor {
    type Error = Infallible;

    fn notify(&mut self, watts: i16) -> Result<(), Self::Error> {
        let payload = PowerMeasurement { watts }.to_bytes();
        log::info!("{}: notify {} W {:02x?}", self.info.name, watts, payload);

        Ok(())
    }
}
