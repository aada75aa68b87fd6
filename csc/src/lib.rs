//! Cycling Speed and Cadence (CSC) measurement decoding and speed derivation.
//!
//! The CSC Measurement characteristic (0x2A5B) notifies a flags byte followed
//! by optional wheel and crank revolution data. [`CscMeasurement`] decodes the
//! payload, [`SpeedTracker`] turns successive wheel samples into a speed.

mod measurement;
mod speed;

pub use measurement::{CrankData, CscMeasurement, DecodeError, WheelData};
pub use speed::SpeedTracker;

/// Default wheel circumference in millimeters (700x25c road wheel).
pub const DEFAULT_WHEEL_CIRCUMFERENCE_MM: u32 = 2110;
