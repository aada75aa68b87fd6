use thiserror::Error;

const WHEEL_REV_DATA_PRESENT: u8 = 0b01;
const CRANK_REV_DATA_PRESENT: u8 = 0b10;

/// Wheel revolution data from a CSC measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelData {
    /// Cumulative wheel revolutions since the sensor powered on. Wraps at
    /// `u32::MAX`.
    pub cumulative_revolutions: u32,
    /// Time of the last wheel event in 1/1024 second units. Wraps every 64 s.
    pub last_event_time: u16,
}

/// Crank revolution data from a CSC measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrankData {
    /// Cumulative crank revolutions since the sensor powered on.
    pub cumulative_revolutions: u16,
    /// Time of the last crank event in 1/1024 second units.
    pub last_event_time: u16,
}

/// A decoded CSC Measurement (0x2A5B) notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CscMeasurement {
    pub wheel: Option<WheelData>,
    pub crank: Option<CrankData>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload is empty")]
    Empty,
    #[error("payload truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("{0} trailing bytes after measurement fields")]
    TrailingBytes(usize),
}

impl CscMeasurement {
    /// Decode a CSC Measurement notification payload.
    ///
    /// Layout: flags (1 byte), then if flags bit 0 is set, cumulative wheel
    /// revolutions (u32 LE) and last wheel event time (u16 LE), then if flags
    /// bit 1 is set, cumulative crank revolutions (u16 LE) and last crank
    /// event time (u16 LE).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (&flags, mut rest) = bytes.split_first().ok_or(DecodeError::Empty)?;

        let mut expected = 1;
        if flags & WHEEL_REV_DATA_PRESENT != 0 {
            expected += 6;
        }
        if flags & CRANK_REV_DATA_PRESENT != 0 {
            expected += 4;
        }
        if bytes.len() < expected {
            return Err(DecodeError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }
        if bytes.len() > expected {
            return Err(DecodeError::TrailingBytes(bytes.len() - expected));
        }

        let wheel = if flags & WHEEL_REV_DATA_PRESENT != 0 {
            let revs = u32::from_le_bytes(rest[..4].try_into().unwrap());
            let time = u16::from_le_bytes(rest[4..6].try_into().unwrap());
            rest = &rest[6..];

            Some(WheelData {
                cumulative_revolutions: revs,
                last_event_time: time,
            })
        } else {
            None
        };

        let crank = if flags & CRANK_REV_DATA_PRESENT != 0 {
            let revs = u16::from_le_bytes(rest[..2].try_into().unwrap());
            let time = u16::from_le_bytes(rest[2..4].try_into().unwrap());

            Some(CrankData {
                cumulative_revolutions: revs,
                last_event_time: time,
            })
        } else {
            None
        };

        Ok(CscMeasurement { wheel, crank })
    }
}
