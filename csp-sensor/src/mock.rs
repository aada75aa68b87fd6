use thiserror::Error;

use crate::PowerSensor;

#[derive(Debug, Error)]
#[error("mock sensor failure")]
pub struct MockSensorError;

/// Records notifications; can be told to fail to exercise error paths.
#[derive(Default)]
pub struct MockSensor {
    pub notified: Vec<i16>,
    pub fail: bool,
}

impl MockSensor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PowerSensor for MockSensor {
    type Error = MockSensorError;

    fn notify(&mut self, watts: i16) -> Result<(), Self::Error> {
        if self.fail {
            return Err(MockSensorError);
        }

        self.notified.push(watts);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_notifications() {
        let mut sensor = MockSensor::new();
        sensor.notify(120).unwrap();
        sensor.notify(0).unwrap();

        assert_eq!(sensor.notified, vec![120, 0]);
    }

    #[test]
    fn test_fails_on_demand() {
        let mut sensor = MockSensor::new();
        sensor.fail = true;

        assert!(sensor.notify(120).is_err());
        assert!(sensor.notified.is_empty());
    }
}
