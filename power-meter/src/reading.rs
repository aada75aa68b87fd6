use sensor_protocol::PowerUpdate;
use tokio::time::{Duration, Instant};

/// The last known power reading and when it arrived.
///
/// Once more than the staleness window passes without an update the reading
/// is reported as zero. A reading that never arrived is zero too.
pub struct Reading {
    power: f64,
    updated_at: Option<Instant>,
    stale_after: Duration,
}

impl Reading {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            power: 0.0,
            updated_at: None,
            stale_after,
        }
    }

    /// Store an inbound update and refresh the staleness timestamp.
    pub fn apply(&mut self, update: PowerUpdate, now: Instant) {
        self.power = update.power;
        self.updated_at = Some(now);
    }

    /// The value to emit: the stored reading, or zero once it has gone stale.
    pub fn current(&self, now: Instant) -> f64 {
        match self.updated_at {
            Some(updated_at) if now.duration_since(updated_at) <= self.stale_after => self.power,
            _ => 0.0,
        }
    }
}
