use crate::{DEFAULT_WHEEL_CIRCUMFERENCE_MM, WheelData};

/// Event time ticks per second (CSC times are in 1/1024 s units).
const TICKS_PER_SECOND: f64 = 1024.0;

/// Derives speed from successive wheel revolution samples.
///
/// The first sample only primes the tracker. After that, each sample with a
/// positive revolution delta and a positive time delta yields a speed in km/h.
/// Both counters wrap (the event time every 64 s), so deltas use wrapping
/// subtraction.
pub struct SpeedTracker {
    circumference_mm: u32,
    last: Option<WheelData>,
}

impl SpeedTracker {
    pub fn new(circumference_mm: u32) -> Self {
        Self {
            circumference_mm,
            last: None,
        }
    }

    /// Feed a wheel sample, returning the speed in km/h when one can be
    /// derived.
    pub fn update(&mut self, wheel: WheelData) -> Option<f64> {
        let last = self.last.replace(wheel)?;

        let delta_revs = wheel
            .cumulative_revolutions
            .wrapping_sub(last.cumulative_revolutions);
        let delta_ticks = wheel.last_event_time.wrapping_sub(last.last_event_time);

        if delta_revs == 0 || delta_ticks == 0 {
            return None;
        }

        let distance_m = delta_revs as f64 * self.circumference_mm as f64 / 1000.0;
        let elapsed_s = delta_ticks as f64 / TICKS_PER_SECOND;

        Some(distance_m / elapsed_s * 3.6)
    }
}

impl Default for SpeedTracker {
    fn default() -> Self {
        Self::new(DEFAULT_WHEEL_CIRCUMFERENCE_MM)
    }
}
