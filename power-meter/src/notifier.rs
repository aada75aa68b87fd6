use csp_sensor::{PowerMeasurement, PowerSensor};
use rand::Rng;
use sensor_protocol::PowerUpdate;
use tokio::{
    select,
    sync::mpsc::Receiver,
    time::{Duration, Instant, sleep_until},
};

use crate::reading::Reading;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Base notification interval.
    pub interval: Duration,
    /// Upper bound of the random per-tick jitter, to avoid lockstep timing
    /// with other periodic tasks.
    pub max_jitter_ms: u64,
    /// How long an update stays valid before the reading reverts to zero.
    pub stale_after: Duration,
}

/// Run the notification loop.
///
/// A single task owns the reading: inbound updates and the periodic timer are
/// interleaved on the same `select!`, so no locking is needed. The timer arms
/// itself after every tick and never stops; a failed notification is logged
/// and the loop carries on. When the update feed closes the timer keeps
/// firing and the reading decays to zero through staleness.
pub async fn run<S: PowerSensor>(
    mut updates: Receiver<PowerUpdate>,
    sensor: &mut S,
    settings: Settings,
) {
    let mut reading = Reading::new(settings.stale_after);
    let mut next_notify = Instant::now();

    loop {
        select! {
            Some(update) = updates.recv() => {
                reading.apply(update, Instant::now());
            }
            _ = sleep_until(next_notify) => {
                let measurement = PowerMeasurement::from_watts(reading.current(Instant::now()));

                if let Err(e) = sensor.notify(measurement.watts) {
                    log::error!("sensor notification failed: {}", e);
                }

                let jitter = rand::thread_rng().gen_range(0..=settings.max_jitter_ms);
                next_notify = Instant::now() + settings.interval + Duration::from_millis(jitter);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csp_sensor::mock::MockSensorError;
    use std::convert::Infallible;
    use tokio::sync::mpsc;

    fn settings() -> Settings {
        Settings {
            interval: Duration::from_millis(700),
            max_jitter_ms: 20,
            stale_after: Duration::from_millis(4000),
        }
    }

    /// Forwards every notification to the test over a channel.
    struct ChannelSensor(mpsc::UnboundedSender<i16>);

    impl PowerSensor for ChannelSensor {
        type Error = Infallible;

        fn notify(&mut self, watts: i16) -> Result<(), Self::Error> {
            let _ = self.0.send(watts);
            Ok(())
        }
    }

    /// Fails the first notification, then behaves like `ChannelSensor`.
    struct FlakySensor {
        calls: u32,
        tx: mpsc::UnboundedSender<i16>,
    }

    impl PowerSensor for FlakySensor {
        type Error = MockSensorError;

        fn notify(&mut self, watts: i16) -> Result<(), Self::Error> {
            self.calls += 1;
            if self.calls == 1 {
                return Err(MockSensorError);
            }

            let _ = self.tx.send(watts);
            Ok(())
        }
    }

    fn spawn_notifier<S>(sensor: S) -> mpsc::Sender<PowerUpdate>
    where
        S: PowerSensor + Send + 'static,
    {
        let (update_tx, update_rx) = mpsc::channel(8);

        tokio::spawn(async move {
            let mut sensor = sensor;
            run(update_rx, &mut sensor, settings()).await;
        });

        update_tx
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_notification_is_zero() {
        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();
        let _updates = spawn_notifier(ChannelSensor(notify_tx));

        assert_eq!(notify_rx.recv().await, Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_reflected_in_next_notification() {
        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();
        let updates = spawn_notifier(ChannelSensor(notify_tx));

        assert_eq!(notify_rx.recv().await, Some(0));

        updates.send(PowerUpdate::new(183.0)).await.unwrap();
        assert_eq!(notify_rx.recv().await, Some(183));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reading_decays_to_zero_when_updates_stop() {
        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();
        let updates = spawn_notifier(ChannelSensor(notify_tx));

        notify_rx.recv().await.unwrap();

        updates.send(PowerUpdate::new(250.0)).await.unwrap();
        // Time is paused, so the update is applied at this same instant.
        let updated_at = Instant::now();

        // No further updates: ticks keep reporting 250 until the staleness
        // window runs out, then report 0.
        loop {
            let watts = notify_rx.recv().await.unwrap();
            let elapsed = Instant::now().duration_since(updated_at);

            if watts == 0 {
                assert!(elapsed > Duration::from_millis(4000));
                // The first stale tick lands within one interval of the edge.
                assert!(elapsed < Duration::from_millis(4000 + 720));
                break;
            }

            assert_eq!(watts, 250);
            assert!(elapsed <= Duration::from_millis(4000));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_feed_closing_keeps_timer_running() {
        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();
        let updates = spawn_notifier(ChannelSensor(notify_tx));

        notify_rx.recv().await.unwrap();
        drop(updates);

        // Loop survives the closed channel and keeps notifying.
        assert_eq!(notify_rx.recv().await, Some(0));
        assert_eq!(notify_rx.recv().await, Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_cadence() {
        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();
        let _updates = spawn_notifier(ChannelSensor(notify_tx));

        notify_rx.recv().await.unwrap();
        let mut last = Instant::now();

        for _ in 0..5 {
            notify_rx.recv().await.unwrap();
            let gap = Instant::now().duration_since(last);
            last = Instant::now();

            assert!(gap >= Duration::from_millis(700));
            assert!(gap <= Duration::from_millis(720));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_notify_error_does_not_stop_the_loop() {
        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();
        let _updates = spawn_notifier(FlakySensor {
            calls: 0,
            tx: notify_tx,
        });

        // First call errored and was swallowed; the second tick reaches us.
        assert_eq!(notify_rx.recv().await, Some(0));
    }
}
