//! Exponential backoff with jitter and an elapsed-time budget.

use crate::config::PublisherConfig;
use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;

/// Exponential backoff schedule.
///
/// Each call to [`next_backoff`](Self::next_backoff) returns the current
/// interval randomized by `randomization_factor` in either direction, capped at
/// the maximum interval, then grows the interval by the multiplier. Once the
/// time since [`reset`](Self::reset) or [`restart_clock`](Self::restart_clock)
/// exceeds the elapsed budget the schedule reports exhaustion with `None`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_interval: Duration,
    max_interval: Duration,
    max_elapsed: Duration,
    multiplier: f64,
    randomization_factor: f64,
    current_interval: Duration,
    started: Instant,
}

impl ExponentialBackoff {
    /// Build a schedule from the publisher settings.
    pub fn from_config(config: &PublisherConfig) -> Self {
        Self {
            initial_interval: config.backoff_interval,
            max_interval: config.backoff_max_interval,
            max_elapsed: config.backoff_max_elapsed,
            multiplier: config.backoff_multiplier,
            randomization_factor: config.randomization_factor,
            current_interval: config.backoff_interval,
            started: Instant::now(),
        }
    }

    /// Restart from the initial interval and restart the elapsed clock.
    pub fn reset(&mut self) {
        self.current_interval = self.initial_interval;
        self.started = Instant::now();
    }

    /// Restart the elapsed clock, keeping the current interval.
    pub fn restart_clock(&mut self) {
        self.started = Instant::now();
    }

    /// Time since the clock was last restarted.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// The largest interval this schedule can return.
    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    /// Next interval to wait, or `None` once the elapsed budget is spent.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.elapsed() > self.max_elapsed {
            return None;
        }

        let next = self.randomized(self.current_interval).min(self.max_interval);
        self.grow();
        Some(next)
    }

    fn randomized(&self, interval: Duration) -> Duration {
        if self.randomization_factor <= 0.0 {
            return interval;
        }
        let delta = interval.as_secs_f64() * self.randomization_factor;
        let low = interval.as_secs_f64() - delta;
        let high = interval.as_secs_f64() + delta;
        Duration::from_secs_f64(rand::rng().random_range(low..=high))
    }

    fn grow(&mut self) {
        let grown = self.current_interval.as_secs_f64() * self.multiplier;
        self.current_interval = if grown >= self.max_interval.as_secs_f64() {
            self.max_interval
        } else {
            Duration::from_secs_f64(grown)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(jitter: f64) -> ExponentialBackoff {
        ExponentialBackoff::from_config(
            &PublisherConfig::new()
                .with_backoff_interval(Duration::from_millis(100))
                .with_backoff_max_interval(Duration::from_millis(400))
                .with_backoff_max_elapsed(Duration::from_secs(60))
                .with_randomization_factor(jitter),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_intervals_grow_and_cap() {
        let mut backoff = schedule(0.0);

        let intervals: Vec<u128> = (0..6)
            .map(|_| backoff.next_backoff().unwrap().as_millis())
            .collect();
        assert_eq!(intervals, vec![100, 150, 225, 337, 400, 400]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_jitter_stays_in_range_and_under_cap() {
        let mut backoff = schedule(0.5);

        for _ in 0..50 {
            let next = backoff.next_backoff().unwrap();
            assert!(next >= Duration::from_millis(50));
            assert!(next <= Duration::from_millis(400));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_restarts_schedule() {
        let mut backoff = schedule(0.0);
        backoff.next_backoff();
        backoff.next_backoff();

        backoff.reset();
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(100)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_after_max_elapsed() {
        let mut backoff = schedule(0.0);
        assert!(backoff.next_backoff().is_some());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(backoff.next_backoff().is_none());

        backoff.reset();
        assert!(backoff.next_backoff().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_clock_keeps_interval() {
        let mut backoff = schedule(0.0);
        backoff.next_backoff();
        backoff.next_backoff();

        tokio::time::advance(Duration::from_secs(61)).await;
        backoff.restart_clock();
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(225)));
    }
}
