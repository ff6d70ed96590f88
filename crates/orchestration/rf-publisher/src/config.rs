//! Configuration types for the publisher.

use rf_types::MAX_BATCH_RECORDS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default initial backoff interval.
pub const DEFAULT_BACKOFF_INTERVAL: Duration = Duration::from_secs(1);

/// Default cap on a single backoff interval.
pub const DEFAULT_BACKOFF_MAX_INTERVAL: Duration = Duration::from_secs(10);

/// Default time budget for retrying one batch.
pub const DEFAULT_BACKOFF_MAX_ELAPSED: Duration = Duration::from_secs(15 * 60);

/// Default batch window.
pub const DEFAULT_BATCH_WINDOW: Duration = Duration::from_secs(10);

/// Growth factor between consecutive backoff intervals.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.5;

/// Fraction of each interval used as random jitter in either direction.
pub const DEFAULT_RANDOMIZATION_FACTOR: f64 = 0.5;

/// Configuration for batching and publishing records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// First backoff interval after a failure
    #[serde(with = "humantime_serde")]
    pub backoff_interval: Duration,

    /// Upper bound for any single backoff interval
    #[serde(with = "humantime_serde")]
    pub backoff_max_interval: Duration,

    /// Total retry time for one batch before giving up
    #[serde(with = "humantime_serde")]
    pub backoff_max_elapsed: Duration,

    /// Growth factor between intervals
    pub backoff_multiplier: f64,

    /// Jitter applied to each interval, in `[0, 1)`
    pub randomization_factor: f64,

    /// Longest time to wait after the first buffered record before flushing
    #[serde(with = "humantime_serde")]
    pub batch_window: Duration,

    /// Records per request (at most 500)
    pub max_batch_size: usize,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            backoff_interval: DEFAULT_BACKOFF_INTERVAL,
            backoff_max_interval: DEFAULT_BACKOFF_MAX_INTERVAL,
            backoff_max_elapsed: DEFAULT_BACKOFF_MAX_ELAPSED,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            randomization_factor: DEFAULT_RANDOMIZATION_FACTOR,
            batch_window: DEFAULT_BATCH_WINDOW,
            max_batch_size: MAX_BATCH_RECORDS,
        }
    }
}

impl PublisherConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial backoff interval.
    pub fn with_backoff_interval(mut self, interval: Duration) -> Self {
        self.backoff_interval = interval;
        self
    }

    /// Set the maximum backoff interval.
    pub fn with_backoff_max_interval(mut self, interval: Duration) -> Self {
        self.backoff_max_interval = interval;
        self
    }

    /// Set the retry time budget per batch.
    pub fn with_backoff_max_elapsed(mut self, elapsed: Duration) -> Self {
        self.backoff_max_elapsed = elapsed;
        self
    }

    /// Set the jitter factor.
    pub fn with_randomization_factor(mut self, factor: f64) -> Self {
        self.randomization_factor = factor;
        self
    }

    /// Set the batch window.
    pub fn with_batch_window(mut self, window: Duration) -> Self {
        self.batch_window = window;
        self
    }

    /// Set the maximum batch size.
    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.backoff_interval.is_zero() {
            return Err("backoff_interval must be greater than zero".to_string());
        }
        if self.backoff_max_interval < self.backoff_interval {
            return Err("backoff_max_interval must not be less than backoff_interval".to_string());
        }
        if self.backoff_multiplier < 1.0 {
            return Err("backoff_multiplier must be at least 1".to_string());
        }
        if !(0.0..1.0).contains(&self.randomization_factor) {
            return Err("randomization_factor must be in [0, 1)".to_string());
        }
        if self.batch_window.is_zero() {
            return Err("batch_window must be greater than zero".to_string());
        }
        if self.max_batch_size == 0 || self.max_batch_size > MAX_BATCH_RECORDS {
            return Err(format!(
                "max_batch_size must be between 1 and {MAX_BATCH_RECORDS}"
            ));
        }
        Ok(())
    }
}

/// Serde helper for human-readable durations (`500ms`, `10s`, `1m`).
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
