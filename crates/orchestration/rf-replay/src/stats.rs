//! Run statistics across all stages.

use chrono::{DateTime, Duration, Utc};
use rf_archive::{ArchiveSnapshot, ScanOutcome};
use rf_parser::ParserSnapshot;
use rf_publisher::PublisherSnapshot;

/// Final statistics of a replay run.
#[derive(Debug, Clone)]
pub struct ReplaySnapshot {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub scan: ScanOutcome,
    pub archive: ArchiveSnapshot,
    pub parser: ParserSnapshot,
    pub publisher: PublisherSnapshot,
}

impl ReplaySnapshot {
    /// Wall-clock duration of the run.
    pub fn duration(&self) -> Duration {
        self.completed_at - self.started_at
    }

    /// Records published per second.
    pub fn records_per_sec(&self) -> f64 {
        let secs = self.duration().num_milliseconds() as f64 / 1000.0;
        if secs > 0.0 {
            self.publisher.records_published as f64 / secs
        } else {
            0.0
        }
    }

    /// Whether the scan ended before covering the requested range.
    pub fn is_partial(&self) -> bool {
        !self.scan.is_complete()
    }
}
