//! Statistics for the parser stage.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Why a candidate record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Schema validation could not run (e.g. not a document)
    ValidationError,

    /// The record violates the schema
    Invalid,

    /// The record is not well-formed JSON
    Malformed,

    /// The partition key path resolved to nothing
    MissingKey,

    /// The record or key exceeds a stream limit
    Oversized,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError => write!(f, "validation_error"),
            Self::Invalid => write!(f, "invalid"),
            Self::Malformed => write!(f, "malformed"),
            Self::MissingKey => write!(f, "missing_key"),
            Self::Oversized => write!(f, "oversized"),
        }
    }
}

/// Counters updated by parser workers.
#[derive(Debug, Default)]
pub struct ParserStats {
    objects_parsed: AtomicU64,
    candidates: AtomicU64,
    records_emitted: AtomicU64,
    dropped_validation_error: AtomicU64,
    dropped_invalid: AtomicU64,
    dropped_malformed: AtomicU64,
    dropped_missing_key: AtomicU64,
    dropped_oversized: AtomicU64,
}

/// Point-in-time copy of [`ParserStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserSnapshot {
    pub objects_parsed: u64,
    pub candidates: u64,
    pub records_emitted: u64,
    pub dropped_validation_error: u64,
    pub dropped_invalid: u64,
    pub dropped_malformed: u64,
    pub dropped_missing_key: u64,
    pub dropped_oversized: u64,
}

impl ParserSnapshot {
    /// Total candidates dropped for any reason.
    pub fn dropped(&self) -> u64 {
        self.dropped_validation_error
            + self.dropped_invalid
            + self.dropped_malformed
            + self.dropped_missing_key
            + self.dropped_oversized
    }
}

impl ParserStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_object(&self, candidates: usize) {
        self.objects_parsed.fetch_add(1, Ordering::Relaxed);
        self.candidates.fetch_add(candidates as u64, Ordering::Relaxed);
    }

    pub fn record_emitted(&self) {
        self.records_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_drop(&self, reason: DropReason) {
        let counter = match reason {
            DropReason::ValidationError => &self.dropped_validation_error,
            DropReason::Invalid => &self.dropped_invalid,
            DropReason::Malformed => &self.dropped_malformed,
            DropReason::MissingKey => &self.dropped_missing_key,
            DropReason::Oversized => &self.dropped_oversized,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the number of records sent to the entries queue.
    pub fn records_emitted(&self) -> u64 {
        self.records_emitted.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot {
            objects_parsed: self.objects_parsed.load(Ordering::Relaxed),
            candidates: self.candidates.load(Ordering::Relaxed),
            records_emitted: self.records_emitted.load(Ordering::Relaxed),
            dropped_validation_error: self.dropped_validation_error.load(Ordering::Relaxed),
            dropped_invalid: self.dropped_invalid.load(Ordering::Relaxed),
            dropped_malformed: self.dropped_malformed.load(Ordering::Relaxed),
            dropped_missing_key: self.dropped_missing_key.load(Ordering::Relaxed),
            dropped_oversized: self.dropped_oversized.load(Ordering::Relaxed),
        }
    }
}
