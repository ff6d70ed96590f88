//! Statistics for the publisher.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the publisher loop.
#[derive(Debug, Default)]
pub struct PublisherStats {
    batches_published: AtomicU64,
    records_published: AtomicU64,
    bytes_published: AtomicU64,
    requests: AtomicU64,
    request_failures: AtomicU64,
    record_failures: AtomicU64,
    partial_retries: AtomicU64,
}

/// Point-in-time copy of [`PublisherStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublisherSnapshot {
    pub batches_published: u64,
    pub records_published: u64,
    pub bytes_published: u64,
    pub requests: u64,
    pub request_failures: u64,
    pub record_failures: u64,
    pub partial_retries: u64,
}

impl PublisherStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request_failure(&self) {
        self.request_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_accepted(&self, records: usize, bytes: usize) {
        self.records_published.fetch_add(records as u64, Ordering::Relaxed);
        self.bytes_published.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_partial_failure(&self, failed: usize) {
        self.record_failures.fetch_add(failed as u64, Ordering::Relaxed);
        self.partial_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch(&self) {
        self.batches_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the number of records acknowledged by the stream.
    pub fn records_published(&self) -> u64 {
        self.records_published.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> PublisherSnapshot {
        PublisherSnapshot {
            batches_published: self.batches_published.load(Ordering::Relaxed),
            records_published: self.records_published.load(Ordering::Relaxed),
            bytes_published: self.bytes_published.load(Ordering::Relaxed),
            requests: self.requests.load(Ordering::Relaxed),
            request_failures: self.request_failures.load(Ordering::Relaxed),
            record_failures: self.record_failures.load(Ordering::Relaxed),
            partial_retries: self.partial_retries.load(Ordering::Relaxed),
        }
    }
}
