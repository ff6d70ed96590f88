//! Statistics for the archive stage.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the scanner and download workers.
#[derive(Debug, Default)]
pub struct ArchiveStats {
    keys_listed: AtomicU64,
    pages_listed: AtomicU64,
    objects_downloaded: AtomicU64,
    bytes_downloaded: AtomicU64,
    download_failures: AtomicU64,
    workers_lost: AtomicU64,
    scan_error: Mutex<Option<String>>,
    stopped_at: Mutex<Option<String>>,
}

/// Point-in-time copy of [`ArchiveStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveSnapshot {
    pub keys_listed: u64,
    pub pages_listed: u64,
    pub objects_downloaded: u64,
    pub bytes_downloaded: u64,
    pub download_failures: u64,
    pub workers_lost: u64,
    pub scan_error: Option<String>,
    pub stopped_at: Option<String>,
}

impl ArchiveStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page(&self) {
        self.pages_listed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_key(&self) {
        self.keys_listed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_download(&self, bytes: u64) {
        self.objects_downloaded.fetch_add(1, Ordering::Relaxed);
        self.bytes_downloaded.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_download_failure(&self) {
        self.download_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_worker_lost(&self) {
        self.workers_lost.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan_error(&self, error: impl Into<String>) {
        *self.scan_error.lock() = Some(error.into());
    }

    pub fn record_stop(&self, key: impl Into<String>) {
        *self.stopped_at.lock() = Some(key.into());
    }

    /// Get the number of keys queued for download.
    pub fn keys_listed(&self) -> u64 {
        self.keys_listed.load(Ordering::Relaxed)
    }

    /// Get the number of objects downloaded.
    pub fn objects_downloaded(&self) -> u64 {
        self.objects_downloaded.load(Ordering::Relaxed)
    }

    /// Get the number of workers that exited after a failed download.
    pub fn workers_lost(&self) -> u64 {
        self.workers_lost.load(Ordering::Relaxed)
    }

    /// Take a snapshot of all counters.
    pub fn snapshot(&self) -> ArchiveSnapshot {
        ArchiveSnapshot {
            keys_listed: self.keys_listed.load(Ordering::Relaxed),
            pages_listed: self.pages_listed.load(Ordering::Relaxed),
            objects_downloaded: self.objects_downloaded.load(Ordering::Relaxed),
            bytes_downloaded: self.bytes_downloaded.load(Ordering::Relaxed),
            download_failures: self.download_failures.load(Ordering::Relaxed),
            workers_lost: self.workers_lost.load(Ordering::Relaxed),
            scan_error: self.scan_error.lock().clone(),
            stopped_at: self.stopped_at.lock().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot() {
        let stats = ArchiveStats::new();
        stats.record_page();
        stats.record_key();
        stats.record_key();
        stats.record_download(100);
        stats.record_download_failure();
        stats.record_worker_lost();
        stats.record_stop("k9");

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.pages_listed, 1);
        assert_eq!(snapshot.keys_listed, 2);
        assert_eq!(snapshot.objects_downloaded, 1);
        assert_eq!(snapshot.bytes_downloaded, 100);
        assert_eq!(snapshot.download_failures, 1);
        assert_eq!(snapshot.workers_lost, 1);
        assert_eq!(snapshot.stopped_at.as_deref(), Some("k9"));
        assert!(snapshot.scan_error.is_none());
    }
}
