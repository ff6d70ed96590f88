//! Archive stage: scanner plus download pool.

use crate::config::ArchiveConfig;
use crate::download::DownloadPool;
use crate::scanner::{ScanOutcome, Scanner};
use crate::stats::ArchiveStats;
use rf_error::{Result, RfError};
use rf_traits::ArchiveStore;
use rf_types::RawObject;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Lists an archive and downloads every key in range.
pub struct Archive {
    store: Arc<dyn ArchiveStore>,
    config: ArchiveConfig,
    stats: Arc<ArchiveStats>,
}

impl Archive {
    /// Create the stage. The configuration must already be validated.
    pub fn new(store: Arc<dyn ArchiveStore>, config: ArchiveConfig) -> Self {
        Self {
            store,
            config,
            stats: Arc::new(ArchiveStats::new()),
        }
    }

    /// Get a reference to the archive statistics.
    pub fn stats(&self) -> &Arc<ArchiveStats> {
        &self.stats
    }

    /// Start scanning and downloading.
    ///
    /// Returns the raw-objects queue and a handle that resolves once the scan
    /// has ended and the download pool has closed the queue.
    pub fn start(
        &self,
        cancel: CancellationToken,
    ) -> (mpsc::Receiver<RawObject>, JoinHandle<Result<ScanOutcome>>) {
        let (pending_tx, pending_rx) = mpsc::channel(self.config.queue_capacity);
        let (objects_tx, objects_rx) = mpsc::channel(self.config.queue_capacity);

        info!(
            bucket = %self.config.bucket,
            prefix = ?self.config.prefix,
            start_after = ?self.config.start_after,
            stop_at = ?self.config.stop_at,
            "Starting archive replay"
        );

        let pool = DownloadPool::new(
            self.store.clone(),
            self.config.bucket.clone(),
            self.config.concurrency,
            self.stats.clone(),
        );
        let pool_handle = pool.spawn(
            pending_rx,
            pending_tx.downgrade(),
            objects_tx,
            cancel.clone(),
        );

        let scanner = Scanner::new(
            self.store.clone(),
            self.config.list_request(),
            self.config.stop_at.clone(),
            self.stats.clone(),
        );

        let handle = tokio::spawn(async move {
            let outcome = scanner.run(pending_tx, cancel).await;

            pool_handle.await.map_err(|e| {
                RfError::Other(anyhow::anyhow!("download pool task failed: {e}"))
            })??;

            Ok(outcome)
        });

        (objects_rx, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryArchiveStore;
    use rf_error::ArchiveError;

    fn store(count: usize) -> MemoryArchiveStore {
        let mut store = MemoryArchiveStore::new().with_page_size(3);
        for i in 0..count {
            store = store.with_object(format!("k{i:02}"), format!("{{\"n\":{i}}}"));
        }
        store
    }

    async fn drain(mut rx: mpsc::Receiver<RawObject>) -> Vec<String> {
        let mut keys = Vec::new();
        while let Some(object) = rx.recv().await {
            keys.push(object.entry.key);
        }
        keys.sort();
        keys
    }

    #[tokio::test]
    async fn test_every_key_downloaded_exactly_once() {
        let archive = Archive::new(
            Arc::new(store(10)),
            ArchiveConfig::new("bucket").with_concurrency(3),
        );
        let (rx, handle) = archive.start(CancellationToken::new());

        let keys = drain(rx).await;
        let expected: Vec<String> = (0..10).map(|i| format!("k{i:02}")).collect();
        assert_eq!(keys, expected);

        assert_eq!(handle.await.unwrap().unwrap(), ScanOutcome::Exhausted);
        assert_eq!(archive.stats().objects_downloaded(), 10);
    }

    #[tokio::test]
    async fn test_stop_key_bounds_downloads() {
        let archive = Archive::new(
            Arc::new(store(10)),
            ArchiveConfig::new("bucket")
                .with_start_after("k01")
                .with_stop_at("k05"),
        );
        let (rx, handle) = archive.start(CancellationToken::new());

        assert_eq!(drain(rx).await, vec!["k02", "k03", "k04"]);
        assert_eq!(
            handle.await.unwrap().unwrap(),
            ScanOutcome::StoppedAt("k05".to_string())
        );
    }

    #[tokio::test]
    async fn test_transient_failure_retried_by_other_worker() {
        // A small queue keeps the scanner running while the failed key is re-queued
        let store = Arc::new(store(20).with_download_failures("k00", 1));
        let archive = Archive::new(
            store.clone(),
            ArchiveConfig::new("bucket")
                .with_concurrency(2)
                .with_queue_capacity(1),
        );
        let (rx, handle) = archive.start(CancellationToken::new());

        let keys = drain(rx).await;
        assert_eq!(keys.len(), 20);
        assert_eq!(keys[0], "k00");

        handle.await.unwrap().unwrap();
        let snapshot = archive.stats().snapshot();
        assert_eq!(snapshot.download_failures, 1);
        assert_eq!(snapshot.workers_lost, 1);
        assert_eq!(store.download_calls(), 21);
    }

    #[tokio::test]
    async fn test_failure_after_scan_closed_is_fatal() {
        let store = Arc::new(store(1).with_download_failures("k00", 1));
        let archive = Archive::new(store, ArchiveConfig::new("bucket").with_concurrency(1));
        let cancel = CancellationToken::new();
        let (rx, handle) = archive.start(cancel.clone());

        assert!(drain(rx).await.is_empty());
        let result = handle.await.unwrap();
        assert!(matches!(
            result,
            Err(RfError::Archive(ArchiveError::Requeue { .. }))
        ));
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_list_failure_still_closes_queue() {
        let store = Arc::new(store(6).with_list_failure_at_page(1));
        let archive = Archive::new(store, ArchiveConfig::new("bucket"));
        let (rx, handle) = archive.start(CancellationToken::new());

        assert_eq!(drain(rx).await, vec!["k00", "k01", "k02"]);
        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(outcome, ScanOutcome::Failed(_)));
    }
}
