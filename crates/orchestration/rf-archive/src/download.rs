//! Concurrent download worker pool.
//!
//! Workers share the receiving end of the pending-keys queue. A worker that
//! fails a download puts the key back on the queue and exits; the pool is never
//! replenished. Once every worker has exited, the pool drops its raw-objects
//! sender, closing the queue for the parser stage.
//!
//! A pool that loses every worker to failures leaves the pipeline blocked: both
//! queues stay open until the pipeline is cancelled.

use crate::stats::ArchiveStats;
use rf_error::{ArchiveError, Result, RfError};
use rf_traits::ArchiveStore;
use rf_types::{ArchiveEntry, RawObject};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

type SharedReceiver = Arc<Mutex<mpsc::Receiver<ArchiveEntry>>>;

/// Pool of download workers.
pub struct DownloadPool {
    store: Arc<dyn ArchiveStore>,
    bucket: String,
    concurrency: usize,
    stats: Arc<ArchiveStats>,
}

impl DownloadPool {
    pub fn new(
        store: Arc<dyn ArchiveStore>,
        bucket: impl Into<String>,
        concurrency: usize,
        stats: Arc<ArchiveStats>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            concurrency: concurrency.max(1),
            stats,
        }
    }

    /// Spawn the workers and their completion barrier.
    ///
    /// `requeue` must be a weak handle to the pending queue so the scanner alone
    /// decides when it closes. The returned handle resolves after every worker
    /// has exited and `objects` has been dropped.
    pub fn spawn(
        self,
        pending: mpsc::Receiver<ArchiveEntry>,
        requeue: mpsc::WeakSender<ArchiveEntry>,
        objects: mpsc::Sender<RawObject>,
        cancel: CancellationToken,
    ) -> JoinHandle<Result<()>> {
        let pending: SharedReceiver = Arc::new(Mutex::new(pending));
        let retired = Arc::new(AtomicUsize::new(0));
        let mut workers = JoinSet::new();

        info!(
            bucket = %self.bucket,
            concurrency = self.concurrency,
            "Starting download workers"
        );

        for id in 0..self.concurrency {
            let worker = DownloadWorker {
                id,
                store: self.store.clone(),
                bucket: self.bucket.clone(),
                pending: pending.clone(),
                requeue: requeue.clone(),
                objects: objects.clone(),
                stats: self.stats.clone(),
                retired: retired.clone(),
                cancel: cancel.clone(),
            };
            workers.spawn(worker.run());
        }
        drop(requeue);

        let stats = self.stats;
        let concurrency = self.concurrency;
        tokio::spawn(async move {
            let mut first_error: Option<RfError> = None;

            while let Some(joined) = workers.join_next().await {
                match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        error!(error = %e, "Download worker failed");
                        cancel.cancel();
                        first_error.get_or_insert(e);
                    }
                    Err(e) => {
                        error!(error = %e, "Download worker panicked");
                        stats.record_worker_lost();
                    }
                }
            }

            if retired.load(Ordering::Acquire) == concurrency && !cancel.is_cancelled() {
                let pending_keys = pending.lock().await.len();
                error!(
                    pending = pending_keys,
                    "All download workers exited after failures, pipeline blocked"
                );
                cancel.cancelled().await;
            }

            // Closing order: pending receiver first so a blocked scanner wakes up,
            // then raw-objects so parsers see end-of-stream
            drop(pending);
            drop(objects);
            debug!("Download pool finished");

            match first_error {
                Some(e) => Err(e),
                None => Ok(()),
            }
        })
    }
}

struct DownloadWorker {
    id: usize,
    store: Arc<dyn ArchiveStore>,
    bucket: String,
    pending: SharedReceiver,
    requeue: mpsc::WeakSender<ArchiveEntry>,
    objects: mpsc::Sender<RawObject>,
    stats: Arc<ArchiveStats>,
    retired: Arc<AtomicUsize>,
    cancel: CancellationToken,
}

impl DownloadWorker {
    async fn run(self) -> Result<()> {
        loop {
            let entry = {
                let mut pending = self.pending.lock().await;
                tokio::select! {
                    _ = self.cancel.cancelled() => None,
                    entry = pending.recv() => entry,
                }
            };
            let Some(entry) = entry else {
                break;
            };

            let downloaded = tokio::select! {
                _ = self.cancel.cancelled() => break,
                downloaded = self.store.download(&self.bucket, &entry.key) => downloaded,
            };

            match downloaded {
                Ok(data) => {
                    self.stats.record_download(data.len() as u64);
                    debug!(worker = self.id, key = %entry.key, bytes = data.len(), "Downloaded object");

                    let object = RawObject::new(entry, data);
                    let sent = tokio::select! {
                        _ = self.cancel.cancelled() => break,
                        sent = self.objects.send(object) => sent,
                    };
                    if sent.is_err() {
                        warn!(worker = self.id, "Raw-objects queue closed, stopping worker");
                        break;
                    }
                }
                Err(e) => {
                    warn!(worker = self.id, key = %entry.key, error = %e, "Download failed, re-queueing key");
                    self.stats.record_download_failure();
                    self.stats.record_worker_lost();
                    return self.retire(entry).await;
                }
            }
        }

        Ok(())
    }

    /// Put a failed key back on the pending queue and retire this worker.
    async fn retire(self, entry: ArchiveEntry) -> Result<()> {
        let retired = self.retired.fetch_add(1, Ordering::AcqRel) + 1;

        let Some(pending) = self.requeue.upgrade() else {
            error!(worker = self.id, key = %entry.key, "Pending queue closed, key cannot be re-queued");
            return Err(ArchiveError::Requeue { key: entry.key }.into());
        };

        tokio::select! {
            _ = self.cancel.cancelled() => {}
            sent = pending.send(entry) => {
                if let Err(rejected) = sent {
                    error!(worker = self.id, key = %rejected.0.key, "Pending queue closed, key cannot be re-queued");
                    return Err(ArchiveError::Requeue { key: rejected.0.key }.into());
                }
            }
        }
        debug!(worker = self.id, retired, "Download worker retired");
        Ok(())
    }
}
