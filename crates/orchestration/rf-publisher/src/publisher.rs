//! The publish loop: batching, whole-request retry and partial-failure resubmission.

use crate::backoff::ExponentialBackoff;
use crate::batcher::Batcher;
use crate::config::PublisherConfig;
use crate::stats::PublisherStats;
use rf_error::{
    ErrorCategory, ProcessingStage, Result, RfError, StreamError, classify_error,
};
use rf_traits::StreamWriter;
use rf_types::{Batch, PutRecordsOutcome, Record};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Single consumer of the entries queue.
pub struct Publisher {
    stream: Arc<dyn StreamWriter>,
    config: PublisherConfig,
    stats: Arc<PublisherStats>,
}

impl Publisher {
    /// Create a publisher. The configuration must already be validated.
    pub fn new(stream: Arc<dyn StreamWriter>, config: PublisherConfig) -> Self {
        Self {
            stream,
            config,
            stats: Arc::new(PublisherStats::new()),
        }
    }

    /// Get a reference to the publisher statistics.
    pub fn stats(&self) -> &Arc<PublisherStats> {
        &self.stats
    }

    /// Spawn the publish loop.
    ///
    /// A fatal error cancels `cancel` so the upstream stages stop as well.
    pub fn spawn(self, entries: mpsc::Receiver<Record>, cancel: CancellationToken) -> PublisherHandle {
        let stats = self.stats.clone();
        let handle = tokio::spawn(async move {
            let result = self.run(entries, &cancel).await;
            if let Err(e) = &result {
                if !matches!(e, RfError::Cancelled) {
                    error!(error = %e, "Publisher failed, aborting replay");
                    cancel.cancel();
                }
            }
            result
        });

        PublisherHandle { handle, stats }
    }

    async fn run(self, mut entries: mpsc::Receiver<Record>, cancel: &CancellationToken) -> Result<()> {
        let batcher = Batcher::new(self.config.batch_window, self.config.max_batch_size);
        let mut backoff = ExponentialBackoff::from_config(&self.config);

        info!(
            stream = %self.stream.target(),
            window_ms = self.config.batch_window.as_millis() as u64,
            max_batch_size = self.config.max_batch_size,
            "Starting publisher"
        );

        loop {
            let batch = tokio::select! {
                _ = cancel.cancelled() => return Err(RfError::Cancelled),
                batch = batcher.next_batch(&mut entries) => batch,
            };
            let Some(batch) = batch else {
                break;
            };

            tokio::select! {
                _ = cancel.cancelled() => return Err(RfError::Cancelled),
                published = self.publish(batch, &mut backoff) => published?,
            }
        }

        info!(
            records = self.stats.records_published(),
            "Entries queue drained, publisher finished"
        );
        Ok(())
    }

    /// Publish one batch until every record is acknowledged.
    async fn publish(&self, batch: Batch, backoff: &mut ExponentialBackoff) -> Result<()> {
        backoff.reset();
        let total = batch.len();
        let mut pending: Vec<Record> = batch.into_records();

        while !pending.is_empty() {
            let outcome = self.put_with_retry(&pending, backoff).await?;

            let failed = outcome.failed_positions();
            let accepted = pending.len().saturating_sub(failed.len());
            let accepted_bytes: usize = pending
                .iter()
                .enumerate()
                .filter(|(i, _)| !failed.contains(i))
                .map(|(_, r)| r.size_bytes())
                .sum();
            self.stats.record_accepted(accepted, accepted_bytes);

            if failed.is_empty() {
                break;
            }

            warn!(
                failed = failed.len(),
                error_code = outcome.first_error_code().unwrap_or("unknown"),
                "Scheduling retry of failed records"
            );
            self.stats.record_partial_failure(failed.len());
            pending = retain_positions(pending, &failed);

            // Partial failures have no retry ceiling; past the elapsed budget keep
            // pausing for the longest interval
            let pause = backoff
                .next_backoff()
                .unwrap_or_else(|| backoff.max_interval());
            tokio::time::sleep(pause).await;
        }

        self.stats.record_batch();
        debug!(records = total, "Batch acknowledged");
        Ok(())
    }

    /// Issue one bulk write, retrying whole-request failures with backoff.
    async fn put_with_retry(
        &self,
        records: &[Record],
        backoff: &mut ExponentialBackoff,
    ) -> Result<PutRecordsOutcome> {
        // Every request gets the full elapsed budget; partial-failure pauses
        // before it must not use it up
        backoff.restart_clock();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            self.stats.record_request();

            let error = match self.stream.put_records(records).await {
                Ok(outcome) if outcome.covers(records.len()) => return Ok(outcome),
                // Failures without positions cannot be retargeted, so resend the full set
                Ok(outcome) => RfError::Stream(StreamError::Unavailable(format!(
                    "response reported {} failed records across {} entries for {} submitted",
                    outcome.failed_count,
                    outcome.records.len(),
                    records.len()
                ))),
                Err(e) => e,
            };

            self.stats.record_request_failure();
            warn!(
                attempt = attempts,
                records = records.len(),
                error = %error,
                "Stream request failed"
            );

            if classify_error(&error, ProcessingStage::Publish) == ErrorCategory::Permanent {
                return Err(error);
            }

            match backoff.next_backoff() {
                Some(wait) => tokio::time::sleep(wait).await,
                None => {
                    return Err(StreamError::BackoffExhausted {
                        attempts,
                        last_error: error.to_string(),
                    }
                    .into());
                }
            }
        }
    }
}

/// Keep only the records at the given positions, preserving order.
fn retain_positions(records: Vec<Record>, positions: &[usize]) -> Vec<Record> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| positions.contains(&i).then_some(record))
        .collect()
}

/// Handle to a running publisher.
pub struct PublisherHandle {
    handle: JoinHandle<Result<()>>,
    stats: Arc<PublisherStats>,
}

impl PublisherHandle {
    /// Get a reference to the publisher statistics.
    pub fn stats(&self) -> &Arc<PublisherStats> {
        &self.stats
    }

    /// Wait until every batch has been acknowledged or the publisher failed.
    pub async fn join(self) -> Result<()> {
        self.handle
            .await
            .map_err(|e| RfError::Other(anyhow::anyhow!("publisher task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryStream, StreamFault};
    use std::time::Duration;

    fn record(id: &str) -> Record {
        Record::new(format!("{{\"id\":\"{id}\"}}"), id).unwrap()
    }

    fn config() -> PublisherConfig {
        PublisherConfig::new()
            .with_batch_window(Duration::from_millis(50))
            .with_backoff_interval(Duration::from_millis(100))
            .with_backoff_max_interval(Duration::from_secs(1))
    }

    async fn publish_all(
        stream: Arc<MemoryStream>,
        config: PublisherConfig,
        records: Vec<Record>,
    ) -> (Result<()>, Arc<PublisherStats>, CancellationToken) {
        let (tx, rx) = mpsc::channel(2000);
        for record in records {
            tx.send(record).await.unwrap();
        }
        drop(tx);

        let cancel = CancellationToken::new();
        let handle = Publisher::new(stream, config).spawn(rx, cancel.clone());
        let stats = handle.stats().clone();
        (handle.join().await, stats, cancel)
    }

    fn keys(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.partition_key()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_batch_published() {
        let stream = Arc::new(MemoryStream::new("replay"));
        let (result, stats, _) =
            publish_all(stream.clone(), config(), vec![record("a"), record("b"), record("c")]).await;

        result.unwrap();
        let calls = stream.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(keys(&calls[0]), vec!["a", "b", "c"]);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.batches_published, 1);
        assert_eq!(snapshot.records_published, 3);
        assert_eq!(snapshot.requests, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_failure_resends_only_failed_record() {
        let stream = Arc::new(
            MemoryStream::new("replay").then_fault(StreamFault::FailPositions(vec![1])),
        );
        let records = vec![record("a"), record("b"), record("c")];
        let (result, stats, _) = publish_all(stream.clone(), config(), records.clone()).await;

        result.unwrap();
        let calls = stream.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], vec![records[1].clone()]);
        assert_eq!(keys(&stream.accepted()), vec!["a", "c", "b"]);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.records_published, 3);
        assert_eq!(snapshot.record_failures, 1);
        assert_eq!(snapshot.partial_retries, 1);
        assert_eq!(snapshot.batches_published, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_partial_failures_shrink_subset() {
        let stream = Arc::new(
            MemoryStream::new("replay")
                .then_fault(StreamFault::FailPositions(vec![0, 2]))
                .then_fault(StreamFault::FailPositions(vec![1])),
        );
        let records = vec![record("a"), record("b"), record("c"), record("d")];
        let (result, _, _) = publish_all(stream.clone(), config(), records).await;

        result.unwrap();
        let calls = stream.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(keys(&calls[1]), vec!["a", "c"]);
        assert_eq!(keys(&calls[2]), vec!["c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_whole_request_failure_retries_full_set() {
        let stream = Arc::new(
            MemoryStream::new("replay")
                .then_fault(StreamFault::Throttle)
                .then_fault(StreamFault::Throttle),
        );
        let records = vec![record("a"), record("b")];
        let (result, stats, _) = publish_all(stream.clone(), config(), records).await;

        result.unwrap();
        let calls = stream.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|call| keys(call) == vec!["a", "b"]));
        assert_eq!(stats.snapshot().request_failures, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_failure_after_partial_failures_is_retried() {
        let mut stream = MemoryStream::new("replay");
        for _ in 0..5 {
            stream = stream.then_fault(StreamFault::FailPositions(vec![0]));
        }
        let stream = Arc::new(stream.then_fault(StreamFault::Throttle));
        let config = config()
            .with_backoff_interval(Duration::from_secs(1))
            .with_backoff_max_interval(Duration::from_secs(1))
            .with_backoff_max_elapsed(Duration::from_secs(3))
            .with_randomization_factor(0.0);

        let (result, stats, _) = publish_all(stream.clone(), config, vec![record("a")]).await;

        result.unwrap();
        assert_eq!(stream.calls().len(), 7);
        assert_eq!(keys(&stream.accepted()), vec!["a"]);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.partial_retries, 5);
        assert_eq!(snapshot.request_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unaccounted_failures_resend_full_set() {
        let stream = Arc::new(MemoryStream::new("replay").then_fault(StreamFault::Unaccounted));
        let records = vec![record("a"), record("b")];
        let (result, stats, _) = publish_all(stream.clone(), config(), records).await;

        result.unwrap();
        let calls = stream.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(keys(&calls[1]), vec!["a", "b"]);
        assert_eq!(keys(&stream.accepted()), vec!["a", "b"]);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.request_failures, 1);
        assert_eq!(snapshot.records_published, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_failure_aborts() {
        let stream = Arc::new(MemoryStream::new("replay").then_fault(StreamFault::NotFound));
        let (result, _, cancel) = publish_all(stream.clone(), config(), vec![record("a")]).await;

        assert!(matches!(
            result,
            Err(RfError::Stream(StreamError::NotFound(_)))
        ));
        assert_eq!(stream.calls().len(), 1);
        assert!(cancel.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_exhaustion_aborts() {
        let mut stream = MemoryStream::new("replay");
        for _ in 0..100 {
            stream = stream.then_fault(StreamFault::Throttle);
        }
        let config = config().with_backoff_max_elapsed(Duration::from_secs(3));
        let (result, _, _) = publish_all(Arc::new(stream), config, vec![record("a")]).await;

        assert!(matches!(
            result,
            Err(RfError::Stream(StreamError::BackoffExhausted { .. }))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_split_by_max_size() {
        let stream = Arc::new(MemoryStream::new("replay"));
        let records: Vec<Record> = (0..1001).map(|i| record(&i.to_string())).collect();
        let (result, stats, _) = publish_all(stream.clone(), config(), records).await;

        result.unwrap();
        let sizes: Vec<usize> = stream.calls().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![500, 500, 1]);
        assert_eq!(stats.snapshot().batches_published, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_publisher() {
        let stream = Arc::new(MemoryStream::new("replay"));
        let (_tx, rx) = mpsc::channel::<Record>(10);
        let cancel = CancellationToken::new();
        let handle = Publisher::new(stream, config()).spawn(rx, cancel.clone());

        cancel.cancel();
        assert!(matches!(handle.join().await, Err(RfError::Cancelled)));
    }
}
