//! Size-or-timeout micro-batching.

use rf_types::{Batch, MAX_BATCH_RECORDS, Record};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, trace};

/// Collects records from the entries queue into batches.
///
/// The window starts when the first record of a batch arrives. A batch is
/// flushed when it reaches `max_size`, when the window expires, or when the
/// queue closes.
#[derive(Debug, Clone)]
pub struct Batcher {
    window: Duration,
    max_size: usize,
}

impl Batcher {
    pub fn new(window: Duration, max_size: usize) -> Self {
        Self {
            window,
            max_size: max_size.clamp(1, MAX_BATCH_RECORDS),
        }
    }

    /// Wait for the next batch. Returns `None` once the queue is closed and drained.
    pub async fn next_batch(&self, entries: &mut mpsc::Receiver<Record>) -> Option<Batch> {
        let first = entries.recv().await?;
        let mut records = Vec::with_capacity(self.max_size);
        records.push(first);

        let deadline = tokio::time::sleep(self.window);
        tokio::pin!(deadline);

        while records.len() < self.max_size {
            tokio::select! {
                _ = &mut deadline => {
                    trace!(count = records.len(), "Batch window elapsed");
                    break;
                }
                next = entries.recv() => match next {
                    Some(record) => records.push(record),
                    None => break,
                },
            }
        }

        match Batch::new(records) {
            Ok(batch) => Some(batch),
            Err(records) => {
                error!(count = records.len(), "Batch size out of bounds");
                None
            }
        }
    }
}
