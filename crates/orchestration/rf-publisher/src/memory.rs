//! In-process stream writer.
//!
//! Records every request and acknowledges records unless a failure is
//! scripted for that call.

use async_trait::async_trait;
use parking_lot::Mutex;
use rf_error::{Result, RfError, StreamError};
use rf_traits::StreamWriter;
use rf_types::{PutRecordsOutcome, Record, RecordOutcome};
use std::collections::VecDeque;

/// Scripted response for one call.
#[derive(Debug, Clone)]
pub enum StreamFault {
    /// Reject the positions listed, accept the rest
    FailPositions(Vec<usize>),

    /// Throttle the whole request (retryable)
    Throttle,

    /// Reject the whole request permanently
    NotFound,

    /// Accept nothing and report every record failed without per-record entries
    Unaccounted,
}

/// [`StreamWriter`] that keeps every request in memory.
#[derive(Debug)]
pub struct MemoryStream {
    name: String,
    calls: Mutex<Vec<Vec<Record>>>,
    accepted: Mutex<Vec<Record>>,
    faults: Mutex<VecDeque<Option<StreamFault>>>,
    sequence: Mutex<u64>,
}

impl MemoryStream {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: Mutex::new(Vec::new()),
            accepted: Mutex::new(Vec::new()),
            faults: Mutex::new(VecDeque::new()),
            sequence: Mutex::new(0),
        }
    }

    /// Script a fault for the next unscripted call.
    pub fn then_fault(self, fault: StreamFault) -> Self {
        self.faults.lock().push_back(Some(fault));
        self
    }

    /// Script a fully successful call. Calls beyond the script also succeed.
    pub fn then_succeed(self) -> Self {
        self.faults.lock().push_back(None);
        self
    }

    /// Every request received, in order.
    pub fn calls(&self) -> Vec<Vec<Record>> {
        self.calls.lock().clone()
    }

    /// Records acknowledged across all calls, in acknowledgment order.
    pub fn accepted(&self) -> Vec<Record> {
        self.accepted.lock().clone()
    }
}

#[async_trait]
impl StreamWriter for MemoryStream {
    async fn put_records(&self, records: &[Record]) -> Result<PutRecordsOutcome> {
        self.calls.lock().push(records.to_vec());

        let fault = self.faults.lock().pop_front().flatten();
        let failed: Vec<usize> = match fault {
            Some(StreamFault::Throttle) => {
                return Err(StreamError::Throttled(format!(
                    "rate exceeded for stream {}",
                    self.name
                ))
                .into());
            }
            Some(StreamFault::NotFound) => {
                return Err(RfError::Stream(StreamError::NotFound(self.name.clone())));
            }
            Some(StreamFault::Unaccounted) => {
                return Ok(PutRecordsOutcome {
                    records: Vec::new(),
                    failed_count: records.len(),
                });
            }
            Some(StreamFault::FailPositions(positions)) => positions,
            None => Vec::new(),
        };

        let mut sequence = self.sequence.lock();
        let outcomes = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                if failed.contains(&i) {
                    RecordOutcome::failed(
                        "ProvisionedThroughputExceededException",
                        "Rate exceeded for shard",
                    )
                } else {
                    *sequence += 1;
                    self.accepted.lock().push(record.clone());
                    RecordOutcome::accepted("shardId-000000000000", sequence.to_string())
                }
            })
            .collect();

        Ok(PutRecordsOutcome::from_records(outcomes))
    }

    fn target(&self) -> &str {
        &self.name
    }
}
