//! Parser worker pool.

use crate::config::ParserConfig;
use crate::path::FieldPath;
use crate::split::Splitter;
use crate::stats::{DropReason, ParserStats};
use rf_error::{ParseError, Result, RfError};
use rf_traits::{RecordValidator, Validation};
use rf_types::{RawObject, Record};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Turns a downloaded object into keyed records.
///
/// Every per-record problem is logged and counted, never returned.
pub struct RecordParser {
    splitter: Splitter,
    validator: Option<Arc<dyn RecordValidator>>,
    partition_key: FieldPath,
    stats: Arc<ParserStats>,
}

impl RecordParser {
    /// Build a parser from a validated configuration.
    pub fn new(
        config: &ParserConfig,
        validator: Option<Arc<dyn RecordValidator>>,
        stats: Arc<ParserStats>,
    ) -> Result<Self> {
        let splitter = Splitter::new(
            config.delimiter.as_deref(),
            config.replace.as_deref(),
            config.replace_with.as_deref(),
        )?;
        let partition_key = FieldPath::parse(&config.partition_key).ok_or_else(|| {
            RfError::Config(format!("invalid partition key path '{}'", config.partition_key))
        })?;

        Ok(Self {
            splitter,
            validator,
            partition_key,
            stats,
        })
    }

    /// Split, validate and key every candidate record in an object.
    pub fn parse(&self, object: &RawObject) -> Vec<Record> {
        let key = object.key();
        let normalized = self.splitter.normalize(&object.data);
        let candidates = self.splitter.split(&normalized);
        self.stats.record_object(candidates.len());

        let mut records = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match self.parse_candidate(candidate) {
                Ok(record) => records.push(record),
                Err(reason) => self.stats.record_drop(reason),
            }
        }

        debug!(key = %key, records = records.len(), "Parsed object");
        records
    }

    fn parse_candidate(&self, raw: &[u8]) -> std::result::Result<Record, DropReason> {
        if let Some(validator) = &self.validator {
            let text = std::str::from_utf8(raw).map_err(|e| {
                warn!(error = %e, "Skipping record with validation error");
                DropReason::ValidationError
            })?;

            match validator.validate(text) {
                Ok(Validation::Valid) => {}
                Ok(Validation::Invalid(details)) => {
                    warn!(details = %details.join("; "), "Skipping invalid record");
                    return Err(DropReason::Invalid);
                }
                Err(e) => {
                    warn!(error = %e, "Skipping record with validation error");
                    return Err(DropReason::ValidationError);
                }
            }
        }

        let document: serde_json::Value = serde_json::from_slice(raw).map_err(|e| {
            warn!(error = %e, "Unable to parse record");
            DropReason::Malformed
        })?;

        let Some(partition_key) = self.partition_key.extract(&document) else {
            warn!(path = %self.partition_key, "Missing partition key");
            return Err(DropReason::MissingKey);
        };

        Record::new(bytes::Bytes::copy_from_slice(raw), partition_key).map_err(|e| {
            warn!(error = %e, "Skipping record that exceeds stream limits");
            match e {
                ParseError::MissingPartitionKey(_) => DropReason::MissingKey,
                _ => DropReason::Oversized,
            }
        })
    }
}

/// Pool of parser workers between the raw-objects and entries queues.
pub struct ParserPool {
    parser: Arc<RecordParser>,
    concurrency: usize,
    queue_capacity: usize,
    stats: Arc<ParserStats>,
}

impl ParserPool {
    /// Create the pool. The configuration must already be validated.
    pub fn new(config: &ParserConfig, validator: Option<Arc<dyn RecordValidator>>) -> Result<Self> {
        let stats = Arc::new(ParserStats::new());
        let parser = RecordParser::new(config, validator, stats.clone())?;

        Ok(Self {
            parser: Arc::new(parser),
            concurrency: config.concurrency.max(1),
            queue_capacity: config.queue_capacity.max(1),
            stats,
        })
    }

    /// Get a reference to the parser statistics.
    pub fn stats(&self) -> &Arc<ParserStats> {
        &self.stats
    }

    /// Start the workers.
    ///
    /// Returns the entries queue and a handle that resolves once every worker
    /// has exited and the queue has been closed.
    pub fn start(
        &self,
        objects: mpsc::Receiver<RawObject>,
        cancel: CancellationToken,
    ) -> (mpsc::Receiver<Record>, JoinHandle<()>) {
        let (entries_tx, entries_rx) = mpsc::channel(self.queue_capacity);
        let objects = Arc::new(Mutex::new(objects));
        let mut workers = JoinSet::new();

        info!(concurrency = self.concurrency, "Starting parser workers");

        for id in 0..self.concurrency {
            let parser = self.parser.clone();
            let objects = objects.clone();
            let entries = entries_tx.clone();
            let cancel = cancel.clone();

            workers.spawn(async move {
                loop {
                    let object = {
                        let mut objects = objects.lock().await;
                        tokio::select! {
                            _ = cancel.cancelled() => None,
                            object = objects.recv() => object,
                        }
                    };
                    let Some(object) = object else {
                        break;
                    };

                    for record in parser.parse(&object) {
                        let sent = tokio::select! {
                            _ = cancel.cancelled() => return,
                            sent = entries.send(record) => sent,
                        };
                        if sent.is_err() {
                            warn!(worker = id, "Entries queue closed, stopping worker");
                            return;
                        }
                        parser.stats.record_emitted();
                    }
                }
                debug!(worker = id, "Parser worker finished");
            });
        }

        let handle = tokio::spawn(async move {
            while let Some(joined) = workers.join_next().await {
                if let Err(e) = joined {
                    error!(error = %e, "Parser worker panicked");
                }
            }
            drop(entries_tx);
            debug!("Parser pool finished");
        });

        (entries_rx, handle)
    }
}
