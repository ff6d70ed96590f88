//! Replay orchestration.

use crate::config::ReplayConfig;
use crate::stats::ReplaySnapshot;
use chrono::Utc;
use rf_archive::{Archive, ScanOutcome};
use rf_error::{Result, RfError};
use rf_parser::ParserPool;
use rf_publisher::Publisher;
use rf_traits::{ArchiveStore, RecordValidator, StreamWriter};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Replays an archive into a stream.
///
/// The pipeline is scanner → download pool → parser pool → publisher, joined by
/// three bounded queues. Each queue is closed by the stage writing to it once
/// all its writers are done. The first fatal error cancels every stage.
pub struct Replay {
    config: ReplayConfig,
    store: Arc<dyn ArchiveStore>,
    stream: Arc<dyn StreamWriter>,
    validator: Option<Arc<dyn RecordValidator>>,
}

impl Replay {
    pub fn new(
        config: ReplayConfig,
        store: Arc<dyn ArchiveStore>,
        stream: Arc<dyn StreamWriter>,
    ) -> Self {
        Self {
            config,
            store,
            stream,
            validator: None,
        }
    }

    /// Validate records against a schema before publishing.
    pub fn with_validator(mut self, validator: Arc<dyn RecordValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Run the pipeline to completion.
    pub async fn run(&self) -> Result<ReplaySnapshot> {
        self.config.validate().map_err(RfError::Config)?;

        let started_at = Utc::now();
        let cancel = CancellationToken::new();

        info!(
            bucket = %self.config.archive.bucket,
            stream = %self.stream.target(),
            download_concurrency = self.config.archive.concurrency,
            parser_concurrency = self.config.parser.concurrency,
            "Starting replay"
        );

        let archive = Archive::new(self.store.clone(), self.config.archive.clone());
        let parser = ParserPool::new(&self.config.parser, self.validator.clone())?;
        let publisher = Publisher::new(self.stream.clone(), self.config.publisher.clone());
        let publisher_stats = publisher.stats().clone();

        let (objects, archive_handle) = archive.start(cancel.clone());
        let (entries, parser_handle) = parser.start(objects, cancel.clone());
        let publisher_handle = publisher.spawn(entries, cancel.clone());

        let published = publisher_handle.join().await;
        let parsed = parser_handle.await.map_err(|e| {
            cancel.cancel();
            RfError::Other(anyhow::anyhow!("parser pool task failed: {e}"))
        });
        let scanned = archive_handle
            .await
            .map_err(|e| RfError::Other(anyhow::anyhow!("archive task failed: {e}")))
            .and_then(|outcome| outcome);

        let mut errors = Vec::new();
        if let Err(e) = published {
            errors.push(e);
        }
        if let Err(e) = parsed {
            errors.push(e);
        }
        let scan = match scanned {
            Ok(scan) => scan,
            Err(e) => {
                errors.push(e);
                ScanOutcome::Cancelled
            }
        };

        if let Some(e) = root_cause(errors) {
            error!(error = %e, "Replay aborted");
            return Err(e);
        }

        let snapshot = ReplaySnapshot {
            started_at,
            completed_at: Utc::now(),
            scan,
            archive: archive.stats().snapshot(),
            parser: parser.stats().snapshot(),
            publisher: publisher_stats.snapshot(),
        };

        info!(
            objects = snapshot.archive.objects_downloaded,
            records = snapshot.publisher.records_published,
            dropped = snapshot.parser.dropped(),
            duration_ms = snapshot.duration().num_milliseconds(),
            "Replay completed"
        );

        Ok(snapshot)
    }
}

/// The error that triggered cancellation, rather than the stages it stopped.
fn root_cause(errors: Vec<RfError>) -> Option<RfError> {
    let mut cancelled = None;
    for e in errors {
        if matches!(e, RfError::Cancelled) {
            cancelled.get_or_insert(e);
        } else {
            return Some(e);
        }
    }
    cancelled
}
