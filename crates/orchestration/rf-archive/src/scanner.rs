//! Ordered key listing into the pending-keys queue.

use crate::stats::ArchiveStats;
use rf_traits::{ArchiveStore, ListRequest};
use rf_types::ArchiveEntry;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// How a scan ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Every key in range was queued
    Exhausted,

    /// Reached the first key at or after the stop key
    StoppedAt(String),

    /// A listing call failed
    Failed(String),

    /// The pipeline was cancelled
    Cancelled,

    /// Every download worker had exited
    ConsumersGone,
}

impl ScanOutcome {
    /// Whether the scan covered the whole requested range.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Exhausted | Self::StoppedAt(_))
    }
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "exhausted"),
            Self::StoppedAt(key) => write!(f, "stopped at {key}"),
            Self::Failed(error) => write!(f, "failed: {error}"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::ConsumersGone => write!(f, "no download workers left"),
        }
    }
}

/// Lists archive keys in ascending order and pushes them onto the pending queue.
pub struct Scanner {
    store: Arc<dyn ArchiveStore>,
    request: ListRequest,
    stop_at: Option<String>,
    stats: Arc<ArchiveStats>,
}

impl Scanner {
    pub fn new(
        store: Arc<dyn ArchiveStore>,
        request: ListRequest,
        stop_at: Option<String>,
        stats: Arc<ArchiveStats>,
    ) -> Self {
        Self {
            store,
            request,
            stop_at,
            stats,
        }
    }

    /// Run the scan to completion.
    ///
    /// The sender is consumed, so the pending queue closes when this returns
    /// (download workers only hold weak handles).
    pub async fn run(
        self,
        pending: mpsc::Sender<ArchiveEntry>,
        cancel: CancellationToken,
    ) -> ScanOutcome {
        let outcome = self.scan(&pending, &cancel).await;

        match &outcome {
            ScanOutcome::Exhausted => {
                info!(keys = self.stats.keys_listed(), "Archive listing exhausted")
            }
            ScanOutcome::StoppedAt(key) => {
                info!(key = %key, keys = self.stats.keys_listed(), "Reached stop key")
            }
            ScanOutcome::Failed(_) | ScanOutcome::Cancelled | ScanOutcome::ConsumersGone => {}
        }

        outcome
    }

    async fn scan(
        &self,
        pending: &mpsc::Sender<ArchiveEntry>,
        cancel: &CancellationToken,
    ) -> ScanOutcome {
        let mut token: Option<String> = None;

        loop {
            let page = tokio::select! {
                _ = cancel.cancelled() => return ScanOutcome::Cancelled,
                page = self.store.list_page(&self.request, token.take()) => page,
            };

            let page = match page {
                Ok(page) => page,
                Err(e) => {
                    error!(bucket = %self.request.bucket, error = %e, "Archive listing failed");
                    self.stats.record_scan_error(e.to_string());
                    return ScanOutcome::Failed(e.to_string());
                }
            };
            self.stats.record_page();
            debug!(count = page.entries.len(), "Listed page");

            for entry in page.entries {
                // Skip directory markers
                if entry.key.is_empty() || entry.key.ends_with('/') {
                    continue;
                }

                if let Some(stop_at) = &self.stop_at {
                    if entry.key.as_str() >= stop_at.as_str() {
                        self.stats.record_stop(entry.key.clone());
                        return ScanOutcome::StoppedAt(entry.key);
                    }
                }

                tokio::select! {
                    _ = cancel.cancelled() => return ScanOutcome::Cancelled,
                    sent = pending.send(entry) => {
                        if let Err(rejected) = sent {
                            warn!(
                                key = %rejected.0.key,
                                "No download workers left, stopping scan"
                            );
                            return ScanOutcome::ConsumersGone;
                        }
                    }
                }
                self.stats.record_key();
            }

            match page.next_token {
                Some(next) => token = Some(next),
                None => return ScanOutcome::Exhausted,
            }
        }
    }
}
