//! Configuration types for the archive stage.

use rf_traits::ListRequest;
use serde::{Deserialize, Serialize};

/// Default capacity of the pending-keys and raw-objects queues.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Default number of concurrent downloads.
pub const DEFAULT_DOWNLOAD_CONCURRENCY: usize = 4;

/// Configuration for scanning and downloading an archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Bucket that holds the archive
    pub bucket: String,

    /// Optional prefix that contains the relevant archive portion
    pub prefix: Option<String>,

    /// Optional key to begin replay after (exclusive)
    pub start_after: Option<String>,

    /// Optional key to stop replay at (exclusive)
    pub stop_at: Option<String>,

    /// Number of objects to download in parallel
    pub concurrency: usize,

    /// Capacity of the pending-keys and raw-objects queues
    pub queue_capacity: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            prefix: None,
            start_after: None,
            stop_at: None,
            concurrency: DEFAULT_DOWNLOAD_CONCURRENCY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl ArchiveConfig {
    /// Create a new configuration with the required bucket name.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Set the prefix for filtering objects.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the key to start after.
    pub fn with_start_after(mut self, key: impl Into<String>) -> Self {
        self.start_after = Some(key.into());
        self
    }

    /// Set the key to stop at.
    pub fn with_stop_at(mut self, key: impl Into<String>) -> Self {
        self.stop_at = Some(key.into());
        self
    }

    /// Set the number of download workers.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Build the listing request for this archive.
    pub fn list_request(&self) -> ListRequest {
        ListRequest {
            bucket: self.bucket.clone(),
            prefix: self.prefix.clone(),
            start_after: self.start_after.clone(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.bucket.is_empty() {
            return Err("bucket is required".to_string());
        }
        if self.concurrency == 0 {
            return Err("download concurrency must be at least 1".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("queue_capacity must be at least 1".to_string());
        }
        if let (Some(start), Some(stop)) = (&self.start_after, &self.stop_at) {
            if stop <= start {
                return Err(format!(
                    "stop_at '{stop}' must sort after start_after '{start}'"
                ));
            }
        }
        Ok(())
    }
}
