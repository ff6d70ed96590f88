//! Archive store trait and listing types.

use async_trait::async_trait;
use bytes::Bytes;
use rf_error::Result;
use rf_types::ArchiveEntry;

/// Parameters for listing an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// Bucket holding the archive
    pub bucket: String,

    /// Optional key prefix
    pub prefix: Option<String>,

    /// List keys strictly after this key
    pub start_after: Option<String>,
}

impl ListRequest {
    /// Create a listing request for a bucket.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Restrict the listing to a prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Start listing strictly after a key.
    pub fn with_start_after(mut self, key: impl Into<String>) -> Self {
        self.start_after = Some(key.into());
        self
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Entries on this page, in ascending key order
    pub entries: Vec<ArchiveEntry>,

    /// Token for the next page, `None` on the last page
    pub next_token: Option<String>,
}

/// Trait for archive storage backends.
///
/// # Implementations
///
/// - S3 store: `ListObjectsV2` pagination and `GetObject` downloads
/// - Memory store: in-process map for tests and local runs
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Lists one page of keys in ascending order.
    ///
    /// # Arguments
    ///
    /// * `request` - Bucket, prefix and start-after boundary
    /// * `token` - Continuation token from the previous page, `None` for the first page
    async fn list_page(&self, request: &ListRequest, token: Option<String>) -> Result<ListPage>;

    /// Downloads the full payload of an object.
    async fn download(&self, bucket: &str, key: &str) -> Result<Bytes>;
}
