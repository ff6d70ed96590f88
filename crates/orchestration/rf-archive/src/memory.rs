//! In-process archive store.
//!
//! Holds objects in a sorted map and serves them with the same paging contract
//! as S3. Listing and download failures can be injected for tests.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use rf_error::{ArchiveError, Result};
use rf_traits::{ArchiveStore, ListPage, ListRequest};
use rf_types::ArchiveEntry;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default number of keys returned per page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// [`ArchiveStore`] over an in-memory map.
#[derive(Debug)]
pub struct MemoryArchiveStore {
    objects: BTreeMap<String, Bytes>,
    page_size: usize,
    fail_list_at_page: Option<u64>,
    download_failures: Mutex<HashMap<String, u32>>,
    list_calls: AtomicU64,
    download_calls: AtomicU64,
}

impl Default for MemoryArchiveStore {
    fn default() -> Self {
        Self {
            objects: BTreeMap::new(),
            page_size: DEFAULT_PAGE_SIZE,
            fail_list_at_page: None,
            download_failures: Mutex::new(HashMap::new()),
            list_calls: AtomicU64::new(0),
            download_calls: AtomicU64::new(0),
        }
    }
}

impl MemoryArchiveStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object.
    pub fn with_object(mut self, key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.objects.insert(key.into(), data.into());
        self
    }

    /// Set the number of keys per listing page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fail the listing call for the given zero-based page.
    pub fn with_list_failure_at_page(mut self, page: u64) -> Self {
        self.fail_list_at_page = Some(page);
        self
    }

    /// Fail the next `times` downloads of `key`.
    pub fn with_download_failures(self, key: impl Into<String>, times: u32) -> Self {
        self.download_failures.lock().insert(key.into(), times);
        self
    }

    /// Number of listing calls served.
    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::Relaxed)
    }

    /// Number of download calls served, including failed ones.
    pub fn download_calls(&self) -> u64 {
        self.download_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ArchiveStore for MemoryArchiveStore {
    async fn list_page(&self, request: &ListRequest, token: Option<String>) -> Result<ListPage> {
        let page = self.list_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_list_at_page == Some(page) {
            return Err(ArchiveError::List(format!("injected failure on page {page}")).into());
        }

        // The continuation token is the last key of the previous page
        let lower = match token.as_ref().or(request.start_after.as_ref()) {
            Some(after) => Bound::Excluded(after.clone()),
            None => Bound::Unbounded,
        };
        let prefix = request.prefix.as_deref().unwrap_or("");

        let mut matching = self
            .objects
            .range((lower, Bound::Unbounded))
            .filter(|(key, _)| key.starts_with(prefix));

        let entries: Vec<ArchiveEntry> = matching
            .by_ref()
            .take(self.page_size)
            .map(|(key, data)| ArchiveEntry::new(key.clone()).with_size(data.len() as u64))
            .collect();

        let next_token = match (matching.next(), entries.last()) {
            (Some(_), Some(last)) => Some(last.key.clone()),
            _ => None,
        };

        Ok(ListPage {
            entries,
            next_token,
        })
    }

    async fn download(&self, _bucket: &str, key: &str) -> Result<Bytes> {
        self.download_calls.fetch_add(1, Ordering::Relaxed);

        {
            let mut failures = self.download_failures.lock();
            if let Some(remaining) = failures.get_mut(key) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(ArchiveError::Download {
                        key: key.to_string(),
                        message: "injected failure".to_string(),
                    }
                    .into());
                }
            }
        }

        self.objects.get(key).cloned().ok_or_else(|| {
            ArchiveError::Download {
                key: key.to_string(),
                message: "NoSuchKey".to_string(),
            }
            .into()
        })
    }
}
