//! Archive entries and downloaded objects.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A key listed from the archive.
///
/// Entries order lexicographically by key, matching the listing order of the
/// archive store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// The object key (full path within the bucket)
    pub key: String,

    /// Size of the object in bytes, as reported by the listing
    pub size: u64,

    /// Last modified timestamp (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl ArchiveEntry {
    /// Create an entry with only a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size: 0,
            last_modified: None,
        }
    }

    /// Set the listed size.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Set the last modified timestamp.
    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }
}

impl PartialEq for ArchiveEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ArchiveEntry {}

impl PartialOrd for ArchiveEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ArchiveEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

/// An archive entry together with its downloaded payload.
#[derive(Debug, Clone)]
pub struct RawObject {
    /// The entry this payload was downloaded for
    pub entry: ArchiveEntry,

    /// Full object payload
    pub data: Bytes,
}

impl RawObject {
    /// Create a raw object from an entry and its payload.
    pub fn new(entry: ArchiveEntry, data: impl Into<Bytes>) -> Self {
        Self {
            entry,
            data: data.into(),
        }
    }

    /// The object key.
    #[inline]
    pub fn key(&self) -> &str {
        &self.entry.key
    }

    /// Payload size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_order_by_key() {
        let mut entries = vec![
            ArchiveEntry::new("2024/01/02/b").with_size(10),
            ArchiveEntry::new("2024/01/01/a").with_size(99),
            ArchiveEntry::new("2024/01/02/a"),
        ];
        entries.sort();

        let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["2024/01/01/a", "2024/01/02/a", "2024/01/02/b"]);
    }

    #[test]
    fn test_entry_equality_ignores_metadata() {
        let a = ArchiveEntry::new("k").with_size(1);
        let b = ArchiveEntry::new("k").with_size(2).with_last_modified(Utc::now());
        assert_eq!(a, b);
    }

    #[test]
    fn test_raw_object_accessors() {
        let object = RawObject::new(ArchiveEntry::new("data/part-0"), &b"{\"id\":1}"[..]);
        assert_eq!(object.key(), "data/part-0");
        assert_eq!(object.len(), 8);
        assert!(!object.is_empty());
    }
}
