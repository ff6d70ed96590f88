//! Keyed stream records.

use bytes::Bytes;
use rf_error::ParseError;

/// Maximum partition key length accepted by the stream service, in characters.
pub const MAX_PARTITION_KEY_CHARS: usize = 256;

/// Maximum size of a single record (payload plus partition key) in bytes.
pub const MAX_RECORD_BYTES: usize = 1024 * 1024;

/// A single message extracted from an archive object.
///
/// A `Record` always carries a non-empty partition key; the only way to build
/// one is [`Record::new`], which enforces the stream's record limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    data: Bytes,
    partition_key: String,
}

impl Record {
    /// Create a record, rejecting empty or oversized keys and oversized payloads.
    pub fn new(data: impl Into<Bytes>, partition_key: impl Into<String>) -> Result<Self, ParseError> {
        let data = data.into();
        let partition_key = partition_key.into();

        if partition_key.is_empty() {
            return Err(ParseError::MissingPartitionKey(String::new()));
        }

        if partition_key.chars().count() > MAX_PARTITION_KEY_CHARS {
            return Err(ParseError::TooLarge {
                size: partition_key.len(),
                limit: MAX_PARTITION_KEY_CHARS,
            });
        }

        let size = data.len() + partition_key.len();
        if size > MAX_RECORD_BYTES {
            return Err(ParseError::TooLarge {
                size,
                limit: MAX_RECORD_BYTES,
            });
        }

        Ok(Self {
            data,
            partition_key,
        })
    }

    /// The raw record payload.
    #[inline]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// The partition key.
    #[inline]
    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    /// Size counted against the service record limit.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.data.len() + self.partition_key.len()
    }
}
