//! Bounded record batches.

use crate::Record;

/// Maximum number of records accepted by a single bulk write.
pub const MAX_BATCH_RECORDS: usize = 500;

/// An ordered group of records sent in one bulk write.
///
/// A batch always holds between 1 and [`MAX_BATCH_RECORDS`] records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    records: Vec<Record>,
}

impl Batch {
    /// Create a batch, returning the records back if the size bound is violated.
    pub fn new(records: Vec<Record>) -> Result<Self, Vec<Record>> {
        if records.is_empty() || records.len() > MAX_BATCH_RECORDS {
            return Err(records);
        }
        Ok(Self { records })
    }

    /// The records in submission order.
    #[inline]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records in this batch.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false; kept for API symmetry with collections.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total payload bytes counted against service limits.
    pub fn size_bytes(&self) -> usize {
        self.records.iter().map(Record::size_bytes).sum()
    }

    /// Consumes the batch and returns its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}
