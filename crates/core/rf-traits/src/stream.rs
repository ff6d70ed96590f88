//! Stream writer trait.

use async_trait::async_trait;
use rf_error::Result;
use rf_types::{PutRecordsOutcome, Record};

/// Trait for target stream backends.
///
/// A call either fails as a whole (`Err`) or returns one outcome per submitted
/// record. Callers must treat the two cases differently: a whole-request failure
/// means nothing was written, a per-record failure means only the failed
/// positions need resubmitting.
///
/// # Implementations
///
/// - Kinesis stream: `PutRecords` API
/// - Memory stream: records calls, with failure injection for tests
#[async_trait]
pub trait StreamWriter: Send + Sync {
    /// Writes up to 500 records in one request.
    async fn put_records(&self, records: &[Record]) -> Result<PutRecordsOutcome>;

    /// Human-readable target name for logging.
    fn target(&self) -> &str;
}
