//! Record validator trait.

use rf_error::Result;

/// Result of validating a candidate record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The record satisfies the schema
    Valid,

    /// The record violates the schema; one message per violation
    Invalid(Vec<String>),
}

impl Validation {
    /// Whether the record passed.
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Trait for per-record validators.
///
/// `Err` means the validator could not evaluate the record (for example the
/// text is not a document at all), which callers treat the same as
/// [`Validation::Invalid`]: the record is dropped.
pub trait RecordValidator: Send + Sync {
    /// Validates the raw text of one candidate record.
    fn validate(&self, raw: &str) -> Result<Validation>;
}
