//! Results of bulk writes to the target stream.

/// Outcome of a single position in a bulk write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The record was accepted by the stream
    Accepted {
        shard_id: String,
        sequence_number: String,
    },

    /// The record was rejected; it may be resubmitted
    Failed {
        error_code: String,
        error_message: String,
    },
}

impl RecordOutcome {
    /// Shorthand for an accepted outcome.
    pub fn accepted(shard_id: impl Into<String>, sequence_number: impl Into<String>) -> Self {
        Self::Accepted {
            shard_id: shard_id.into(),
            sequence_number: sequence_number.into(),
        }
    }

    /// Shorthand for a failed outcome.
    pub fn failed(error_code: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self::Failed {
            error_code: error_code.into(),
            error_message: error_message.into(),
        }
    }

    /// Whether this position must be resubmitted.
    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of one bulk write call.
///
/// `records` has one entry per submitted record, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutRecordsOutcome {
    /// Per-position outcomes
    pub records: Vec<RecordOutcome>,

    /// Number of failed positions reported by the service
    pub failed_count: usize,
}

impl PutRecordsOutcome {
    /// Build an outcome, deriving the failed count from the positions.
    pub fn from_records(records: Vec<RecordOutcome>) -> Self {
        let failed_count = records.iter().filter(|r| r.is_failed()).count();
        Self {
            records,
            failed_count,
        }
    }

    /// Indices of failed positions, in order.
    pub fn failed_positions(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.is_failed().then_some(i))
            .collect()
    }

    /// Whether the outcome accounts for every submitted record.
    ///
    /// False when entries are missing or the reported failed count exceeds
    /// the failed entries; positions of the unaccounted failures are unknown.
    pub fn covers(&self, submitted: usize) -> bool {
        self.records.len() == submitted && self.failed_count <= self.failed_positions().len()
    }

    /// First failure code, for logging.
    pub fn first_error_code(&self) -> Option<&str> {
        self.records.iter().find_map(|r| match r {
            RecordOutcome::Failed { error_code, .. } => Some(error_code.as_str()),
            RecordOutcome::Accepted { .. } => None,
        })
    }
}
