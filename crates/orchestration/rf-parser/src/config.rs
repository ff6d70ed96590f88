//! Configuration types for the parser stage.

use regex::bytes::Regex;
use serde::{Deserialize, Serialize};

/// Default number of parser workers.
pub const DEFAULT_PARSER_CONCURRENCY: usize = 4;

/// Default delimiter between adjacent records in one object.
pub const DEFAULT_DELIMITER: &str = r"\},\{";

/// Default pattern matching two records concatenated without a delimiter.
pub const DEFAULT_REPLACE: &str = r"\}[\r\n]*\{";

/// Default replacement that turns [`DEFAULT_REPLACE`] matches into delimited form.
pub const DEFAULT_REPLACE_WITH: &str = "}},{{";

/// Default capacity of the entries queue.
pub const DEFAULT_ENTRIES_CAPACITY: usize = 1000;

/// The only record format currently understood.
pub const FORMAT_JSON: &str = "json";

/// Configuration for splitting and keying archive objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Number of parser workers
    pub concurrency: usize,

    /// Record format (only `json`)
    pub format: String,

    /// Regex splitting an object into records; `None` keeps the object whole
    pub delimiter: Option<String>,

    /// Regex applied before splitting
    pub replace: Option<String>,

    /// Replacement text for `replace` matches
    pub replace_with: Option<String>,

    /// Dot-separated path to the partition key field
    pub partition_key: String,

    /// Capacity of the entries queue
    pub queue_capacity: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_PARSER_CONCURRENCY,
            format: FORMAT_JSON.to_string(),
            delimiter: Some(DEFAULT_DELIMITER.to_string()),
            replace: Some(DEFAULT_REPLACE.to_string()),
            replace_with: Some(DEFAULT_REPLACE_WITH.to_string()),
            partition_key: String::new(),
            queue_capacity: DEFAULT_ENTRIES_CAPACITY,
        }
    }
}

impl ParserConfig {
    /// Create a configuration with the required partition key path.
    pub fn new(partition_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            ..Default::default()
        }
    }

    /// Set the number of parser workers.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the record format.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Set the split delimiter, or `None` to keep each object whole.
    pub fn with_delimiter(mut self, delimiter: Option<String>) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the pre-split replacement.
    pub fn with_replace(mut self, pattern: impl Into<String>, with: impl Into<String>) -> Self {
        self.replace = Some(pattern.into());
        self.replace_with = Some(with.into());
        self
    }

    /// Disable the pre-split replacement.
    pub fn without_replace(mut self) -> Self {
        self.replace = None;
        self.replace_with = None;
        self
    }

    /// Set the entries queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("parser concurrency must be at least 1".to_string());
        }
        if self.format != FORMAT_JSON {
            return Err(format!(
                "unsupported parser format '{}', expected '{FORMAT_JSON}'",
                self.format
            ));
        }
        if self.partition_key.is_empty() {
            return Err("partition key path is required".to_string());
        }
        if self.partition_key.split('.').any(str::is_empty) {
            return Err(format!(
                "partition key path '{}' has an empty segment",
                self.partition_key
            ));
        }
        if self.queue_capacity == 0 {
            return Err("queue_capacity must be at least 1".to_string());
        }

        if let Some(delimiter) = &self.delimiter {
            Regex::new(delimiter).map_err(|e| format!("invalid delimiter pattern: {e}"))?;
        }
        match (&self.replace, &self.replace_with) {
            (Some(pattern), Some(with)) if !with.is_empty() => {
                Regex::new(pattern).map_err(|e| format!("invalid replace pattern: {e}"))?;
            }
            (Some(_), _) => {
                return Err("replace pattern given without replacement text".to_string());
            }
            (None, _) => {}
        }

        Ok(())
    }
}
