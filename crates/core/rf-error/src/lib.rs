//! Error types and classification for replayflow.
//!
//! This crate provides:
//! - [`RfError`] - Top-level error enum for all pipeline errors
//! - Domain-specific errors ([`ArchiveError`], [`ParseError`], [`StreamError`])
//! - [`ErrorCategory`] for retry decision making
//! - Error classification logic based on error type and pipeline stage

use thiserror::Error;

/// Top-level error type for replayflow.
#[derive(Error, Debug)]
pub enum RfError {
    /// Archive errors (listing, download, re-queue)
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Parser errors (patterns, schema, record content)
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Target stream errors (bulk write, backoff)
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The pipeline was cancelled because another stage failed
    #[error("Pipeline cancelled")]
    Cancelled,

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Archive-related errors.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Failed to build or reach the archive client
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Listing a page of keys failed
    #[error("List failed: {0}")]
    List(String),

    /// Downloading an object failed
    #[error("Download of '{key}' failed: {message}")]
    Download { key: String, message: String },

    /// A failed key could not be put back on the pending queue
    #[error("Cannot re-queue '{key}': pending queue already closed")]
    Requeue { key: String },
}

/// Parser-related errors.
///
/// Everything except [`ParseError::InvalidPattern`] and [`ParseError::Schema`]
/// is record-local: the record is dropped and the error only logged.
#[derive(Error, Debug)]
pub enum ParseError {
    /// A configured regular expression does not compile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// The schema document could not be loaded or compiled
    #[error("Schema error: {0}")]
    Schema(String),

    /// The validator failed to run against a record
    #[error("Validation error: {0}")]
    Validation(String),

    /// The partition key path resolved to nothing
    #[error("Missing partition key at '{0}'")]
    MissingPartitionKey(String),

    /// The record exceeds a stream service limit
    #[error("Record too large: {size} bytes exceeds {limit}")]
    TooLarge { size: usize, limit: usize },
}

/// Target stream errors.
#[derive(Error, Debug)]
pub enum StreamError {
    /// Failed to build or reach the stream client
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Request was throttled by the service
    #[error("Throttled: {0}")]
    Throttled(String),

    /// Service-side failure (5xx, internal failure)
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The target stream does not exist
    #[error("Stream not found: {0}")]
    NotFound(String),

    /// Credentials lack permission for the stream
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The request itself was rejected as malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The retry schedule ran out before the request succeeded
    #[error("Backoff exhausted after {attempts} attempts: {last_error}")]
    BackoffExhausted { attempts: u32, last_error: String },
}

/// Error classification for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transient error - retry with exponential backoff
    ///
    /// Examples: network timeout, throughput exceeded, 503
    Transient,

    /// Permanent error - never retry
    ///
    /// Examples: stream not found, access denied, malformed record
    Permanent,
}

/// Pipeline stage for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Listing archive keys
    Scan,

    /// Downloading archive objects
    Download,

    /// Splitting, validating and keying records
    Parse,

    /// Writing batches to the target stream
    Publish,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scan => write!(f, "Scan"),
            Self::Download => write!(f, "Download"),
            Self::Parse => write!(f, "Parse"),
            Self::Publish => write!(f, "Publish"),
        }
    }
}

/// Classifies an error to determine retry behavior.
pub fn classify_error(error: &RfError, stage: ProcessingStage) -> ErrorCategory {
    match error {
        RfError::Archive(e) => classify_archive_error(e),
        RfError::Parse(_) => ErrorCategory::Permanent,
        RfError::Stream(e) => classify_stream_error(e),
        RfError::Config(_) | RfError::Cancelled => ErrorCategory::Permanent,
        RfError::Other(e) => classify_message(&e.to_string(), stage),
    }
}

fn classify_archive_error(error: &ArchiveError) -> ErrorCategory {
    match error {
        ArchiveError::Connection(_) => ErrorCategory::Transient,
        ArchiveError::List(_) => ErrorCategory::Permanent,
        ArchiveError::Download { message, .. } => {
            classify_message(message, ProcessingStage::Download)
        }
        ArchiveError::Requeue { .. } => ErrorCategory::Permanent,
    }
}

fn classify_stream_error(error: &StreamError) -> ErrorCategory {
    match error {
        StreamError::Connection(_) => ErrorCategory::Transient,
        StreamError::Throttled(_) => ErrorCategory::Transient,
        StreamError::Unavailable(_) => ErrorCategory::Transient,
        StreamError::NotFound(_) => ErrorCategory::Permanent,
        StreamError::AccessDenied(_) => ErrorCategory::Permanent,
        StreamError::InvalidRequest(_) => ErrorCategory::Permanent,
        StreamError::BackoffExhausted { .. } => ErrorCategory::Permanent,
    }
}

/// Classifies a raw service error message.
///
/// Unknown messages are treated as transient.
pub fn classify_message(message: &str, stage: ProcessingStage) -> ErrorCategory {
    let lower = message.to_lowercase();

    let permanent = match stage {
        ProcessingStage::Download | ProcessingStage::Scan => {
            lower.contains("nosuchkey")
                || lower.contains("nosuchbucket")
                || lower.contains("accessdenied")
                || lower.contains("403")
                || lower.contains("404")
        }
        ProcessingStage::Parse => true,
        ProcessingStage::Publish => {
            lower.contains("resourcenotfound")
                || lower.contains("accessdenied")
                || lower.contains("validationexception")
                || lower.contains("invalidargument")
                || lower.contains("400")
        }
    };

    if permanent {
        ErrorCategory::Permanent
    } else {
        ErrorCategory::Transient
    }
}

/// Result type alias using RfError.
pub type Result<T> = std::result::Result<T, RfError>;
