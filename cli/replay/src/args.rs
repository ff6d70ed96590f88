//! CLI argument definitions for replayflow.

use clap::Parser;
use rf_cli_common::{LogFormat, LogLevel};
use std::path::PathBuf;
use std::time::Duration;

/// Replay historical stream records from an S3 archive into a Kinesis stream.
///
/// Every option can also be given through its environment variable or the
/// YAML config file. A flag wins over the environment, which wins over the file.
///
/// ## Examples
///
/// Replay one day of an archive:
///   replayflow --bucket archive --prefix events/2024-01-01/ --stream-name events --json-partition-key user.id
///
/// Against LocalStack:
///   replayflow --s3-endpoint http://localhost:4566 --kinesis-endpoint http://localhost:4566 ...
#[derive(Parser, Debug, Default)]
#[command(name = "replayflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// YAML config file (default: ./config.yaml, then /etc/replayflow/config.yaml)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    // === Archive ===
    /// S3 bucket holding the archive
    #[arg(short = 'b', long, env = "S3_BUCKET")]
    pub bucket: Option<String>,

    /// Prefix that contains the relevant archive portion
    #[arg(short = 'p', long, env = "S3_PREFIX")]
    pub prefix: Option<String>,

    /// Replay keys sorting after this key
    #[arg(long, env = "S3_START_AFTER")]
    pub start_after: Option<String>,

    /// Stop before the first key at or after this key
    #[arg(long, env = "S3_STOP_AT")]
    pub stop_at: Option<String>,

    /// Number of concurrent downloads (must be >= 1)
    #[arg(long, env = "S3_CONCURRENCY", value_parser = parse_positive_usize)]
    pub s3_concurrency: Option<usize>,

    /// Custom S3 endpoint URL (for LocalStack)
    #[arg(long, env = "S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// S3 region override
    #[arg(long, env = "S3_REGION")]
    pub s3_region: Option<String>,

    // === Parser ===
    /// Record format (only json)
    #[arg(long, env = "PARSER_FORMAT")]
    pub parser_format: Option<String>,

    /// Regex splitting an object into records
    #[arg(long, env = "PARSER_DELIMITER")]
    pub parser_delimiter: Option<String>,

    /// Regex rewritten before splitting
    #[arg(long, env = "PARSER_REPLACE", requires = "parser_replace_with")]
    pub parser_replace: Option<String>,

    /// Replacement text for --parser-replace matches
    #[arg(long, env = "PARSER_REPLACE_WITH")]
    pub parser_replace_with: Option<String>,

    /// Number of parser workers (must be >= 1)
    #[arg(long, env = "JSON_CONCURRENCY", value_parser = parse_positive_usize)]
    pub json_concurrency: Option<usize>,

    /// Dot-separated path of the partition key field
    #[arg(short = 'k', long, env = "JSON_PARTITION_KEY")]
    pub json_partition_key: Option<String>,

    /// JSON schema records must satisfy (file path or file:// URL)
    #[arg(long, env = "JSON_SCHEMA")]
    pub json_schema: Option<String>,

    // === Stream ===
    /// Target Kinesis stream name
    #[arg(short = 's', long, env = "KINESIS_STREAM_NAME")]
    pub stream_name: Option<String>,

    /// First retry interval (e.g. 500ms, 1s)
    #[arg(long, env = "KINESIS_BACKOFF_INTERVAL", value_parser = humantime::parse_duration)]
    pub kinesis_backoff_interval: Option<Duration>,

    /// Longest retry interval
    #[arg(long, env = "KINESIS_MAX_BACKOFF_INTERVAL", value_parser = humantime::parse_duration)]
    pub kinesis_max_backoff_interval: Option<Duration>,

    /// Longest wait before flushing a partial batch
    #[arg(long, env = "KINESIS_BUFFER_WINDOW", value_parser = humantime::parse_duration)]
    pub kinesis_buffer_window: Option<Duration>,

    /// Records per PutRecords request (1-500)
    #[arg(long, env = "KINESIS_BUFFER_SIZE", value_parser = parse_batch_size)]
    pub kinesis_buffer_size: Option<usize>,

    /// Custom Kinesis endpoint URL (for LocalStack)
    #[arg(long, env = "KINESIS_ENDPOINT")]
    pub kinesis_endpoint: Option<String>,

    /// Kinesis region override
    #[arg(long, env = "KINESIS_REGION")]
    pub kinesis_region: Option<String>,

    // === AWS ===
    /// AWS profile name
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    // === Logging ===
    /// Log level
    #[arg(short = 'l', long, env = "LOG_LEVEL", value_enum)]
    pub log_level: Option<LogLevel>,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,
}

/// Parse a positive usize (>= 1).
fn parse_positive_usize(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if value < 1 {
        return Err(format!("{} is not in 1..", value));
    }
    Ok(value)
}

/// Parse a PutRecords batch size (1-500).
fn parse_batch_size(s: &str) -> Result<usize, String> {
    let value = parse_positive_usize(s)?;
    if value > 500 {
        return Err(format!("{} is not in 1..=500", value));
    }
    Ok(value)
}
