//! Config file loading and resolution of flags, environment and file settings.

use crate::args::Cli;
use anyhow::{Context, Result, bail};
use rf_archive::{ArchiveConfig, S3Config};
use rf_cli_common::{LogFormat, LogLevel};
use rf_parser::ParserConfig;
use rf_publisher::{KinesisConfig, PublisherConfig};
use rf_replay::ReplayConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config files tried, in order, when `--config` is not given.
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["./config.yaml", "/etc/replayflow/config.yaml"];

/// Contents of the YAML config file. Every setting is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub s3: S3Section,
    pub json: JsonSection,
    pub kinesis: KinesisSection,
    pub parser: ParserSection,
    pub log: LogSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct S3Section {
    pub bucket: Option<String>,
    pub prefix: Option<String>,
    pub start_after: Option<String>,
    pub stop_at: Option<String>,
    pub concurrency: Option<usize>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JsonSection {
    pub concurrency: Option<usize>,
    pub partition_key: Option<String>,
    pub schema: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KinesisSection {
    pub stream_name: Option<String>,
    pub backoff_interval: Option<String>,
    pub backoff_max_interval: Option<String>,
    pub buffer_window: Option<String>,
    pub buffer_size: Option<usize>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserSection {
    pub format: Option<String>,
    pub delimiter: Option<String>,
    pub replace: Option<String>,
    pub replace_with: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSection {
    pub level: Option<LogLevel>,
    pub format: Option<LogFormat>,
}

impl FileConfig {
    /// Load the config file.
    ///
    /// An explicit path must exist. Otherwise the first of
    /// [`DEFAULT_CONFIG_PATHS`] that exists is read, and no file at all yields
    /// an empty config.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match DEFAULT_CONFIG_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.is_file())
            {
                Some(path) => path,
                None => return Ok((Self::default(), None)),
            },
        };

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok((config, Some(path)))
    }

    /// Parse YAML config contents.
    pub fn parse(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }
}

/// Fully resolved settings for one run.
#[derive(Debug)]
pub struct Settings {
    pub replay: ReplayConfig,
    pub s3: S3Config,
    pub kinesis: KinesisConfig,
    pub schema: Option<String>,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
}

impl Settings {
    /// Merge flags and environment (already combined by clap) over the file.
    ///
    /// Required settings are checked here; stage settings are validated again
    /// when the replay starts.
    pub fn resolve(cli: Cli, file: FileConfig) -> Result<Self> {
        let FileConfig {
            s3,
            json,
            kinesis,
            parser,
            log,
        } = file;

        let Some(bucket) = non_empty(cli.bucket.or(s3.bucket)) else {
            bail!("s3 bucket is required (--bucket or S3_BUCKET)");
        };
        let Some(stream_name) = non_empty(cli.stream_name.or(kinesis.stream_name)) else {
            bail!("kinesis stream name is required (--stream-name or KINESIS_STREAM_NAME)");
        };
        let Some(partition_key) = non_empty(cli.json_partition_key.or(json.partition_key)) else {
            bail!("json partition key is required (--json-partition-key or JSON_PARTITION_KEY)");
        };

        let mut archive = ArchiveConfig::new(bucket);
        archive.prefix = non_empty(cli.prefix.or(s3.prefix));
        archive.start_after = non_empty(cli.start_after.or(s3.start_after));
        archive.stop_at = non_empty(cli.stop_at.or(s3.stop_at));
        if let Some(concurrency) = cli.s3_concurrency.or(s3.concurrency) {
            archive = archive.with_concurrency(concurrency);
        }

        let mut parser_config = ParserConfig::new(partition_key);
        if let Some(format) = cli.parser_format.or(parser.format) {
            parser_config = parser_config.with_format(format);
        }
        if let Some(concurrency) = cli.json_concurrency.or(json.concurrency) {
            parser_config = parser_config.with_concurrency(concurrency);
        }
        if let Some(delimiter) = non_empty(cli.parser_delimiter.or(parser.delimiter)) {
            parser_config = parser_config.with_delimiter(Some(delimiter));
        }
        if let Some(replace) = non_empty(cli.parser_replace.or(parser.replace)) {
            let Some(with) = non_empty(cli.parser_replace_with.or(parser.replace_with)) else {
                bail!("parser replace requires replace_with to be set");
            };
            parser_config = parser_config.with_replace(replace, with);
        }

        let mut publisher = PublisherConfig::new();
        if let Some(interval) = duration(cli.kinesis_backoff_interval, kinesis.backoff_interval)
            .context("kinesis.backoff_interval")?
        {
            publisher = publisher.with_backoff_interval(interval);
        }
        if let Some(interval) =
            duration(cli.kinesis_max_backoff_interval, kinesis.backoff_max_interval)
                .context("kinesis.backoff_max_interval")?
        {
            publisher = publisher.with_backoff_max_interval(interval);
        }
        if let Some(window) = duration(cli.kinesis_buffer_window, kinesis.buffer_window)
            .context("kinesis.buffer_window")?
        {
            publisher = publisher.with_batch_window(window);
        }
        if let Some(size) = cli.kinesis_buffer_size.or(kinesis.buffer_size) {
            publisher = publisher.with_max_batch_size(size);
        }

        let mut s3_config = S3Config::new();
        s3_config.endpoint = non_empty(cli.s3_endpoint.or(s3.endpoint));
        s3_config.region = non_empty(cli.s3_region.or(s3.region));
        s3_config.profile = cli.profile.clone();

        let mut kinesis_config = KinesisConfig::new(stream_name);
        kinesis_config.endpoint = non_empty(cli.kinesis_endpoint.or(kinesis.endpoint));
        kinesis_config.region = non_empty(cli.kinesis_region.or(kinesis.region));
        kinesis_config.profile = cli.profile;

        let replay = ReplayConfig::new(archive, parser_config, publisher);
        replay
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

        Ok(Self {
            replay,
            s3: s3_config,
            kinesis: kinesis_config,
            schema: non_empty(cli.json_schema.or(json.schema)),
            log_level: cli.log_level.or(log.level).unwrap_or_default(),
            log_format: cli.log_format.or(log.format).unwrap_or_default(),
        })
    }
}

/// Treat empty strings as unset, matching empty environment variables.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Pick the flag duration, else parse the file's humantime string.
fn duration(flag: Option<Duration>, file: Option<String>) -> Result<Option<Duration>> {
    if flag.is_some() {
        return Ok(flag);
    }
    match non_empty(file) {
        Some(text) => Ok(Some(
            humantime::parse_duration(&text)
                .with_context(|| format!("invalid duration '{text}'"))?,
        )),
        None => Ok(None),
    }
}
