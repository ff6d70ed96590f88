//! Logging initialization for CLI tools.

use crate::args::{LogFormat, LogLevel};
use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

/// Initialize logging with the specified level and format.
///
/// Logs go to stderr so stdout stays free for output.
pub fn init_logging(level: LogLevel, format: LogFormat) -> Result<()> {
    let level: Level = level.into();

    let builder = fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder
            .json()
            .flatten_event(true)
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?,
        LogFormat::Text => builder
            .with_target(false)
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?,
    }

    Ok(())
}
