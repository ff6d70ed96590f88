//! Resolved configuration for a replay run.

use rf_archive::ArchiveConfig;
use rf_parser::ParserConfig;
use rf_publisher::PublisherConfig;
use serde::{Deserialize, Serialize};

/// Configuration for all three pipeline stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Archive scan and download settings
    pub archive: ArchiveConfig,

    /// Split, validation and keying settings
    pub parser: ParserConfig,

    /// Batching and retry settings
    pub publisher: PublisherConfig,
}

impl ReplayConfig {
    pub fn new(archive: ArchiveConfig, parser: ParserConfig, publisher: PublisherConfig) -> Self {
        Self {
            archive,
            parser,
            publisher,
        }
    }

    /// Validate every stage, reporting the first problem with its section.
    pub fn validate(&self) -> Result<(), String> {
        self.archive
            .validate()
            .map_err(|e| format!("archive: {e}"))?;
        self.parser.validate().map_err(|e| format!("parser: {e}"))?;
        self.publisher
            .validate()
            .map_err(|e| format!("publisher: {e}"))?;
        Ok(())
    }
}
