//! Archive-to-stream replay for replayflow.
//!
//! [`Replay`] wires the archive, parser and publisher stages together and
//! returns a [`ReplaySnapshot`] of the run.
//!
//! # Example
//!
//! ```no_run
//! use rf_archive::{ArchiveConfig, S3ArchiveStore, S3Config, create_s3_client};
//! use rf_parser::ParserConfig;
//! use rf_publisher::{KinesisConfig, KinesisStream, PublisherConfig, create_kinesis_client};
//! use rf_replay::{Replay, ReplayConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> rf_error::Result<()> {
//! let s3 = create_s3_client(&S3Config::new()).await;
//! let kinesis = create_kinesis_client(&KinesisConfig::new("events")).await;
//!
//! let config = ReplayConfig::new(
//!     ArchiveConfig::new("archive").with_prefix("events/"),
//!     ParserConfig::new("user.id"),
//!     PublisherConfig::new(),
//! );
//! let snapshot = Replay::new(
//!     config,
//!     Arc::new(S3ArchiveStore::new(s3)),
//!     Arc::new(KinesisStream::new(kinesis, "events")),
//! )
//! .run()
//! .await?;
//!
//! println!("published {} records", snapshot.publisher.records_published);
//! # Ok(())
//! # }
//! ```

mod config;
mod replay;
mod stats;

pub use config::ReplayConfig;
pub use replay::Replay;
pub use stats::ReplaySnapshot;
