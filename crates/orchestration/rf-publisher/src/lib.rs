//! Stream publisher for replayflow.
//!
//! The publisher is the single consumer of the entries queue. It:
//! - Groups records into batches of up to 500, flushed by size or by window ([`Batcher`])
//! - Retries whole-request failures with exponential backoff ([`ExponentialBackoff`])
//! - Resubmits only the positions a partially failed request rejected
//!
//! [`KinesisStream`] writes to Kinesis Data Streams; [`MemoryStream`] backs tests.

mod backoff;
mod batcher;
mod config;
mod kinesis;
mod memory;
mod publisher;
mod stats;

pub use backoff::ExponentialBackoff;
pub use batcher::Batcher;
pub use config::{
    DEFAULT_BACKOFF_INTERVAL, DEFAULT_BACKOFF_MAX_ELAPSED, DEFAULT_BACKOFF_MAX_INTERVAL,
    DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_BATCH_WINDOW, DEFAULT_RANDOMIZATION_FACTOR,
    PublisherConfig,
};
pub use kinesis::{KinesisConfig, KinesisStream, create_kinesis_client};
pub use memory::{MemoryStream, StreamFault};
pub use publisher::{Publisher, PublisherHandle};
pub use stats::{PublisherSnapshot, PublisherStats};
