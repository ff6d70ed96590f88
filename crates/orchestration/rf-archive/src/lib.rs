//! Archive stage for replayflow.
//!
//! This crate lists an archive in key order and downloads every key in range:
//! - [`Scanner`] - Paginated listing into the bounded pending-keys queue
//! - [`DownloadPool`] - Concurrent workers feeding the raw-objects queue
//! - [`Archive`] - Wires both together behind a single join handle
//!
//! # Example
//!
//! ```no_run
//! use rf_archive::{Archive, ArchiveConfig, S3ArchiveStore, S3Config, create_s3_client};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> rf_error::Result<()> {
//! let client = create_s3_client(&S3Config::new().with_region("us-east-1")).await;
//! let archive = Archive::new(
//!     Arc::new(S3ArchiveStore::new(client)),
//!     ArchiveConfig::new("my-archive").with_prefix("events/"),
//! );
//!
//! let (mut objects, handle) = archive.start(CancellationToken::new());
//! while let Some(object) = objects.recv().await {
//!     println!("{}: {} bytes", object.key(), object.len());
//! }
//! handle.await.ok();
//! # Ok(())
//! # }
//! ```

mod archive;
mod config;
mod download;
mod memory;
mod scanner;
mod stats;

pub mod s3;

pub use archive::Archive;
pub use config::{ArchiveConfig, DEFAULT_DOWNLOAD_CONCURRENCY, DEFAULT_QUEUE_CAPACITY};
pub use download::DownloadPool;
pub use memory::{DEFAULT_PAGE_SIZE, MemoryArchiveStore};
pub use s3::{S3ArchiveStore, S3Config, create_s3_client};
pub use scanner::{ScanOutcome, Scanner};
pub use stats::{ArchiveSnapshot, ArchiveStats};
