//! S3-backed archive store.
//!
//! This module provides:
//! - Client configuration with LocalStack support
//! - An [`ArchiveStore`](rf_traits::ArchiveStore) over `ListObjectsV2` and `GetObject`

mod client;
mod store;

pub use client::{S3Config, create_s3_client};
pub use store::S3ArchiveStore;
