//! Core types for replayflow.
//!
//! This crate provides the data model that flows through the replay pipeline:
//! - [`ArchiveEntry`] - A listed archive key
//! - [`RawObject`] - An archive entry with its downloaded payload
//! - [`Record`] - A single keyed message ready for the target stream
//! - [`Batch`] - A bounded group of records sent in one bulk write
//! - [`PutRecordsOutcome`] - Per-position result of a bulk write

pub mod batch;
pub mod entry;
pub mod outcome;
pub mod record;

pub use batch::*;
pub use entry::*;
pub use outcome::*;
pub use record::*;
