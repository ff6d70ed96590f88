//! Core traits for replayflow.
//!
//! This crate defines the seams between the replay pipeline and the outside world:
//! - [`ArchiveStore`] - Paginated key listing and object download
//! - [`StreamWriter`] - Bulk writes to the target stream
//! - [`RecordValidator`] - Optional per-record validation

pub mod archive;
pub mod stream;
pub mod validator;

pub use archive::*;
pub use stream::*;
pub use validator::*;
