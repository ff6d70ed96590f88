//! Shared CLI utilities for replayflow binaries.
//!
//! This crate provides common functionality used by the replayflow CLI:
//! - Logging initialization
//! - Log level and log format arguments
//! - Formatting utilities for run summaries

pub mod args;
pub mod format;
pub mod logging;

pub use args::{LogFormat, LogLevel};
pub use format::{format_bytes, format_duration, format_number};
pub use logging::init_logging;
