//! Parser stage for replayflow.
//!
//! Each downloaded object goes through, in order:
//! 1. Optional regex replacement to separate concatenated records
//! 2. Split on the delimiter pattern
//! 3. Optional schema validation ([`JsonSchemaValidator`])
//! 4. JSON parsing and partition key extraction ([`FieldPath`])
//!
//! Records failing any step are logged, counted and dropped.

mod config;
mod parser;
mod path;
mod schema;
mod split;
mod stats;

pub use config::{
    DEFAULT_DELIMITER, DEFAULT_ENTRIES_CAPACITY, DEFAULT_PARSER_CONCURRENCY, DEFAULT_REPLACE,
    DEFAULT_REPLACE_WITH, FORMAT_JSON, ParserConfig,
};
pub use parser::{ParserPool, RecordParser};
pub use path::FieldPath;
pub use schema::JsonSchemaValidator;
pub use split::Splitter;
pub use stats::{DropReason, ParserSnapshot, ParserStats};
