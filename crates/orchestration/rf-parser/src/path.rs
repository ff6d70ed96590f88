//! Dot-notation field paths into JSON documents.

use serde_json::Value;
use std::fmt;

/// A parsed field path such as `user.id` or `events.0.key`.
///
/// Numeric segments index into arrays; every other segment names an object field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dot-separated path. Returns `None` for an empty path or segment.
    pub fn parse(path: &str) -> Option<Self> {
        if path.is_empty() {
            return None;
        }
        let segments: Vec<String> = path.split('.').map(String::from).collect();
        if segments.iter().any(String::is_empty) {
            return None;
        }
        Some(Self {
            raw: path.to_string(),
            segments,
        })
    }

    /// The path as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Resolve the path and render the value as a partition key.
    ///
    /// Strings are returned verbatim, numbers and booleans as their JSON text.
    /// Missing fields, `null` and empty strings yield `None`. Objects and
    /// arrays are rendered as compact JSON.
    pub fn extract(&self, document: &Value) -> Option<String> {
        let mut current = document;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        match current {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
