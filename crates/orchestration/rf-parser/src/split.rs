//! Splitting archive objects into candidate records.

use regex::bytes::Regex;
use rf_error::ParseError;
use std::borrow::Cow;

/// Applies the optional replacement and delimiter to an object payload.
#[derive(Debug, Clone)]
pub struct Splitter {
    replace: Option<(Regex, String)>,
    delimiter: Option<Regex>,
}

impl Splitter {
    /// Compile the patterns.
    ///
    /// A replacement with empty text is treated as no replacement.
    pub fn new(
        delimiter: Option<&str>,
        replace: Option<&str>,
        replace_with: Option<&str>,
    ) -> Result<Self, ParseError> {
        let delimiter = delimiter
            .map(|pattern| {
                Regex::new(pattern)
                    .map_err(|e| ParseError::InvalidPattern(format!("delimiter '{pattern}': {e}")))
            })
            .transpose()?;

        let replace = match (replace, replace_with) {
            (Some(pattern), Some(with)) if !with.is_empty() => {
                let regex = Regex::new(pattern).map_err(|e| {
                    ParseError::InvalidPattern(format!("replace '{pattern}': {e}"))
                })?;
                Some((regex, with.to_string()))
            }
            _ => None,
        };

        Ok(Self { replace, delimiter })
    }

    /// A splitter that keeps every payload as one candidate.
    pub fn whole() -> Self {
        Self {
            replace: None,
            delimiter: None,
        }
    }

    /// Normalize the payload with the replacement pattern.
    pub fn normalize<'a>(&self, payload: &'a [u8]) -> Cow<'a, [u8]> {
        match &self.replace {
            Some((regex, with)) => regex.replace_all(payload, with.as_bytes()),
            None => Cow::Borrowed(payload),
        }
    }

    /// Split a normalized payload into candidate records.
    ///
    /// Surrounding whitespace is trimmed and blank candidates are skipped.
    pub fn split<'a>(&self, normalized: &'a [u8]) -> Vec<&'a [u8]> {
        let pieces: Box<dyn Iterator<Item = &'a [u8]>> = match &self.delimiter {
            Some(regex) => Box::new(regex.split(normalized)),
            None => Box::new(std::iter::once(normalized)),
        };

        pieces
            .map(<[u8]>::trim_ascii)
            .filter(|piece| !piece.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_DELIMITER, DEFAULT_REPLACE, DEFAULT_REPLACE_WITH};

    fn default_splitter() -> Splitter {
        Splitter::new(
            Some(DEFAULT_DELIMITER),
            Some(DEFAULT_REPLACE),
            Some(DEFAULT_REPLACE_WITH),
        )
        .unwrap()
    }

    fn split(splitter: &Splitter, payload: &str) -> Vec<String> {
        let normalized = splitter.normalize(payload.as_bytes());
        splitter
            .split(&normalized)
            .into_iter()
            .map(|piece| String::from_utf8(piece.to_vec()).unwrap())
            .collect()
    }

    #[test]
    fn test_concatenated_records_split() {
        let splitter = default_splitter();
        assert_eq!(
            split(&splitter, r#"{"a":1}{"b":2}"#),
            vec![r#"{"a":1}"#, r#"{"b":2}"#]
        );
    }

    #[test]
    fn test_newline_separated_records_split() {
        let splitter = default_splitter();
        assert_eq!(
            split(&splitter, "{\"a\":1}\n{\"b\":2}\r\n{\"c\":3}\n"),
            vec![r#"{"a":1}"#, r#"{"b":2}"#, r#"{"c":3}"#]
        );
    }

    #[test]
    fn test_comma_delimited_records_lose_braces() {
        // The delimiter consumes the braces around the comma
        let splitter = default_splitter();
        assert_eq!(
            split(&splitter, r#"{"a":1},{"b":2}"#),
            vec![r#"{"a":1"#, r#""b":2}"#]
        );
    }

    #[test]
    fn test_nested_object_array_fragments() {
        let splitter = default_splitter();
        assert_eq!(
            split(&splitter, r#"{"x":[{"a":1},{"b":2}]}"#),
            vec![r#"{"x":[{"a":1"#, r#""b":2}]}"#]
        );
    }

    #[test]
    fn test_single_record_untouched() {
        let splitter = default_splitter();
        assert_eq!(
            split(&splitter, r#"{"a":{"b":1}}"#),
            vec![r#"{"a":{"b":1}}"#]
        );
    }

    #[test]
    fn test_no_delimiter_keeps_payload_whole() {
        let splitter = Splitter::whole();
        assert_eq!(
            split(&splitter, r#"{"a":1}{"b":2}"#),
            vec![r#"{"a":1}{"b":2}"#]
        );
    }

    #[test]
    fn test_blank_payload_yields_nothing() {
        let splitter = default_splitter();
        assert!(split(&splitter, " \n").is_empty());
    }

    #[test]
    fn test_empty_replacement_disables_replace() {
        let splitter = Splitter::new(Some(DEFAULT_DELIMITER), Some(DEFAULT_REPLACE), Some(""))
            .unwrap();
        assert_eq!(
            split(&splitter, r#"{"a":1}{"b":2}"#),
            vec![r#"{"a":1}{"b":2}"#]
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let result = Splitter::new(Some("("), None, None);
        assert!(matches!(result, Err(ParseError::InvalidPattern(_))));
    }
}
