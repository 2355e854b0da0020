//! JSON record source.
//!
//! A source file is an array of flat objects. Keys are resolved through the
//! same aliases as CSV headers; numbers and booleans are kept in their textual
//! form and `null` values are treated as missing.
//!
//! When strict parsing fails the input is passed through a lexical repair
//! (Python literals, trailing commas) and parsed strictly once more.
//!
//! # Example
//!
//! ```
//! use druglink::{JsonParser, RecordParser};
//!
//! let input = r#"[
//!     {"id": 9, "title": "Gold nanoparticles", "date": "01/01/2020", "journal": "Journal of food protection"},
//!     {"id": 10, "title": "Tetracycline", "date": "1 January 2020", "journal": "Psychopharmacology",},
//! ]"#;
//!
//! let set = JsonParser::new().parse(input).unwrap();
//! assert_eq!(set.len(), 2);
//! assert_eq!(set.records[0].field("id"), Some("9"));
//! ```

mod repair;

use crate::error::{ParseError, ValueError};
use crate::source::{RawRecord, RecordSet, default_field_for};
use crate::{RecordParser, SourceFormat};
use repair::repair_json;
use serde_json::Value;
use tracing::warn;

/// Parser for JSON record files.
#[derive(Debug, Clone)]
pub struct JsonParser {
    repair: bool,
}

impl Default for JsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonParser {
    /// Creates a parser that attempts repair of malformed input.
    #[must_use]
    pub fn new() -> Self {
        Self { repair: true }
    }

    /// Creates a parser that reports malformed input without attempting repair.
    #[must_use]
    pub fn strict() -> Self {
        Self { repair: false }
    }

    fn parse_value(&self, input: &str) -> Result<Value, ParseError> {
        match serde_json::from_str(input) {
            Ok(value) => Ok(value),
            Err(err) if self.repair => {
                warn!(error = %err, "Malformed JSON detected, attempting repair");
                Ok(serde_json::from_str(&repair_json(input))?)
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl RecordParser for JsonParser {
    /// Parses a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` with line and column when the text is not valid
    /// JSON even after repair, without position when the top level is not an
    /// array, and with the record index for a non-object entry or a nested
    /// value.
    fn parse(&self, input: &str) -> Result<RecordSet, ParseError> {
        let mut set = RecordSet::new(SourceFormat::Json);
        if input.trim().is_empty() {
            return Ok(set);
        }

        let Value::Array(entries) = self.parse_value(input)? else {
            return Err(ParseError::without_position(
                SourceFormat::Json,
                ValueError::Syntax("expected an array of records".to_string()),
            ));
        };

        for (i, entry) in entries.into_iter().enumerate() {
            let index = i + 1;
            let object = match entry {
                Value::Object(object) => object,
                other => {
                    return Err(ParseError::at_record(
                        index,
                        SourceFormat::Json,
                        ValueError::Syntax(format!("expected an object, found {}", other)),
                    ));
                }
            };

            let mut record = RawRecord::new(SourceFormat::Json, index);
            for (key, value) in object {
                let column = default_field_for(&key).map(String::from).unwrap_or(key);
                set.add_column(&column);
                let text = match value {
                    Value::Null => continue,
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Array(_) | Value::Object(_) => {
                        return Err(ParseError::at_record(
                            index,
                            SourceFormat::Json,
                            ValueError::Syntax(format!("nested value for key \"{}\"", column)),
                        ));
                    }
                };
                record.insert(column, &text);
            }
            set.records.push(record);
        }

        Ok(set)
    }
}
