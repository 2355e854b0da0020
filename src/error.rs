//! Error types for loading, cleaning and linking records.
//!
//! Every failure is fatal for the batch: the pipeline has no partial-success
//! contract. Source-level errors carry line/column positions and the format
//! being parsed so that the offending record can be located.

use crate::SourceFormat;
use std::path::PathBuf;
use thiserror::Error;

/// A byte-offset span into the original source text.
///
/// Both `start` and `end` are byte offsets (not character indices) from the
/// beginning of the source string.  `start` is inclusive, `end` is exclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSpan {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl SourceSpan {
    /// Create a new `SourceSpan`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Field name constants for consistent error reporting.
pub mod fields {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const JOURNAL: &str = "journal";
    pub const DATE: &str = "date";
    pub const NAME: &str = "name";
    pub const CHANNEL: &str = "channel";
}

/// Top-level error type for a pipeline run.
#[derive(Error, Debug)]
pub enum DruglinkError {
    #[error("Unsupported input format for {} (expected .csv or .json)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid record in {}: {source}", .path.display())]
    Source {
        path: PathBuf,
        source: ParseError,
    },

    #[error("Invalid schema in {}: {source}", .path.display())]
    SourceSchema {
        path: PathBuf,
        source: SchemaError,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    InvalidIdDomain(#[from] InvalidIdDomainError),

    #[error(transparent)]
    UnknownChannel(#[from] UnknownChannelError),
}

/// Parse error with detailed location and context information.
#[derive(Error, Debug)]
#[error("Error in {format} format{}: {error}",
    match (line, column, record) {
        (Some(l), Some(c), _) => format!(" at line {} column {}", l, c),
        (Some(l), None, _) => format!(" at line {}", l),
        (None, _, Some(r)) => format!(" in record {}", r),
        (None, Some(c), None) => format!(" at column {}", c),
        (None, None, None) => String::new(),
    }
)]
pub struct ParseError {
    /// Line number where the error occurred (1-based, None if not available)
    pub line: Option<usize>,
    /// Column number where the error occurred (1-based, None if not available)
    pub column: Option<usize>,
    /// Index of the offending record (1-based) when lines are not meaningful
    pub record: Option<usize>,
    /// Byte-offset span into the source text, for rich diagnostic rendering.
    pub span: Option<SourceSpan>,
    /// The format being parsed
    pub format: SourceFormat,
    /// The specific error that occurred
    pub error: ValueError,
}

impl ParseError {
    /// Create a new ParseError.
    pub fn new(
        line: Option<usize>,
        column: Option<usize>,
        format: SourceFormat,
        error: ValueError,
    ) -> Self {
        Self {
            line,
            column,
            record: None,
            span: None,
            format,
            error,
        }
    }

    /// Attach a byte-offset span to this error, returning `self` (builder style).
    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    /// Create a ParseError with just line information.
    pub fn at_line(line: usize, format: SourceFormat, error: ValueError) -> Self {
        Self::new(Some(line), None, format, error)
    }

    /// Create a ParseError with line and column information.
    pub fn at_position(line: usize, column: usize, format: SourceFormat, error: ValueError) -> Self {
        Self::new(Some(line), Some(column), format, error)
    }

    /// Create a ParseError pointing at the n-th record (1-based).
    pub fn at_record(record: usize, format: SourceFormat, error: ValueError) -> Self {
        Self {
            record: Some(record),
            ..Self::new(None, None, format, error)
        }
    }

    /// Create a ParseError without position information.
    pub fn without_position(format: SourceFormat, error: ValueError) -> Self {
        Self::new(None, None, format, error)
    }
}

/// Specific value-level errors that can occur during parsing.
#[derive(Error, Debug)]
pub enum ValueError {
    #[error("Bad syntax: {0}")]
    Syntax(String),

    #[error("Missing value for {key}")]
    MissingValue {
        field: &'static str,
        key: &'static str,
    },

    #[error("Bad value for {key}: \"{value}\" ({reason})")]
    BadValue {
        field: &'static str,
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// A date string matched none of the supported formats.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unsupported date \"{value}\" (expected DD Month YYYY, DD/MM/YYYY or YYYY-MM-DD)")]
pub struct DateParseError {
    /// The raw value that failed to parse
    pub value: String,
}

/// Missing identifiers cannot be allocated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidIdDomainError {
    #[error("Cannot allocate {missing} missing identifier(s): no existing identifier is numeric")]
    NoNumericId { missing: usize },

    #[error("Cannot allocate {missing} identifier(s) after {max}: out of range")]
    Exhausted { max: u64, missing: usize },
}

/// An article carries a channel tag that is neither literature nor clinical trial.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Article {article_id} (\"{title}\") has unknown channel \"{tag}\"")]
pub struct UnknownChannelError {
    pub article_id: String,
    pub title: String,
    pub tag: String,
}

/// A required column, key or value is absent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Missing required column \"{column}\" in {format} source")]
    MissingColumn {
        column: &'static str,
        format: SourceFormat,
    },

    #[error("Record \"{record}\" has no identifier")]
    MissingIdentifier { record: String },

    #[error("Record \"{record}\" has no {field}")]
    MissingValue {
        field: &'static str,
        record: String,
    },

    #[error("Missing key \"{key}\" in {context}")]
    MissingKey { key: &'static str, context: String },
}

// Conversion implementations for external error types

#[cfg(feature = "csv")]
impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        let (line, column) = if let Some(position) = err.position() {
            (Some(position.line() as usize), Some(position.byte() as usize))
        } else {
            (None, None)
        };

        ParseError::new(line, column, SourceFormat::Csv, ValueError::Syntax(err.to_string()))
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        // serde_json reports 0 for both when the position is unknown
        let line = Some(err.line()).filter(|&l| l > 0);
        let column = Some(err.column()).filter(|&c| c > 0);
        ParseError::new(line, column, SourceFormat::Json, ValueError::Syntax(err.to_string()))
    }
}
