//! Raw record sets and their conversion into domain records.
//!
//! Parsers only split input into rows of named string fields; header aliases
//! are resolved to canonical field names ([`crate::error::fields`]) while
//! parsing. Cleaning happens when a [`RawRecord`] is turned into a
//! [`PartialArticle`] or a [`Drug`].

use crate::error::{DruglinkError, ParseError, SchemaError, SourceSpan, ValueError, fields};
use crate::normalize::{normalize_date, normalize_title};
use crate::{Channel, Drug, PartialArticle, RecordParser, SourceFormat};
use compact_str::CompactString;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, info_span};

/// Default aliases for every canonical field. Matching is case-insensitive.
pub(crate) const DEFAULT_ALIASES: &[(&str, &[&str])] = &[
    (fields::ID, &["id", "atccode", "article_id"]),
    (fields::TITLE, &["title", "scientific_title", "article title"]),
    (fields::JOURNAL, &["journal", "journal title"]),
    (fields::DATE, &["date", "publication date"]),
    (fields::NAME, &["drug", "name", "drug name"]),
    (fields::CHANNEL, &["article_type", "channel"]),
];

/// Columns every article source must provide.
pub const ARTICLE_COLUMNS: &[&str] = &[fields::ID, fields::TITLE, fields::JOURNAL, fields::DATE];

/// Columns every drug source must provide.
pub const DRUG_COLUMNS: &[&str] = &[fields::ID, fields::NAME];

/// Resolves a column header or object key against [`DEFAULT_ALIASES`].
pub(crate) fn default_field_for(header: &str) -> Option<&'static str> {
    let header = header.trim().to_lowercase();
    DEFAULT_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&header.as_str()))
        .map(|(field, _)| *field)
}

/// One row of a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Non-empty values keyed by canonical field name (unknown columns keep
    /// their header)
    pub fields: HashMap<String, String>,
    /// 1-based line of the row, for line-oriented formats
    pub line_number: Option<usize>,
    /// 1-based position of the row in its file
    pub index: usize,
    /// Byte offset of the row in the source text
    pub byte_offset: Option<usize>,
    /// Format the row was read from
    pub format: SourceFormat,
}

impl RawRecord {
    /// A record with no fields yet.
    pub fn new(format: SourceFormat, index: usize) -> Self {
        Self {
            fields: HashMap::new(),
            line_number: None,
            index,
            byte_offset: None,
            format,
        }
    }

    /// Set the line and byte offset of the record.
    pub fn at_line(mut self, line_number: usize, byte_offset: usize) -> Self {
        self.line_number = Some(line_number);
        self.byte_offset = Some(byte_offset);
        self
    }

    /// Store a value, dropping it when blank.
    pub fn insert(&mut self, field: impl Into<String>, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.fields.insert(field.into(), value.to_string());
        }
    }

    /// Get a non-empty field value by canonical name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn has_content(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Cleans the row into an article.
    ///
    /// Title and journal are normalized; a missing title becomes the empty
    /// string (dropped later), a missing or blank journal becomes `None`. The
    /// channel column, when present, overrides `default_channel`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] located at this record when the date is
    /// missing or in an unsupported format.
    pub fn into_partial_article(self, default_channel: &Channel) -> Result<PartialArticle, ParseError> {
        let raw_date = self.field(fields::DATE).ok_or_else(|| {
            self.error(ValueError::MissingValue {
                field: fields::DATE,
                key: "date",
            })
        })?;
        let date = normalize_date(raw_date).map_err(|e| {
            self.error(ValueError::BadValue {
                field: fields::DATE,
                key: "date",
                value: e.value.clone(),
                reason: e.to_string(),
            })
        })?;

        let channel = self
            .field(fields::CHANNEL)
            .map(Channel::from_tag)
            .unwrap_or_else(|| default_channel.clone());

        Ok(PartialArticle {
            id: self.field(fields::ID).map(CompactString::from),
            title: self.field(fields::TITLE).map(normalize_title).unwrap_or_default(),
            journal: self
                .field(fields::JOURNAL)
                .map(normalize_title)
                .filter(|journal| !journal.is_empty()),
            date,
            channel,
        })
    }

    /// Cleans the row into a catalog drug.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] located at this record when the identifier is
    /// missing. A missing name yields a drug that never matches.
    pub fn into_drug(self) -> Result<Drug, ParseError> {
        let id = self.field(fields::ID).ok_or_else(|| {
            self.error(ValueError::MissingValue {
                field: fields::ID,
                key: "id",
            })
        })?;
        Ok(Drug::new(id, self.field(fields::NAME).unwrap_or_default()))
    }

    fn error(&self, error: ValueError) -> ParseError {
        match (self.line_number, self.byte_offset) {
            (Some(line), Some(offset)) => {
                ParseError::at_line(line, self.format, error).with_span(SourceSpan::new(offset, offset))
            }
            (Some(line), None) => ParseError::at_line(line, self.format, error),
            _ => ParseError::at_record(self.index, self.format, error),
        }
    }
}

/// The rows of one or more source files of the same record type.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    pub format: SourceFormat,
    /// Canonical names of the columns seen in the source
    pub columns: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RecordSet {
    /// An empty set with no columns.
    pub fn new(format: SourceFormat) -> Self {
        Self {
            format,
            columns: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record a column name, ignoring duplicates.
    pub fn add_column(&mut self, column: &str) {
        if !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Checks that every column in `required` is present.
    ///
    /// An empty source has no columns to check and always passes.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingColumn`] for the first absent column.
    pub fn require_columns(&self, required: &[&'static str]) -> Result<(), SchemaError> {
        if self.records.is_empty() && self.columns.is_empty() {
            return Ok(());
        }
        match required.iter().find(|column| !self.has_column(column)) {
            Some(column) => Err(SchemaError::MissingColumn {
                column: *column,
                format: self.format,
            }),
            None => Ok(()),
        }
    }

    /// Append the rows of `other`. Columns are merged.
    pub fn extend(&mut self, other: RecordSet) {
        for column in &other.columns {
            self.add_column(column);
        }
        self.records.extend(other.records);
    }
}

/// Picks a parser from the file extension.
fn parser_for(path: &Path) -> Option<Box<dyn RecordParser>> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    match extension.as_str() {
        #[cfg(feature = "csv")]
        "csv" => Some(Box::new(crate::csv::CsvParser::new())),
        #[cfg(feature = "json")]
        "json" => Some(Box::new(crate::json::JsonParser::new())),
        _ => None,
    }
}

/// Reads and parses one source file.
///
/// # Errors
///
/// - [`DruglinkError::UnsupportedFormat`] for an extension other than `.csv`
///   or `.json` (or one whose feature is disabled)
/// - [`DruglinkError::Io`] when the file cannot be read
/// - [`DruglinkError::Source`] when its content is malformed
pub fn load_records(path: &Path) -> Result<RecordSet, DruglinkError> {
    let _span = info_span!("load", path = %path.display()).entered();

    let parser = parser_for(path).ok_or_else(|| DruglinkError::UnsupportedFormat(path.to_path_buf()))?;
    let content = fs::read_to_string(path).map_err(|source| DruglinkError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parser.parse(&content).map_err(|source| DruglinkError::Source {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(records = records.len(), columns = ?records.columns, "Parsed source file");
    Ok(records)
}

/// Loads several files of the same record type and converts their rows.
///
/// Each file is checked for the `required` columns, then every row is passed
/// to `convert`. Rows keep file order, then row order.
///
/// # Errors
///
/// See [`load_records`]. A missing column is reported as
/// [`DruglinkError::SourceSchema`] and a row rejected by `convert` as
/// [`DruglinkError::Source`] naming its file.
pub fn load_all<T, P, F>(paths: &[P], required: &[&'static str], mut convert: F) -> Result<Vec<T>, DruglinkError>
where
    P: AsRef<Path>,
    F: FnMut(RawRecord) -> Result<T, ParseError>,
{
    let mut converted = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let set = load_records(path)?;
        set.require_columns(required)
            .map_err(|source| DruglinkError::SourceSchema {
                path: path.to_path_buf(),
                source,
            })?;
        for record in set.records {
            let item = convert(record).map_err(|source| DruglinkError::Source {
                path: path.to_path_buf(),
                source,
            })?;
            converted.push(item);
        }
    }
    info!(files = paths.len(), records = converted.len(), "Loaded and concatenated sources");
    Ok(converted)
}
