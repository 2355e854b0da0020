//! Pretty diagnostic reporting using [ariadne].
//!
//! Renders [`ParseError`] values with the offending source line underlined.
//! Only compiled when the `diagnostics` Cargo feature is enabled:
//!
//! ```toml
//! [dependencies]
//! druglink = { version = "0.1", features = ["diagnostics"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use druglink::{CsvParser, RecordParser};
//!
//! let source = "id,title,date,journal\n1,Atropine,2020-01-01,J1,extra\n";
//! match CsvParser::new().parse(source) {
//!     Ok(set) => println!("Parsed {} records", set.len()),
//!     Err(e) => eprintln!("{}", e.to_diagnostic("pubmed.csv", source)),
//! }
//! ```

use crate::RecordParser;
use crate::error::ParseError;
use crate::source::RecordSet;
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::ops::Range;

impl ParseError {
    /// Render this error as an Ariadne diagnostic.
    ///
    /// The returned `String` contains ANSI colour codes.
    ///
    /// # Arguments
    ///
    /// * `filename` – Label shown in the report header (e.g. `"pubmed.csv"`).
    /// * `source`   – The original source text that was parsed.
    pub fn to_diagnostic(&self, filename: &str, source: &str) -> String {
        let mut buf = Vec::new();
        let range = self.primary_byte_range(source);

        let report = Report::build(ReportKind::Error, (filename, range.clone()))
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, range))
                    .with_message(self.error.to_string())
                    .with_color(Color::Red),
            )
            .finish();

        match report.write((filename, Source::from(source)), &mut buf) {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }

    /// Byte range of `source` that best locates the error.
    ///
    /// Priority: explicit `span`, then the reported line, then the start of
    /// the file. Ranges are clamped to the source length.
    fn primary_byte_range(&self, source: &str) -> Range<usize> {
        if let Some(span) = &self.span {
            let end = span.end.min(source.len());
            return span.start.min(end)..end;
        }
        if let Some(line) = self.line {
            let index = line.saturating_sub(1);
            let start: usize = source.split_inclusive('\n').take(index).map(str::len).sum();
            let len = source.lines().nth(index).map_or(0, str::len);
            return start..start + len;
        }
        0..0
    }
}

/// Parse `input` and, on failure, return a rendered diagnostic instead of a
/// raw [`ParseError`].
///
/// # Errors
///
/// The diagnostic string when `parser` rejects the input.
pub fn parse_with_diagnostics(
    parser: &dyn RecordParser,
    input: &str,
    filename: &str,
) -> Result<RecordSet, String> {
    parser
        .parse(input)
        .map_err(|e| e.to_diagnostic(filename, input))
}
