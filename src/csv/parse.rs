//! Low-level CSV reading.

use crate::SourceFormat;
use crate::csv::config::CsvConfig;
use crate::error::{ParseError, ValueError};
use crate::source::{RawRecord, RecordSet};
use csv::{ReaderBuilder, StringRecord};

/// Parse CSV text into a record set with canonical column names.
pub fn csv_parse<S: AsRef<str>>(csv_text: S, config: &CsvConfig) -> Result<RecordSet, ParseError> {
    let text = csv_text.as_ref();
    let mut set = RecordSet::new(SourceFormat::Csv);

    if text.trim().is_empty() {
        return Ok(set);
    }

    config.validate().map_err(|msg| {
        ParseError::without_position(
            SourceFormat::Csv,
            ValueError::Syntax(format!("Invalid CSV configuration: {}", msg)),
        )
    })?;

    let mut reader = ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(true)
        .quote(config.quote)
        .trim(if config.trim {
            csv::Trim::All
        } else {
            csv::Trim::None
        })
        .flexible(config.flexible)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| {
            ParseError::at_line(
                1,
                SourceFormat::Csv,
                ValueError::Syntax(format!("Header parsing error: {}", e)),
            )
        })?
        .iter()
        .map(|header| {
            config
                .get_field_for_header(header)
                .map(String::from)
                .unwrap_or_else(|| header.to_string())
        })
        .collect();

    for header in &headers {
        set.add_column(header);
    }

    let mut line_number = 2;
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            let line = e.position().map(|p| p.line() as usize).unwrap_or(line_number);
            ParseError::at_line(
                line,
                SourceFormat::Csv,
                ValueError::Syntax(format!("CSV parsing error: {}", e)),
            )
        })?;

        let (line, byte_offset) = record
            .position()
            .map(|p| (p.line() as usize, p.byte() as usize))
            .unwrap_or((line_number, 0));

        let raw = read_row(&headers, &record, index + 1).at_line(line, byte_offset);
        if !raw.has_content() && !config.flexible {
            return Err(ParseError::at_line(
                line,
                SourceFormat::Csv,
                ValueError::Syntax("Record contains no meaningful content".to_string()),
            ));
        }
        if raw.has_content() {
            set.records.push(raw);
        }

        line_number = line + 1;
    }

    Ok(set)
}

/// Pair every value with its (already canonical) header. Values past the last
/// header only occur in flexible mode and are dropped.
fn read_row(headers: &[String], record: &StringRecord, index: usize) -> RawRecord {
    let mut raw = RawRecord::new(SourceFormat::Csv, index);
    for (header, value) in headers.iter().zip(record.iter()) {
        raw.insert(header.as_str(), value);
    }
    raw
}
