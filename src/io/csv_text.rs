//! Permissive CSV text parsing.
//!
//! Turns the raw text of the SBS export into header-keyed records. This is
//! deliberately simple:
//!
//! - the first line is always the header; header names are trimmed
//! - fields are split on `,` with **no quote handling** (a comma inside a
//!   field splits it; quote characters are kept as-is)
//! - LF and CRLF line endings are both accepted; a lone CR is field data
//! - surrounding whitespace of the whole text is trimmed; a blank line inside
//!   the data still counts as a (date-less) record
//! - short lines leave trailing columns absent, extra fields are ignored
//! - values stay raw strings; typing happens in the row pipeline

use std::collections::HashMap;

use csv::StringRecord;
use tracing::warn;

/// One data line keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    /// Raw value for `column`, or `None` when the line was too short.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Number of columns present on this line.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parse CSV text into records. Never fails: bad input yields fewer or partial records.
///
/// The text is trimmed, then split into lines on `\n` (a trailing `\r` is
/// dropped). Every line after the header yields a record; a blank interior
/// line yields a record whose first column is `""` and whose other columns
/// are absent.
pub fn parse_csv(text: &str) -> Vec<RawRecord> {
    let builder = line_reader();
    let mut lines = text.trim().split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));

    let headers: Vec<String> = match lines.next().map(|line| read_line(&builder, line)) {
        Some(Ok(Some(record))) => record.iter().map(normalize_header_name).collect(),
        Some(Err(e)) => {
            warn!(error = %e, "could not read CSV header");
            return Vec::new();
        }
        _ => return Vec::new(),
    };

    let mut records = Vec::new();
    for (idx, line) in lines.enumerate() {
        match read_line(&builder, line) {
            Ok(Some(record)) => records.push(keyed_record(&headers, &record)),
            Ok(None) => records.push(blank_record(&headers)),
            Err(e) => warn!(record = idx + 1, error = %e, "skipping unreadable CSV record"),
        }
    }
    records
}

/// Reader settings for a single line: no header, no quoting, ragged lengths.
///
/// Only `\n` terminates a record, so a lone `\r` stays inside its field.
fn line_reader() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .terminator(csv::Terminator::Any(b'\n'));
    builder
}

/// Fields of one line, or `None` for an empty line (the reader yields no record).
fn read_line(builder: &csv::ReaderBuilder, line: &str) -> Result<Option<StringRecord>, csv::Error> {
    let mut reader = builder.from_reader(line.as_bytes());
    let mut record = StringRecord::new();
    Ok(reader.read_record(&mut record)?.then_some(record))
}

fn blank_record(headers: &[String]) -> RawRecord {
    let fields = headers
        .first()
        .map(|name| (name.clone(), String::new()))
        .into_iter()
        .collect();
    RawRecord { fields }
}

fn keyed_record(headers: &[String], record: &StringRecord) -> RawRecord {
    // Later duplicates of a header win, like a plain map insert.
    let fields = headers
        .iter()
        .zip(record.iter())
        .map(|(name, value)| (name.clone(), value.to_string()))
        .collect();
    RawRecord { fields }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim_start_matches('\u{feff}').trim().to_string()
}
