//! CSV reader with encoding fallback
//!
//! Decodes the raw bytes with the first acceptable encoding, then parses the
//! text into a [`Table`]. Header names are made unique and blank headers get
//! positional `Unnamed: N` names.

use crate::encoding::{decode_with_fallback, TextEncoding};
use crate::{Error, Result, Table};
use csv::ReaderBuilder;
use std::collections::HashMap;
use tracing::debug;

/// Configuration for the CSV reader
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Field delimiter
    pub delimiter: u8,
    /// Encodings to try, in priority order
    pub encodings: Vec<TextEncoding>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            encodings: TextEncoding::default_priority(),
        }
    }
}

impl CsvConfig {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_encodings(mut self, encodings: Vec<TextEncoding>) -> Self {
        self.encodings = encodings;
        self
    }
}

/// Parse CSV bytes into a table, returning the encoding that succeeded.
pub fn read_table(bytes: &[u8], config: &CsvConfig) -> Result<(Table, TextEncoding)> {
    let (text, encoding) = decode_with_fallback(bytes, &config.encodings).ok_or_else(|| {
        let tried: Vec<&str> = config.encodings.iter().map(|e| e.label()).collect();
        Error::Encoding(tried.join(", "))
    })?;
    debug!("Decoded {} bytes as {}", bytes.len(), encoding);

    let table = parse_text(&text, config.delimiter)?;
    Ok((table, encoding))
}

/// Parse already-decoded CSV text.
pub fn parse_text(text: &str, delimiter: u8) -> Result<Table> {
    if text.trim().is_empty() {
        return Err(Error::InvalidFile("no columns to parse".to_string()));
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let headers = unique_headers(rdr.headers()?.iter());
    let width = headers.len();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        // Blank lines are skipped rather than read as null rows.
        if record.len() == 1 && record.get(0).map_or(true, str::is_empty) && width > 1 {
            continue;
        }
        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(Error::MalformedRow {
                line,
                expected: width,
                found: record.len(),
            });
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table::from_raw(headers, rows))
}

/// Rename blank and repeated header names: `Unnamed: 3`, `price.1`, ...
fn unique_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::new();

    for (idx, name) in raw.enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name.to_string()
        };

        let mut candidate = base.clone();
        while let Some(count) = seen.get_mut(&candidate) {
            *count += 1;
            candidate = format!("{}.{}", base, count);
        }
        seen.insert(candidate.clone(), 0);
        headers.push(candidate);
    }

    headers
}
