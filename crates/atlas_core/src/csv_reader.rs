use std::collections::HashMap;

use csv::{ReaderBuilder, Trim};

use crate::error::CsvParseError;

/// One parsed data row, keeping the source line number for error reporting.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub line: u64,
    pub fields: Vec<String>,
}

/// A parsed delimited table: header-declared columns plus data rows in source
/// order. Values are kept verbatim; empty fields stay empty strings.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub file: String,
    pub headers: Vec<String>,
    header_index: HashMap<String, usize>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Index of a column by name, case-insensitive on the header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header_index.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn value<'a>(&self, row: &'a RawRow, column: usize) -> &'a str {
        row.fields.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Parse raw table bytes into a [`RawTable`].
///
/// Comma-delimited with optional quoting; quoted fields, embedded delimiters,
/// and escaped quotes are handled by the `csv` reader. A data row whose field
/// count differs from the header is a parse failure carrying the table name
/// and source line.
pub fn parse_table(file: &'static str, data: &[u8]) -> Result<RawTable, CsvParseError> {
    let data = strip_utf8_bom(data);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|err| CsvParseError::new(file, None, err.to_string()))?
        .iter()
        .map(|value| value.to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(CsvParseError::new(file, None, "missing header row"));
    }

    let header_index: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(index, value)| (value.trim().to_ascii_lowercase(), index))
        .collect();

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|err| {
            let line = err.position().map(|pos| pos.line());
            CsvParseError::new(file, line, err.to_string())
        })?;
        let line = record
            .position()
            .map(|pos| pos.line())
            .unwrap_or(index as u64 + 2);
        if record.len() != headers.len() {
            return Err(CsvParseError::new(
                file,
                Some(line),
                format!(
                    "row has {} fields but header declares {}",
                    record.len(),
                    headers.len()
                ),
            ));
        }
        rows.push(RawRow {
            line,
            fields: record.iter().map(|value| value.to_string()).collect(),
        });
    }

    Ok(RawTable {
        file: file.to_string(),
        headers,
        header_index,
        rows,
    })
}

fn strip_utf8_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data)
}
