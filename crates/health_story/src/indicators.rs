use crate::constants::NULL_MARKERS;
use crate::error::{Result, StoryError};

use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{BufReader, Read};
use std::num::ParseFloatError;
use std::path::Path;

/// Health indicator rows, one per community area. Cells are kept as the
/// original text so written subsets reproduce the source columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorTable {
    headers: StringRecord,
    records: Vec<StringRecord>,
}

impl IndicatorTable {
    pub fn new(headers: StringRecord, records: Vec<StringRecord>) -> Self {
        Self { headers, records }
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn records(&self) -> &[StringRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of a column by exact header name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
    }

    /// Like [`column_index`](Self::column_index) but missing columns are an error
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| StoryError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Cell text, empty when the record is short
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.records
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or("")
    }

    /// Parses a numeric column; missing-value markers become `None`
    ///
    /// # Errors
    /// Returns [`StoryError::MetricParse`] for the first cell that is neither
    /// a number nor a missing-value marker
    pub fn numeric_column(&self, column: usize) -> Result<Vec<Option<f64>>> {
        let column_name = self.headers.get(column).unwrap_or_default().to_string();

        (0..self.records.len())
            .map(|row| {
                let raw = self.cell(row, column);
                parse_numeric_cell(raw).map_err(|source| StoryError::MetricParse {
                    column: column_name.clone(),
                    row: row + 2, // 1-indexed, +1 for header
                    value: raw.to_string(),
                    source,
                })
            })
            .collect()
    }
}

/// Parses one numeric cell, treating the usual missing-value markers as null
pub fn parse_numeric_cell(raw: &str) -> std::result::Result<Option<f64>, ParseFloatError> {
    let trimmed = raw.trim();
    if NULL_MARKERS.contains(&trimmed) {
        return Ok(None);
    }
    let value: f64 = trimmed.parse()?;
    Ok(if value.is_nan() { None } else { Some(value) })
}

/// Reads the indicator table from a CSV file
pub fn read_indicators<P: AsRef<Path>>(path: P) -> Result<IndicatorTable> {
    let file = File::open(path)?;
    read_indicators_from_reader(BufReader::new(file))
}

pub fn read_indicators_from_reader<R: Read>(reader: R) -> Result<IndicatorTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let records = rdr
        .records()
        .filter(|rec| match rec {
            Ok(rec) => !rec.iter().all(|f| f.trim().is_empty()),
            Err(_) => true,
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(IndicatorTable::new(headers, records))
}
