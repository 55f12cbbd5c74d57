use crate::boundaries::AreaBoundary;
use crate::constants::{INDICATOR_KEY_COLUMN, INDICATOR_NAME_COLUMN};
use crate::error::Result;
use crate::indicators::IndicatorTable;

use csv::StringRecord;
use geojson::JsonValue;
use std::collections::HashMap;

/// Canonical text form of a join key. Integral numbers lose their fraction
/// (`"7"`, `"7.0"` and `" 7 "` all become `"7"`), other text is trimmed.
pub fn normalize_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(n) => Some(normalize_number(n).unwrap_or_else(|| trimmed.to_string())),
        Err(_) => Some(trimmed.to_string()),
    }
}

/// Same as [`normalize_key`] for GeoJSON property values
pub fn normalize_json_key(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => normalize_key(s),
        JsonValue::Number(n) => n
            .as_f64()
            .and_then(normalize_number)
            .or_else(|| Some(n.to_string())),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn normalize_number(n: f64) -> Option<String> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        Some(format!("{}", n as i64))
    } else {
        None
    }
}

/// Indicator columns used by the report, resolved once up front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorColumns {
    pub key: usize,
    pub name: usize,
    pub metric: usize,
}

impl IndicatorColumns {
    /// Resolves the key, name and metric columns
    ///
    /// # Errors
    /// Returns [`StoryError::MissingColumn`](crate::StoryError::MissingColumn)
    /// for the first absent column, metric first
    pub fn resolve(table: &IndicatorTable, metric: &str) -> Result<Self> {
        let metric = table.require_column(metric)?;
        let key = table.require_column(INDICATOR_KEY_COLUMN)?;
        let name = table.require_column(INDICATOR_NAME_COLUMN)?;
        Ok(Self { key, name, metric })
    }
}

/// A boundary with the indicator record sharing its key, if any
#[derive(Debug, Clone, Copy)]
pub struct JoinedArea<'a> {
    pub boundary: &'a AreaBoundary,
    pub record: Option<&'a StringRecord>,
    pub value: Option<f64>,
}

/// Left join result: exactly one entry per boundary, in boundary order
#[derive(Debug, Clone)]
pub struct JoinedAreas<'a> {
    pub metric: String,
    pub headers: &'a StringRecord,
    pub areas: Vec<JoinedArea<'a>>,
}

impl JoinedAreas<'_> {
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn matched(&self) -> usize {
        self.areas.iter().filter(|a| a.record.is_some()).count()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.areas.iter().filter_map(|a| a.value)
    }
}

/// Left-joins indicator records onto boundaries by normalized key.
/// `values` is the parsed metric column, aligned with the table records.
/// Duplicate indicator keys resolve to the first record.
pub fn left_join<'a>(
    boundaries: &'a [AreaBoundary],
    table: &'a IndicatorTable,
    columns: &IndicatorColumns,
    metric: &str,
    values: &[Option<f64>],
) -> JoinedAreas<'a> {
    let mut by_key: HashMap<String, usize> = HashMap::new();
    for row in 0..table.len() {
        if let Some(key) = normalize_key(table.cell(row, columns.key)) {
            by_key.entry(key).or_insert(row);
        }
    }

    let areas = boundaries
        .iter()
        .map(|boundary| {
            let row = boundary.key.as_ref().and_then(|k| by_key.get(k)).copied();
            JoinedArea {
                boundary,
                record: row.and_then(|r| table.records().get(r)),
                value: row.and_then(|r| values.get(r).copied().flatten()),
            }
        })
        .collect();

    JoinedAreas {
        metric: metric.to_string(),
        headers: table.headers(),
        areas,
    }
}
