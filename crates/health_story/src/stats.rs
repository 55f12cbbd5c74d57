use crate::error::{Result, StoryError};
use crate::indicators::IndicatorTable;

use itertools::Itertools;

/// Citywide figures quoted by the narrative
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    pub mean: f64,
    pub max: f64,
    /// Name of the first record (in source order) reaching `max`
    pub max_area: String,
    pub count: usize,
}

/// Mean and maximum over non-null values plus the area holding the maximum
///
/// # Errors
/// Returns [`StoryError::EmptyMetric`] when the column has no values
pub fn summarize(
    table: &IndicatorTable,
    name_column: usize,
    metric: &str,
    values: &[Option<f64>],
) -> Result<MetricSummary> {
    let present: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(row, v)| v.map(|v| (row, v)))
        .collect();

    if present.is_empty() {
        return Err(StoryError::EmptyMetric {
            column: metric.to_string(),
        });
    }

    let count = present.len();
    let mean = present.iter().map(|(_, v)| v).sum::<f64>() / count as f64;
    let max = present
        .iter()
        .map(|&(_, v)| v)
        .fold(f64::NEG_INFINITY, f64::max);
    let max_row = present
        .iter()
        .find(|&&(_, v)| v == max)
        .map(|&(row, _)| row)
        .unwrap_or(present[0].0);

    Ok(MetricSummary {
        mean,
        max,
        max_area: table.cell(max_row, name_column).to_string(),
        count,
    })
}

/// Row indices of the `n` largest non-null values, descending. Ties keep
/// source order.
pub fn top_n(values: &[Option<f64>], n: usize) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter_map(|(row, v)| v.map(|v| (row, v)))
        .sorted_by(|a, b| b.1.total_cmp(&a.1))
        .take(n)
        .map(|(row, _)| row)
        .collect()
}

/// Smallest and largest value, `None` when empty
pub fn value_range<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Equal-width histogram
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` ascending edges
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bins spanning min..max of `values`; the last bin is closed on the
    /// right. A zero-width range is widened by 0.5 on each side.
    pub fn from_values(values: &[f64], bins: usize) -> Option<Self> {
        if bins == 0 {
            return None;
        }
        let (mut lo, mut hi) = value_range(values.iter().copied())?;
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins)
            .map(|i| if i == bins { hi } else { lo + width * i as f64 })
            .collect();
        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Some(Self { edges, counts })
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}
