//! Read-only data quality profiling

use crate::memory::{bytes_to_mb, estimate_table_bytes};
use housefilter_filters::dedup::count_duplicates;
use housefilter_formats::{ColumnType, Dataset, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Null-bearing columns logged per dataset
const LOGGED_NULL_COLUMNS: usize = 10;

/// Quality profile of one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityProfile {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub column_types: BTreeMap<String, ColumnType>,
    pub null_counts: BTreeMap<String, usize>,
    pub null_percentages: BTreeMap<String, f64>,
    pub duplicate_rows: usize,
    pub memory_mb: f64,
}

/// A column with at least one null
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NullColumn<'a> {
    pub column: &'a str,
    pub count: usize,
    pub percentage: f64,
}

impl QualityProfile {
    pub fn analyze(table: &Table) -> Self {
        let rows = table.height();
        let names = table.columns();
        let nulls = table.null_counts();

        let null_percentages = names
            .iter()
            .zip(&nulls)
            .map(|(name, &count)| (name.clone(), percentage(count, rows)))
            .collect();

        Self {
            rows,
            columns: table.width(),
            column_names: names.to_vec(),
            column_types: names
                .iter()
                .cloned()
                .zip(table.column_types().iter().copied())
                .collect(),
            null_counts: names.iter().cloned().zip(nulls.iter().copied()).collect(),
            null_percentages,
            duplicate_rows: count_duplicates(table),
            memory_mb: bytes_to_mb(estimate_table_bytes(table)),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    /// Columns holding nulls, most nulls first; ties keep column order.
    pub fn null_columns(&self) -> Vec<NullColumn<'_>> {
        let mut columns: Vec<NullColumn<'_>> = self
            .column_names
            .iter()
            .filter_map(|name| {
                let count = self.null_counts.get(name).copied().unwrap_or(0);
                (count > 0).then(|| NullColumn {
                    column: name.as_str(),
                    count,
                    percentage: percentage(count, self.rows),
                })
            })
            .collect();
        columns.sort_by(|a, b| b.count.cmp(&a.count));
        columns
    }

    pub fn top_null_columns(&self, n: usize) -> Vec<NullColumn<'_>> {
        let mut columns = self.null_columns();
        columns.truncate(n);
        columns
    }
}

pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}

/// Profile one dataset and log the findings.
pub fn analyze_dataset(dataset: &Dataset) -> QualityProfile {
    let profile = QualityProfile::analyze(&dataset.table);

    info!(
        "{}: {} rows x {} columns, {} duplicates, {:.2} MB",
        dataset.key, profile.rows, profile.columns, profile.duplicate_rows, profile.memory_mb
    );
    let null_columns = profile.top_null_columns(LOGGED_NULL_COLUMNS);
    if null_columns.is_empty() {
        debug!("{}: no missing values", dataset.key);
    }
    for col in &null_columns {
        debug!(
            "{}: {} has {} nulls ({:.1}%)",
            dataset.key, col.column, col.count, col.percentage
        );
    }

    profile
}

/// Profile every dataset, keyed like the input.
pub fn analyze_datasets(datasets: &BTreeMap<String, Dataset>) -> BTreeMap<String, QualityProfile> {
    datasets
        .iter()
        .map(|(key, dataset)| (key.clone(), analyze_dataset(dataset)))
        .collect()
}
