use crate::range::RowChecks;
use crate::{DatasetKind, FilterContext, FilterPolicy, NumericRange};
use housefilter_formats::Table;
use serde::{Deserialize, Serialize};

/// Numeric price index tables.
///
/// Every numeric column is checked in column order: a row survives a column
/// if the cell is null or within `value`. Retaining a row per column one
/// after another equals requiring every column to pass, so all columns are
/// checked in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericIndexPolicy {
    pub value: NumericRange,
}

impl Default for NumericIndexPolicy {
    fn default() -> Self {
        Self {
            value: NumericRange::inclusive(10.0, 1000.0),
        }
    }
}

impl FilterPolicy for NumericIndexPolicy {
    fn kind(&self) -> DatasetKind {
        DatasetKind::NumericIndex
    }

    fn apply(&self, table: &Table, _ctx: &FilterContext) -> Table {
        let mut checks = RowChecks::for_table(table).not_all_null();
        for (idx, ty) in table.column_types().iter().enumerate() {
            if ty.is_numeric() {
                checks = checks.null_or_in_range_at(idx, self.value);
            }
        }
        checks.apply()
    }

    fn describe(&self, _ctx: &FilterContext) -> Vec<String> {
        vec![
            "rows with every cell null dropped".to_string(),
            format!("every numeric column null or in {}", self.value),
        ]
    }
}
