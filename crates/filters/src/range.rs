//! Numeric range checks over table rows
//!
//! Policies describe their rules with a [`RowChecks`] builder. Rules that
//! name a column the table does not have are skipped, so every policy is
//! total over arbitrary input.

use housefilter_formats::{Cell, Table};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed numeric interval, optionally open at the lower end
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    /// Exclude `min` itself, e.g. areas that must be strictly positive
    #[serde(default)]
    pub exclusive_min: bool,
}

impl NumericRange {
    /// `[min, max]`
    pub const fn inclusive(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            exclusive_min: false,
        }
    }

    /// `(min, max]`
    pub const fn above(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            exclusive_min: true,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        let above_min = if self.exclusive_min {
            value > self.min
        } else {
            value >= self.min
        };
        above_min && value <= self.max
    }

    /// Whether the cell is numeric and inside the range. Nulls never are.
    pub fn accepts(&self, cell: &Cell) -> bool {
        cell.as_f64().map_or(false, |v| self.contains(v))
    }
}

impl fmt::Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.exclusive_min { '(' } else { '[' };
        write!(f, "{}{}, {}]", open, self.min, self.max)
    }
}

/// A single row-level rule with resolved column indices
#[derive(Debug, Clone)]
enum RowCheck {
    InRange { idx: usize, range: NumericRange },
    NullOrInRange { idx: usize, range: NumericRange },
    NotNull { idx: usize },
    NotBothZero { a: usize, b: usize },
    NotAllNull,
}

impl RowCheck {
    fn passes(&self, row: &[Cell]) -> bool {
        match self {
            RowCheck::InRange { idx, range } => range.accepts(&row[*idx]),
            RowCheck::NullOrInRange { idx, range } => row[*idx].is_null() || range.accepts(&row[*idx]),
            RowCheck::NotNull { idx } => !row[*idx].is_null(),
            RowCheck::NotBothZero { a, b } => {
                !(row[*a].as_f64() == Some(0.0) && row[*b].as_f64() == Some(0.0))
            }
            RowCheck::NotAllNull => row.iter().any(|cell| !cell.is_null()),
        }
    }
}

/// Builder collecting the rules a row must satisfy to be kept
#[derive(Debug, Clone)]
pub struct RowChecks<'t> {
    table: &'t Table,
    checks: Vec<RowCheck>,
}

impl<'t> RowChecks<'t> {
    pub fn for_table(table: &'t Table) -> Self {
        Self {
            table,
            checks: Vec::new(),
        }
    }

    /// Keep rows whose `column` is numeric and within `range`.
    pub fn in_range(mut self, column: &str, range: NumericRange) -> Self {
        if let Some(idx) = self.table.column_index(column) {
            self.checks.push(RowCheck::InRange { idx, range });
        }
        self
    }

    /// Keep rows whose cell at `idx` is null or within `range`.
    pub fn null_or_in_range_at(mut self, idx: usize, range: NumericRange) -> Self {
        if idx < self.table.width() {
            self.checks.push(RowCheck::NullOrInRange { idx, range });
        }
        self
    }

    pub fn not_null(mut self, column: &str) -> Self {
        if let Some(idx) = self.table.column_index(column) {
            self.checks.push(RowCheck::NotNull { idx });
        }
        self
    }

    /// Rules for a coordinate pair, applied only when both columns exist:
    /// both present, not the `(0, 0)` placeholder, and inside `bounds` if given.
    pub fn coordinates(
        mut self,
        lat: &str,
        long: &str,
        bounds: Option<(NumericRange, NumericRange)>,
    ) -> Self {
        if let (Some(a), Some(b)) = (self.table.column_index(lat), self.table.column_index(long)) {
            self.checks.push(RowCheck::NotNull { idx: a });
            self.checks.push(RowCheck::NotNull { idx: b });
            match bounds {
                Some((lat_range, long_range)) => {
                    self.checks.push(RowCheck::InRange { idx: a, range: lat_range });
                    self.checks.push(RowCheck::InRange { idx: b, range: long_range });
                }
                None => self.checks.push(RowCheck::NotBothZero { a, b }),
            }
        }
        self
    }

    pub fn not_all_null(mut self) -> Self {
        self.checks.push(RowCheck::NotAllNull);
        self
    }

    /// Number of rules that survived column resolution
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Derive the table of rows passing every rule.
    pub fn apply(self) -> Table {
        let checks = self.checks;
        self.table
            .filter_rows(|row| checks.iter().all(|check| check.passes(row)))
    }
}

/// Drop rows in which every cell is null.
pub fn drop_empty_rows(table: &Table) -> Table {
    RowChecks::for_table(table).not_all_null().apply()
}
