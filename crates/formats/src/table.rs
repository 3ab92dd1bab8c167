//! In-memory table model shared by the readers, filters and reports
//!
//! A [`Table`] is an ordered set of named, typed columns and a list of rows.
//! Column types are inferred once at load time from the raw strings, the same
//! way a dataframe library infers dtypes, and stay fixed afterwards.

use crate::{Error, Result};
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Strings treated as missing values when reading.
pub const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_MARKERS: &[&str] = &["True", "TRUE", "true"];
const FALSE_MARKERS: &[&str] = &["False", "FALSE", "false"];

/// A single table cell
#[derive(Debug, Clone)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric view of the cell. Booleans, text and dates are not numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Float bits with `-0.0` folded into `0.0` so equal values hash equally.
    fn float_key(f: f64) -> u64 {
        if f == 0.0 {
            0.0f64.to_bits()
        } else {
            f.to_bits()
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Null, Cell::Null) => true,
            (Cell::Int(a), Cell::Int(b)) => a == b,
            (Cell::Float(a), Cell::Float(b)) => Cell::float_key(*a) == Cell::float_key(*b),
            (Cell::Bool(a), Cell::Bool(b)) => a == b,
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::DateTime(a), Cell::DateTime(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Null => {}
            Cell::Int(i) => i.hash(state),
            Cell::Float(f) => Cell::float_key(*f).hash(state),
            Cell::Bool(b) => b.hash(state),
            Cell::Text(s) => s.hash(state),
            Cell::DateTime(d) => d.hash(state),
        }
    }
}

/// Renders the cell the way it is written to CSV.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Float(v) => {
                if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            Cell::Bool(true) => f.write_str("True"),
            Cell::Bool(false) => f.write_str("False"),
            Cell::Text(s) => f.write_str(s),
            Cell::DateTime(d) => {
                if d.time() == NaiveTime::MIN {
                    write!(f, "{}", d.format("%Y-%m-%d"))
                } else if d.nanosecond() == 0 {
                    write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S"))
                } else {
                    write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S%.f"))
                }
            }
        }
    }
}

/// Inferred column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Text,
    DateTime,
    /// No non-null value was seen
    Empty,
}

impl ColumnType {
    /// Whether the column takes part in numeric range checks.
    ///
    /// An all-null column is read as floating point, so it counts as numeric.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float | ColumnType::Empty)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Text => "text",
            ColumnType::DateTime => "datetime",
            ColumnType::Empty => "empty",
        }
    }

    /// Infer a column type from its raw string values.
    fn infer<'a>(values: impl Iterator<Item = &'a str>) -> Self {
        let mut seen = false;
        let mut all_int = true;
        let mut all_float = true;
        let mut all_bool = true;

        for raw in values {
            if is_missing(raw) {
                continue;
            }
            seen = true;
            let trimmed = raw.trim();
            if all_int && trimmed.parse::<i64>().is_err() {
                all_int = false;
            }
            if all_float && trimmed.parse::<f64>().is_err() {
                all_float = false;
            }
            if all_bool && !TRUE_MARKERS.contains(&trimmed) && !FALSE_MARKERS.contains(&trimmed) {
                all_bool = false;
            }
            if !all_int && !all_float && !all_bool {
                return ColumnType::Text;
            }
        }

        if !seen {
            ColumnType::Empty
        } else if all_int {
            ColumnType::Integer
        } else if all_float {
            ColumnType::Float
        } else if all_bool {
            ColumnType::Boolean
        } else {
            ColumnType::Text
        }
    }

    /// Convert a raw value into a cell of this type.
    fn parse(self, raw: &str) -> Cell {
        if is_missing(raw) {
            return Cell::Null;
        }
        let trimmed = raw.trim();
        match self {
            ColumnType::Integer => trimmed.parse().map(Cell::Int).unwrap_or(Cell::Null),
            ColumnType::Float => trimmed.parse().map(Cell::Float).unwrap_or(Cell::Null),
            ColumnType::Boolean => Cell::Bool(TRUE_MARKERS.contains(&trimmed)),
            ColumnType::Text | ColumnType::DateTime => Cell::Text(raw.to_string()),
            ColumnType::Empty => Cell::Null,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_null_marker(raw: &str) -> bool {
    NULL_MARKERS.contains(&raw)
}

/// A null marker, or any spelling of NaN the float parser accepts (`NAN`, `+nan`).
fn is_missing(raw: &str) -> bool {
    is_null_marker(raw) || raw.trim().parse::<f64>().map_or(false, f64::is_nan)
}

/// An immutable table of typed cells
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    types: Vec<ColumnType>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create a table from already-typed rows.
    pub fn new(columns: Vec<String>, types: Vec<ColumnType>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        if types.len() != columns.len() {
            return Err(Error::InvalidFile(format!(
                "{} column types given for {} columns",
                types.len(),
                columns.len()
            )));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Error::RowWidth {
                    row: i,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self {
            columns,
            types,
            rows,
        })
    }

    /// Build a table from raw string fields, inferring each column's type.
    ///
    /// Rows shorter than the header are padded with nulls.
    pub fn from_raw(columns: Vec<String>, raw_rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        fn field(row: &[String], idx: usize) -> &str {
            row.get(idx).map(String::as_str).unwrap_or("")
        }

        let types: Vec<ColumnType> = (0..width)
            .map(|idx| ColumnType::infer(raw_rows.iter().map(|row| field(row, idx))))
            .collect();

        let rows = raw_rows
            .iter()
            .map(|row| {
                types
                    .iter()
                    .enumerate()
                    .map(|(idx, ty)| ty.parse(field(row, idx)))
                    .collect()
            })
            .collect();

        Self {
            columns,
            types,
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_types(&self) -> &[ColumnType] {
        &self.types
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_type(&self, idx: usize) -> ColumnType {
        self.types[idx]
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Derive a new table holding only the rows that satisfy `keep`.
    pub fn filter_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[Cell]) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            types: self.types.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    /// Derive a new table holding the rows whose entry in `keep` is true.
    ///
    /// Rows past the end of `keep` are dropped.
    pub fn select_rows(&self, keep: &[bool]) -> Table {
        Table {
            columns: self.columns.clone(),
            types: self.types.clone(),
            rows: self
                .rows
                .iter()
                .zip(keep)
                .filter(|(_, &k)| k)
                .map(|(row, _)| row.clone())
                .collect(),
        }
    }

    /// Derive a new table with one column rewritten cell by cell.
    pub fn map_column<F>(&self, idx: usize, new_type: ColumnType, mut f: F) -> Table
    where
        F: FnMut(&Cell) -> Cell,
    {
        let mut types = self.types.clone();
        types[idx] = new_type;
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row[idx] = f(&row[idx]);
                row
            })
            .collect();
        Table {
            columns: self.columns.clone(),
            types,
            rows,
        }
    }

    /// Null count per column, in column order.
    pub fn null_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.width()];
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                if cell.is_null() {
                    counts[idx] += 1;
                }
            }
        }
        counts
    }
}

/// A loaded dataset: derived key, original filename and its table
#[derive(Debug, Clone)]
pub struct Dataset {
    pub key: String,
    pub filename: String,
    pub table: Table,
}

impl Dataset {
    pub fn new(key: impl Into<String>, filename: impl Into<String>, table: Table) -> Self {
        Self {
            key: key.into(),
            filename: filename.into(),
            table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_type_inference() {
        let columns = vec!["id".into(), "price".into(), "flag".into(), "city".into(), "blank".into()];
        let table = Table::from_raw(
            columns,
            raw(&[
                &["1", "100.5", "True", "Seattle", ""],
                &["2", "", "False", "42", "NA"],
                &["3", "200", "true", "", ""],
            ]),
        );

        assert_eq!(
            table.column_types(),
            &[
                ColumnType::Integer,
                ColumnType::Float,
                ColumnType::Boolean,
                ColumnType::Text,
                ColumnType::Empty
            ]
        );
        assert_eq!(table.rows()[0][1], Cell::Float(100.5));
        assert_eq!(table.rows()[2][1], Cell::Float(200.0));
        assert!(table.rows()[1][1].is_null());
        assert_eq!(table.rows()[1][3], Cell::Text("42".into()));
        assert_eq!(table.null_counts(), vec![0, 1, 0, 1, 3]);
    }

    #[test]
    fn test_nan_spellings_are_null() {
        let table = Table::from_raw(
            vec!["index".into(), "label".into()],
            raw(&[&["50", "NAN"], &["NAN", "x"], &["+nan", "y"], &["12.5", "z"]]),
        );

        assert_eq!(table.column_type(0), ColumnType::Float);
        assert!(table.rows()[1][0].is_null());
        assert!(table.rows()[2][0].is_null());
        assert_eq!(table.null_counts(), vec![2, 1]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = Table::from_raw(vec!["a".into(), "b".into()], raw(&[&["1"], &["2", "3"]]));
        assert_eq!(table.height(), 2);
        assert!(table.rows()[0][1].is_null());
        assert_eq!(table.column_type(1), ColumnType::Integer);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Float(3.0).to_string(), "3.0");
        assert_eq!(Cell::Float(2.25).to_string(), "2.25");
        assert_eq!(Cell::Int(-7).to_string(), "-7");
        assert_eq!(Cell::Bool(true).to_string(), "True");
        assert_eq!(Cell::Null.to_string(), "");

        let midnight = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(Cell::DateTime(midnight).to_string(), "2020-01-31");
        let noon = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap().and_hms_opt(12, 30, 0).unwrap();
        assert_eq!(Cell::DateTime(noon).to_string(), "2020-01-31 12:30:00");
        let precise = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap().and_hms_milli_opt(12, 30, 0, 250).unwrap();
        assert_eq!(Cell::DateTime(precise).to_string(), "2020-01-31 12:30:00.250");
    }

    #[test]
    fn test_cell_equality_folds_negative_zero() {
        assert_eq!(Cell::Float(0.0), Cell::Float(-0.0));
        assert_ne!(Cell::Int(1), Cell::Float(1.0));
        assert_eq!(Cell::Null, Cell::Null);
    }

    #[test]
    fn test_filter_and_map_keep_columns() {
        let table = Table::from_raw(vec!["a".into(), "b".into()], raw(&[&["1", "x"], &["2", "y"]]));

        let filtered = table.filter_rows(|row| row[0].as_f64() == Some(2.0));
        assert_eq!(filtered.height(), 1);
        assert_eq!(filtered.columns(), table.columns());
        assert_eq!(table.height(), 2);

        let mapped = table.map_column(1, ColumnType::Text, |cell| match cell {
            Cell::Text(s) => Cell::Text(s.to_uppercase()),
            other => other.clone(),
        });
        assert_eq!(mapped.rows()[1][1], Cell::Text("Y".into()));
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let result = Table::new(
            vec!["a".into()],
            vec![ColumnType::Integer],
            vec![vec![Cell::Int(1), Cell::Int(2)]],
        );
        assert!(matches!(result, Err(Error::RowWidth { .. })));
    }
}
