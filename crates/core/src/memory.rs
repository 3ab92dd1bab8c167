//! Memory footprint estimates for loaded tables
//!
//! Mirrors dataframe "deep" memory accounting so figures are comparable
//! with what a dataframe library reports for the same file.

use housefilter_formats::{Cell, ColumnType, Table};

/// Bytes per numeric or datetime cell
const NUMERIC_CELL_BYTES: usize = 8;
/// Bytes per boolean cell
const BOOL_CELL_BYTES: usize = 1;
/// Pointer held for every cell of a text column
const OBJECT_POINTER_BYTES: usize = 8;
/// Fixed overhead of a boxed string, before its UTF-8 payload
const STRING_HEADER_BYTES: usize = 49;
/// A missing value held in a text column
const NULL_OBJECT_BYTES: usize = 24;
/// Row index
const INDEX_BYTES: usize = 128;

const MB: f64 = 1024.0 * 1024.0;

fn cell_bytes(ty: ColumnType, cell: &Cell) -> usize {
    match ty {
        ColumnType::Boolean => BOOL_CELL_BYTES,
        ColumnType::Text => match cell {
            Cell::Text(s) => OBJECT_POINTER_BYTES + STRING_HEADER_BYTES + s.len(),
            _ => OBJECT_POINTER_BYTES + NULL_OBJECT_BYTES,
        },
        _ => NUMERIC_CELL_BYTES,
    }
}

/// Estimated in-memory size of a table, in bytes.
pub fn estimate_table_bytes(table: &Table) -> usize {
    let types = table.column_types();
    let cells: usize = table
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .zip(types)
                .map(|(cell, ty)| cell_bytes(*ty, cell))
                .sum::<usize>()
        })
        .sum();
    INDEX_BYTES + cells
}

pub fn bytes_to_mb(bytes: usize) -> f64 {
    bytes as f64 / MB
}
