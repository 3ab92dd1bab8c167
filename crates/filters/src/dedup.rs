//! Exact duplicate-row detection
//!
//! Rows are compared cell by cell (nulls compare equal), keeping the first
//! occurrence of every distinct row.

use ahash::AHashSet;
use housefilter_formats::{Cell, Table};
use tracing::debug;

/// Statistics for a de-duplication pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupStats {
    /// Total number of rows seen
    pub total_seen: usize,
    /// Number of rows equal to an earlier row
    pub duplicates_found: usize,
    /// Number of distinct rows
    pub unique_count: usize,
}

impl DedupStats {
    /// Duplicate rate as a percentage
    pub fn dedup_rate(&self) -> f64 {
        if self.total_seen == 0 {
            0.0
        } else {
            (self.duplicates_found as f64 / self.total_seen as f64) * 100.0
        }
    }
}

/// Tracks rows already seen in one table
pub struct RowDeduplicator<'a> {
    seen: AHashSet<&'a [Cell]>,
    stats: DedupStats,
}

impl<'a> RowDeduplicator<'a> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            seen: AHashSet::with_capacity(capacity),
            stats: DedupStats::default(),
        }
    }

    /// Returns `true` if an identical row was seen before.
    pub fn is_duplicate(&mut self, row: &'a [Cell]) -> bool {
        self.stats.total_seen += 1;
        if self.seen.insert(row) {
            self.stats.unique_count += 1;
            false
        } else {
            self.stats.duplicates_found += 1;
            true
        }
    }

    pub fn stats(&self) -> &DedupStats {
        &self.stats
    }
}

impl Default for RowDeduplicator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Mark each row: `true` for the first occurrence, `false` for repeats.
fn first_occurrences(table: &Table) -> (Vec<bool>, DedupStats) {
    let mut dedup = RowDeduplicator::with_capacity(table.height());
    let keep = table
        .rows()
        .iter()
        .map(|row| !dedup.is_duplicate(row.as_slice()))
        .collect();
    (keep, dedup.stats().clone())
}

/// Number of rows that repeat an earlier row.
pub fn count_duplicates(table: &Table) -> usize {
    first_occurrences(table).1.duplicates_found
}

/// Derive a table without repeated rows, keeping first occurrences.
pub fn drop_duplicates(table: &Table) -> Table {
    let (keep, stats) = first_occurrences(table);
    debug!(
        "Dropping {} duplicate rows ({:.1}%)",
        stats.duplicates_found,
        stats.dedup_rate()
    );
    table.select_rows(&keep)
}
