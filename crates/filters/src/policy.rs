//! The filter policy abstraction

use crate::DatasetKind;
use chrono::{Datelike, Local};
use housefilter_formats::Table;
use std::fmt::Debug;

/// Inputs a policy may depend on besides the table itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterContext {
    /// Upper bound for build-year checks
    pub current_year: i32,
}

impl FilterContext {
    pub fn for_year(current_year: i32) -> Self {
        Self { current_year }
    }
}

impl Default for FilterContext {
    fn default() -> Self {
        Self::for_year(Local::now().year())
    }
}

/// A kind-specific row filter.
///
/// `apply` derives a new table and never mutates its input. The result keeps
/// the input's columns in order and holds a subset of its rows, also in order.
pub trait FilterPolicy: Send + Sync + Debug {
    /// The kind this policy handles
    fn kind(&self) -> DatasetKind;

    fn apply(&self, table: &Table, ctx: &FilterContext) -> Table;

    /// Human-readable rule list, one rule per entry
    fn describe(&self, ctx: &FilterContext) -> Vec<String>;
}
