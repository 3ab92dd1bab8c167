//! Dataset kinds and how a file is assigned one

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The kind of dataset a file holds, selecting its filter policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetKind {
    /// Detailed regional sales with per-listing attributes
    RegionalSales,
    /// County sales records with grade and coordinates
    CountySales,
    /// Year-indexed price change series
    IndexByYear,
    /// Generic numeric price index
    NumericIndex,
    /// Anything else
    Generic,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 5] = [
        DatasetKind::RegionalSales,
        DatasetKind::CountySales,
        DatasetKind::IndexByYear,
        DatasetKind::NumericIndex,
        DatasetKind::Generic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DatasetKind::RegionalSales => "regional-sales",
            DatasetKind::CountySales => "county-sales",
            DatasetKind::IndexByYear => "index-by-year",
            DatasetKind::NumericIndex => "numeric-index",
            DatasetKind::Generic => "generic",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DatasetKind::RegionalSales => "detailed regional sales data",
            DatasetKind::CountySales => "county sales data",
            DatasetKind::IndexByYear => "time-series index data by year",
            DatasetKind::NumericIndex => "numeric price index data",
            DatasetKind::Generic => "unclassified data",
        }
    }

    /// Guess the kind from keywords in a file name (case-insensitive).
    ///
    /// Only used when inference is switched on; explicit assignments win.
    pub fn from_filename(filename: &str) -> DatasetKind {
        let name = filename.to_lowercase();
        let has_any = |keywords: &[&str]| keywords.iter().any(|k| name.contains(k));

        if name.contains("india") && !name.contains("index") {
            DatasetKind::RegionalSales
        } else if has_any(&["house_prices", "housing"]) {
            DatasetKind::CountySales
        } else if has_any(&["real_year", "nominal_year", "real_index", "nominal_index"]) {
            DatasetKind::IndexByYear
        } else if name.contains("index") {
            DatasetKind::NumericIndex
        } else {
            DatasetKind::Generic
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        DatasetKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}

/// How a dataset's kind was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindSource {
    /// Assigned by the caller
    Explicit,
    /// Guessed from the file name
    Inferred,
    /// Neither; the generic policy applies
    Fallback,
}

impl fmt::Display for KindSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KindSource::Explicit => "explicit",
            KindSource::Inferred => "inferred",
            KindSource::Fallback => "fallback",
        })
    }
}

/// Caller-supplied kind tags, keyed by file name or dataset key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindAssignments {
    pub kinds: BTreeMap<String, DatasetKind>,
    /// Fall back to file-name keywords for files without a tag
    pub infer_kinds: bool,
}

impl KindAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(mut self, name: impl Into<String>, kind: DatasetKind) -> Self {
        self.kinds.insert(name.into(), kind);
        self
    }

    pub fn with_inference(mut self, infer: bool) -> Self {
        self.infer_kinds = infer;
        self
    }

    /// Parse a `FILE=KIND` command-line assignment.
    pub fn parse_assignment(raw: &str) -> Result<(String, DatasetKind)> {
        let (name, kind) = raw
            .split_once('=')
            .ok_or_else(|| Error::InvalidAssignment(raw.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidAssignment(raw.to_string()));
        }
        Ok((name.to_string(), kind.parse()?))
    }

    /// Decide the kind for a file.
    pub fn resolve(&self, filename: &str, key: &str) -> (DatasetKind, KindSource) {
        if let Some(kind) = self.kinds.get(filename).or_else(|| self.kinds.get(key)) {
            return (*kind, KindSource::Explicit);
        }
        if self.infer_kinds {
            return (DatasetKind::from_filename(filename), KindSource::Inferred);
        }
        (DatasetKind::Generic, KindSource::Fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_filename() {
        assert_eq!(DatasetKind::from_filename("India_House_Price.csv"), DatasetKind::RegionalSales);
        assert_eq!(DatasetKind::from_filename("india_price_index.csv"), DatasetKind::NumericIndex);
        assert_eq!(DatasetKind::from_filename("kc_house_prices.csv"), DatasetKind::CountySales);
        assert_eq!(DatasetKind::from_filename("Housing.csv"), DatasetKind::CountySales);
        assert_eq!(DatasetKind::from_filename("REAL_YEAR.csv"), DatasetKind::IndexByYear);
        assert_eq!(DatasetKind::from_filename("nominal_index.csv"), DatasetKind::IndexByYear);
        assert_eq!(DatasetKind::from_filename("price_index.csv"), DatasetKind::NumericIndex);
        assert_eq!(DatasetKind::from_filename("misc.csv"), DatasetKind::Generic);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("county-sales".parse::<DatasetKind>().unwrap(), DatasetKind::CountySales);
        assert_eq!("Index_By_Year".parse::<DatasetKind>().unwrap(), DatasetKind::IndexByYear);
        assert!(matches!("sales".parse::<DatasetKind>(), Err(Error::UnknownKind(_))));
    }

    #[test]
    fn test_parse_assignment() {
        let (name, kind) = KindAssignments::parse_assignment("Housing.csv=county-sales").unwrap();
        assert_eq!(name, "Housing.csv");
        assert_eq!(kind, DatasetKind::CountySales);

        assert!(matches!(
            KindAssignments::parse_assignment("Housing.csv"),
            Err(Error::InvalidAssignment(_))
        ));
        assert!(matches!(
            KindAssignments::parse_assignment("=generic"),
            Err(Error::InvalidAssignment(_))
        ));
    }

    #[test]
    fn test_resolve_prefers_explicit() {
        let assignments = KindAssignments::new()
            .assign("Housing.csv", DatasetKind::NumericIndex)
            .assign("real_year", DatasetKind::Generic)
            .with_inference(true);

        assert_eq!(
            assignments.resolve("Housing.csv", "housing"),
            (DatasetKind::NumericIndex, KindSource::Explicit)
        );
        assert_eq!(
            assignments.resolve("Real_Year.csv", "real_year"),
            (DatasetKind::Generic, KindSource::Explicit)
        );
        assert_eq!(
            assignments.resolve("house_prices.csv", "house_prices"),
            (DatasetKind::CountySales, KindSource::Inferred)
        );
    }

    #[test]
    fn test_resolve_without_inference() {
        let assignments = KindAssignments::new();
        assert_eq!(
            assignments.resolve("house_prices.csv", "house_prices"),
            (DatasetKind::Generic, KindSource::Fallback)
        );
    }

    #[test]
    fn test_serde_tags() {
        let json = serde_json::to_string(&DatasetKind::IndexByYear).unwrap();
        assert_eq!(json, "\"index-by-year\"");
    }
}
