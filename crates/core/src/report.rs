//! Data quality report, written as JSON and as plain text

use crate::pipeline::{FilterOutcome, WriteFailure};
use crate::quality::{percentage, QualityProfile};
use crate::Result;
use chrono::{DateTime, Local, SecondsFormat};
use housefilter_filters::{DatasetKind, KindSource};
use housefilter_formats::{Dataset, SkippedFile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Null columns listed per dataset in the text report
const TEXT_REPORT_NULL_COLUMNS: usize = 5;

/// Report file names inside the output directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportFiles {
    pub json_report: String,
    pub text_report: String,
}

impl Default for ReportFiles {
    fn default() -> Self {
        Self {
            json_report: "data_quality_report.json".to_string(),
            text_report: "data_quality_report.txt".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_datasets: usize,
    pub datasets_processed: usize,
    pub total_original_rows: usize,
    pub total_filtered_rows: usize,
    pub overall_retention_rate: f64,
}

/// Figures only known once a dataset went through a filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredSection {
    pub kind: DatasetKind,
    pub kind_source: KindSource,
    pub filtered_shape: (usize, usize),
    pub filtered_null_counts: BTreeMap<String, usize>,
    pub filtered_duplicates: usize,
    pub rows_removed: usize,
    pub retention_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetReport {
    pub filename: String,
    pub original_shape: (usize, usize),
    pub original_columns: Vec<String>,
    pub original_null_counts: BTreeMap<String, usize>,
    pub original_duplicates: usize,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub filtered: Option<FilteredSection>,
    /// Original profile, kept for the text rendering
    #[serde(skip)]
    profile: QualityProfile,
}

/// Before/after quality report over every loaded dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub analysis_date: String,
    pub summary: ReportSummary,
    pub datasets: BTreeMap<String, DatasetReport>,
    pub skipped_files: Vec<SkippedFile>,
    pub write_failures: Vec<WriteFailure>,
    #[serde(skip)]
    generated_at: DateTime<Local>,
}

impl QualityReport {
    /// Merge the stage outputs into a report.
    ///
    /// `profiles` holds every loaded dataset; `filtered` those that went
    /// through a policy.
    pub fn build(
        generated_at: DateTime<Local>,
        datasets: &BTreeMap<String, Dataset>,
        profiles: &BTreeMap<String, QualityProfile>,
        filtered: &BTreeMap<String, FilterOutcome>,
        skipped_files: &[SkippedFile],
        write_failures: &[WriteFailure],
    ) -> Self {
        let entries: BTreeMap<String, DatasetReport> = profiles
            .iter()
            .map(|(key, profile)| {
                let outcome = filtered.get(key);
                let report = DatasetReport {
                    filename: datasets
                        .get(key)
                        .map(|d| d.filename.clone())
                        .or_else(|| outcome.map(|o| o.filename.clone()))
                        .unwrap_or_default(),
                    original_shape: profile.shape(),
                    original_columns: profile.column_names.clone(),
                    original_null_counts: profile.null_counts.clone(),
                    original_duplicates: profile.duplicate_rows,
                    filtered: outcome.map(|o| filtered_section(profile, o)),
                    profile: profile.clone(),
                };
                (key.clone(), report)
            })
            .collect();

        let total_original_rows = profiles.values().map(|p| p.rows).sum();
        let total_filtered_rows = filtered.values().map(|o| o.rows_after).sum();

        Self {
            analysis_date: generated_at.to_rfc3339_opts(SecondsFormat::Secs, false),
            summary: ReportSummary {
                total_datasets: profiles.len(),
                datasets_processed: filtered.len(),
                total_original_rows,
                total_filtered_rows,
                overall_retention_rate: percentage(total_filtered_rows, total_original_rows),
            },
            datasets: entries,
            skipped_files: skipped_files.to_vec(),
            write_failures: write_failures.to_vec(),
            generated_at,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text rendering of the report.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing to a String never fails.
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "HOUSE PRICE DATA QUALITY REPORT")?;
        writeln!(out, "{}", "=".repeat(50))?;
        writeln!(out)?;
        writeln!(out, "Analysis Date: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(out)?;

        let s = &self.summary;
        writeln!(out, "SUMMARY:")?;
        writeln!(out, "  Total Datasets: {}", s.total_datasets)?;
        writeln!(out, "  Datasets Processed: {}", s.datasets_processed)?;
        writeln!(out, "  Original Total Rows: {}", format_with_commas(s.total_original_rows))?;
        writeln!(out, "  Filtered Total Rows: {}", format_with_commas(s.total_filtered_rows))?;
        writeln!(out, "  Overall Retention Rate: {:.1}%", s.overall_retention_rate)?;
        writeln!(out)?;

        for (key, data) in &self.datasets {
            writeln!(out, "{}:", key.to_uppercase())?;
            let (rows, cols) = data.original_shape;
            writeln!(out, "  Original Shape: {} rows × {} columns", format_with_commas(rows), cols)?;
            if let Some(f) = &data.filtered {
                let (rows, cols) = f.filtered_shape;
                writeln!(out, "  Filtered Shape: {} rows × {} columns", format_with_commas(rows), cols)?;
                writeln!(out, "  Rows Removed: {}", format_with_commas(f.rows_removed))?;
                writeln!(out, "  Retention Rate: {:.1}%", f.retention_rate)?;
            }
            writeln!(out, "  Original Duplicates: {}", format_with_commas(data.original_duplicates))?;

            let top = data.profile.top_null_columns(TEXT_REPORT_NULL_COLUMNS);
            if !top.is_empty() {
                writeln!(out, "  Top Null Columns (original):")?;
                for col in top {
                    writeln!(
                        out,
                        "    {}: {} ({:.1}%)",
                        col.column,
                        format_with_commas(col.count),
                        col.percentage
                    )?;
                }
            }
            writeln!(out)?;
        }

        if !self.skipped_files.is_empty() {
            writeln!(out, "SKIPPED FILES:")?;
            for skipped in &self.skipped_files {
                writeln!(out, "  {}: {}", skipped.filename, skipped.reason)?;
            }
            writeln!(out)?;
        }

        if !self.write_failures.is_empty() {
            writeln!(out, "WRITE FAILURES:")?;
            for failure in &self.write_failures {
                writeln!(out, "  {}: {}", failure.filename, failure.reason)?;
            }
            writeln!(out)?;
        }

        Ok(())
    }

    /// Write both report files into `output_dir`, returning their paths.
    pub fn write(&self, output_dir: &Path, files: &ReportFiles) -> Result<(PathBuf, PathBuf)> {
        let json_path = output_dir.join(&files.json_report);
        fs::write(&json_path, self.to_json()?)?;

        let text_path = output_dir.join(&files.text_report);
        fs::write(&text_path, self.render_text())?;

        info!("Data quality report saved to {:?} and {:?}", json_path, text_path);
        Ok((json_path, text_path))
    }
}

fn filtered_section(original: &QualityProfile, outcome: &FilterOutcome) -> FilteredSection {
    let after = QualityProfile::analyze(&outcome.table);
    FilteredSection {
        kind: outcome.kind,
        kind_source: outcome.kind_source,
        filtered_shape: after.shape(),
        filtered_null_counts: after.null_counts,
        filtered_duplicates: after.duplicate_rows,
        rows_removed: original.rows.saturating_sub(after.rows),
        retention_rate: percentage(after.rows, original.rows),
    }
}

/// Format a number with thousands separators
pub fn format_with_commas(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (count, c) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use housefilter_formats::csv_reader::parse_text;
    use serde_json::{json, Value};

    fn fixture() -> QualityReport {
        let original = parse_text("price,beds\n100,\n100,\n,2\n5,3\n", b',').unwrap();
        let filtered = original.filter_rows(|row| row[0].as_f64().map_or(false, |p| p >= 100.0));

        let mut datasets = BTreeMap::new();
        datasets.insert("sales".to_string(), Dataset::new("sales", "Sales.csv", original.clone()));
        datasets.insert(
            "empty".to_string(),
            Dataset::new("empty", "empty.csv", parse_text("a\n", b',').unwrap()),
        );

        let profiles = crate::quality::analyze_datasets(&datasets);
        let mut outcomes = BTreeMap::new();
        outcomes.insert(
            "sales".to_string(),
            FilterOutcome {
                key: "sales".to_string(),
                filename: "Sales.csv".to_string(),
                kind: DatasetKind::Generic,
                kind_source: KindSource::Fallback,
                rows_before: 4,
                rows_after: filtered.height(),
                table: filtered,
            },
        );

        let skipped = vec![SkippedFile {
            filename: "bad.csv".to_string(),
            reason: "Malformed row".to_string(),
        }];
        let generated_at = Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        QualityReport::build(generated_at, &datasets, &profiles, &outcomes, &skipped, &[])
    }

    #[test]
    fn test_json_report() {
        let report = fixture();
        let value: Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(
            value["summary"],
            json!({
                "total_datasets": 2,
                "datasets_processed": 1,
                "total_original_rows": 4,
                "total_filtered_rows": 2,
                "overall_retention_rate": 50.0
            })
        );

        let sales = &value["datasets"]["sales"];
        assert_eq!(sales["filename"], json!("Sales.csv"));
        assert_eq!(sales["kind"], json!("generic"));
        assert_eq!(sales["original_shape"], json!([4, 2]));
        assert_eq!(sales["original_columns"], json!(["price", "beds"]));
        assert_eq!(sales["original_null_counts"], json!({"price": 1, "beds": 2}));
        assert_eq!(sales["original_duplicates"], json!(1));
        assert_eq!(sales["filtered_shape"], json!([2, 2]));
        assert_eq!(sales["filtered_duplicates"], json!(1));
        assert_eq!(sales["rows_removed"], json!(2));
        assert_eq!(sales["retention_rate"], json!(50.0));

        assert_eq!(value["datasets"]["empty"]["filename"], json!("empty.csv"));
        assert!(value["datasets"]["empty"].get("filtered_shape").is_none());
        assert_eq!(value["skipped_files"][0]["filename"], json!("bad.csv"));
        assert_eq!(value["write_failures"], json!([]));
        assert!(value["analysis_date"].as_str().unwrap().starts_with("2024-05-01T12:00:00"));
    }

    #[test]
    fn test_text_report() {
        let text = fixture().render_text();

        assert!(text.starts_with("HOUSE PRICE DATA QUALITY REPORT\n"));
        assert!(text.contains("Analysis Date: 2024-05-01 12:00:00"));
        assert!(text.contains("  Overall Retention Rate: 50.0%"));
        assert!(text.contains("SALES:\n  Original Shape: 4 rows × 2 columns"));
        assert!(text.contains("  Rows Removed: 2"));
        assert!(text.contains("  Top Null Columns (original):\n    beds: 2 (50.0%)\n    price: 1 (25.0%)"));
        assert!(text.contains("EMPTY:\n  Original Shape: 0 rows × 1 columns\n  Original Duplicates: 0"));
        assert!(text.contains("SKIPPED FILES:\n  bad.csv: Malformed row"));
    }

    #[test]
    fn test_empty_report_has_zero_retention() {
        let report = QualityReport::build(
            Local::now(),
            &BTreeMap::new(),
            &BTreeMap::new(),
            &BTreeMap::new(),
            &[],
            &[],
        );
        assert_eq!(report.summary.overall_retention_rate, 0.0);
        assert!(report.render_text().contains("Overall Retention Rate: 0.0%"));
    }

    #[test]
    fn test_write_report_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let files = ReportFiles {
            json_report: "quality.json".to_string(),
            ..ReportFiles::default()
        };
        let (json_path, text_path) = fixture().write(dir.path(), &files).unwrap();

        assert!(json_path.ends_with("quality.json"));
        assert!(text_path.ends_with("data_quality_report.txt"));
        assert!(json_path.exists() && text_path.exists());
    }

    #[test]
    fn test_format_with_commas() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(999), "999");
        assert_eq!(format_with_commas(1_000), "1,000");
        assert_eq!(format_with_commas(21_613), "21,613");
        assert_eq!(format_with_commas(1_234_567), "1,234,567");
    }
}
