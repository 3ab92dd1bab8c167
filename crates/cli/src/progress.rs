//! Progress reporting and summaries for the CLI

use std::path::Path;
use std::sync::Mutex;

use housefilter_core::report::format_with_commas;
use housefilter_core::{PipelineObserver, PipelineRun, Stage};
use indicatif::{ProgressBar, ProgressStyle};

/// Shows one progress bar per counted pipeline stage
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
    hidden: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            hidden: false,
        }
    }

    /// A reporter that draws nothing, for machine-readable output
    pub fn hidden() -> Self {
        Self {
            bar: Mutex::new(None),
            hidden: true,
        }
    }

    fn stage_bar(&self, stage: Stage, items: usize) -> ProgressBar {
        if self.hidden {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(items as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {prefix:>8} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("█▓▒░-"));
        }
        bar.set_prefix(stage_label(stage));
        bar
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Load => "Loading",
        Stage::Analyze => "Analyzing",
        Stage::Filter => "Filtering",
        Stage::Save => "Saving",
        Stage::Report => "Reporting",
    }
}

impl PipelineObserver for ProgressReporter {
    fn stage_started(&self, stage: Stage, items: usize) {
        // Only the per-dataset stages get a bar.
        if !matches!(stage, Stage::Filter | Stage::Save) {
            return;
        }
        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(self.stage_bar(stage, items));
        }
    }

    fn item_finished(&self, _stage: Stage, name: &str) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(bar) = slot.as_ref() {
                bar.set_message(name.to_string());
                bar.inc(1);
            }
        }
    }

    fn stage_finished(&self, _stage: Stage) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_with_message("done");
            }
        }
    }
}

/// Print a formatted summary report
pub fn print_summary_report(input: &Path, output: Option<&Path>, run: &PipelineRun) {
    let stats = &run.stats;

    println!("\n{}", "═".repeat(60));
    println!("House Price Data Filtering Complete");
    println!("{}", "═".repeat(60));
    println!("Input:              {}", input.display());

    if let Some(output_path) = output {
        println!("Output:             {}", output_path.display());
    } else {
        println!("Output:             (dry run - no output written)");
    }

    println!(
        "Datasets:           {} loaded, {} filtered",
        stats.datasets_loaded, stats.datasets_filtered
    );
    if stats.files_skipped > 0 {
        println!("Skipped files:      {}", stats.files_skipped);
    }
    println!("Original rows:      {}", format_with_commas(stats.original_rows));
    println!(
        "Rows removed:       {} ({:.1}%)",
        format_with_commas(stats.rows_removed()),
        stats.removal_rate()
    );
    println!(
        "Filtered rows:      {} ({:.1}%)",
        format_with_commas(stats.filtered_rows),
        stats.retention_rate()
    );
    if stats.write_failures > 0 {
        println!("Write failures:     {}", stats.write_failures);
    }

    println!("{}", "─".repeat(60));
    for outcome in run.filtered.values() {
        println!(
            "  {:<28} {:<15} {:>8} -> {:>8} ({:.1}%)",
            outcome.filename,
            outcome.kind.to_string(),
            format_with_commas(outcome.rows_before),
            format_with_commas(outcome.rows_after),
            outcome.retention_rate()
        );
    }

    if let Some((json, text)) = &run.report_paths {
        println!("{}", "─".repeat(60));
        println!("Reports:            {}", json.display());
        println!("                    {}", text.display());
    }

    println!("{}", "═".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_reporter_counts_nothing_visible() {
        let reporter = ProgressReporter::hidden();
        reporter.stage_started(Stage::Filter, 2);
        reporter.item_finished(Stage::Filter, "housing");
        assert!(reporter.bar.lock().unwrap().as_ref().unwrap().is_hidden());
        reporter.stage_finished(Stage::Filter);
        assert!(reporter.bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_untracked_stages_have_no_bar() {
        let reporter = ProgressReporter::hidden();
        reporter.stage_started(Stage::Load, 0);
        assert!(reporter.bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(stage_label(Stage::Filter), "Filtering");
        assert_eq!(stage_label(Stage::Save), "Saving");
    }
}
