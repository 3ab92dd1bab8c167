//! Load → analyze → filter → save → report pipeline
//!
//! Each stage is a plain function returning an owned value; [`Pipeline::run`]
//! threads them together and merges the results into a [`QualityReport`].
//! The filter stage can run datasets concurrently with Rayon.

use crate::quality::{analyze_datasets, percentage, QualityProfile};
use crate::report::{QualityReport, ReportFiles};
use crate::{Error, Result};
use chrono::Local;
use housefilter_filters::{DatasetKind, FilterContext, KindAssignments, KindSource, PolicyRegistry};
use housefilter_formats::csv_writer::write_table_file;
use housefilter_formats::{
    dataset_key, list_tabular_files, load_directory, Dataset, LoadOutcome, LoaderConfig,
    SkippedFile, Table,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Analyze,
    Filter,
    Save,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Load => "load",
            Stage::Analyze => "analyze",
            Stage::Filter => "filter",
            Stage::Save => "save",
            Stage::Report => "report",
        })
    }
}

/// Receives progress notifications. All methods default to no-ops.
pub trait PipelineObserver: Send + Sync {
    fn stage_started(&self, _stage: Stage, _items: usize) {}
    fn item_finished(&self, _stage: Stage, _name: &str) {}
    fn stage_finished(&self, _stage: Stage) {}
}

/// Observer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Result of filtering one dataset
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub key: String,
    pub filename: String,
    pub kind: DatasetKind,
    pub kind_source: KindSource,
    pub table: Table,
    pub rows_before: usize,
    pub rows_after: usize,
}

impl FilterOutcome {
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    pub fn removal_rate(&self) -> f64 {
        percentage(self.rows_removed(), self.rows_before)
    }

    pub fn retention_rate(&self) -> f64 {
        percentage(self.rows_after, self.rows_before)
    }
}

/// A filtered dataset that could not be written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteFailure {
    pub filename: String,
    pub reason: String,
}

/// Result of the save stage
#[derive(Debug, Clone, Default)]
pub struct SaveOutcome {
    pub written: Vec<PathBuf>,
    pub failures: Vec<WriteFailure>,
}

/// Which policy a file resolves to, and why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindResolution {
    pub filename: String,
    pub key: String,
    pub kind: DatasetKind,
    pub source: KindSource,
}

/// Pipeline statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStats {
    pub datasets_loaded: usize,
    pub datasets_filtered: usize,
    pub files_skipped: usize,
    pub original_rows: usize,
    pub filtered_rows: usize,
    pub files_written: usize,
    pub write_failures: usize,
}

impl PipelineStats {
    pub fn rows_removed(&self) -> usize {
        self.original_rows.saturating_sub(self.filtered_rows)
    }

    pub fn removal_rate(&self) -> f64 {
        percentage(self.rows_removed(), self.original_rows)
    }

    pub fn retention_rate(&self) -> f64 {
        percentage(self.filtered_rows, self.original_rows)
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub loader: LoaderConfig,
    pub kinds: KindAssignments,
    /// Filter datasets concurrently
    pub parallel: bool,
    /// Number of threads (None = auto-detect)
    pub num_threads: Option<usize>,
    /// Run every stage but write nothing
    pub dry_run: bool,
    pub report_files: ReportFiles,
}

/// Everything a run produced
#[derive(Debug)]
pub struct PipelineRun {
    pub profiles: BTreeMap<String, QualityProfile>,
    pub filtered: BTreeMap<String, FilterOutcome>,
    pub skipped: Vec<SkippedFile>,
    pub saved: SaveOutcome,
    pub report: QualityReport,
    /// JSON and text report paths, unless this was a dry run
    pub report_paths: Option<(PathBuf, PathBuf)>,
    pub stats: PipelineStats,
}

/// Resolve the kind of one file.
pub fn resolve_kind(kinds: &KindAssignments, filename: &str, key: &str) -> KindResolution {
    let (kind, source) = kinds.resolve(filename, key);
    KindResolution {
        filename: filename.to_string(),
        key: key.to_string(),
        kind,
        source,
    }
}

/// Resolve the kind of every tabular file in `dir` without loading it.
pub fn classify_directory(
    dir: &Path,
    loader: &LoaderConfig,
    kinds: &KindAssignments,
) -> Result<Vec<KindResolution>> {
    let paths = list_tabular_files(dir, loader)?;
    Ok(paths
        .iter()
        .filter_map(|path| path.file_name().and_then(|n| n.to_str()))
        .map(|filename| resolve_kind(kinds, filename, &dataset_key(filename)))
        .collect())
}

/// Apply the policy for one dataset's kind.
pub fn filter_dataset(
    dataset: &Dataset,
    registry: &PolicyRegistry,
    kinds: &KindAssignments,
    ctx: &FilterContext,
) -> FilterOutcome {
    let resolution = resolve_kind(kinds, &dataset.filename, &dataset.key);
    match resolution.source {
        KindSource::Fallback => warn!(
            "No kind assigned to {}; applying the generic policy",
            dataset.filename
        ),
        source => info!(
            "Filtering {} as {} ({})",
            dataset.filename, resolution.kind, source
        ),
    }

    let policy = registry.policy_for(resolution.kind);
    let table = policy.apply(&dataset.table, ctx);

    let outcome = FilterOutcome {
        key: dataset.key.clone(),
        filename: dataset.filename.clone(),
        kind: policy.kind(),
        kind_source: resolution.source,
        rows_before: dataset.table.height(),
        rows_after: table.height(),
        table,
    };
    info!(
        "{}: removed {} rows ({:.1}%), {} remain",
        outcome.key,
        outcome.rows_removed(),
        outcome.removal_rate(),
        outcome.rows_after
    );
    outcome
}

/// Filter every dataset, sequentially or on a Rayon pool.
pub fn filter_datasets(
    datasets: &BTreeMap<String, Dataset>,
    registry: &PolicyRegistry,
    kinds: &KindAssignments,
    ctx: &FilterContext,
    options: &PipelineOptions,
    observer: &dyn PipelineObserver,
) -> Result<BTreeMap<String, FilterOutcome>> {
    observer.stage_started(Stage::Filter, datasets.len());

    let run_one = |dataset: &Dataset| {
        let outcome = filter_dataset(dataset, registry, kinds, ctx);
        observer.item_finished(Stage::Filter, &outcome.key);
        (outcome.key.clone(), outcome)
    };

    let outcomes: BTreeMap<String, FilterOutcome> = if options.parallel {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(num_threads) = options.num_threads {
            builder = builder.num_threads(num_threads);
        }
        let pool = builder
            .build()
            .map_err(|e| Error::InvalidConfig(format!("thread pool: {}", e)))?;
        info!("Filtering {} datasets on {} threads", datasets.len(), pool.current_num_threads());
        pool.install(|| datasets.par_iter().map(|(_, d)| run_one(d)).collect())
    } else {
        datasets.values().map(run_one).collect()
    };

    observer.stage_finished(Stage::Filter);
    Ok(outcomes)
}

/// Write every filtered table to `output_dir` under its original file name.
///
/// A failed write is logged and recorded; the remaining files are still written.
pub fn save_filtered(
    outcomes: &BTreeMap<String, FilterOutcome>,
    output_dir: &Path,
    observer: &dyn PipelineObserver,
) -> SaveOutcome {
    observer.stage_started(Stage::Save, outcomes.len());
    let mut saved = SaveOutcome::default();

    for outcome in outcomes.values() {
        let path = output_dir.join(&outcome.filename);
        match write_table_file(&outcome.table, &path) {
            Ok(()) => {
                info!("Saved {} ({} rows)", outcome.filename, outcome.rows_after);
                saved.written.push(path);
            }
            Err(e) => {
                error!("Error saving {}: {}", outcome.filename, e);
                saved.failures.push(WriteFailure {
                    filename: outcome.filename.clone(),
                    reason: e.to_string(),
                });
            }
        }
        observer.item_finished(Stage::Save, &outcome.key);
    }

    observer.stage_finished(Stage::Save);
    saved
}

/// The dataset filter pipeline
#[derive(Debug)]
pub struct Pipeline {
    options: PipelineOptions,
    registry: PolicyRegistry,
    ctx: FilterContext,
}

impl Pipeline {
    pub fn new(options: PipelineOptions, registry: PolicyRegistry) -> Self {
        Self {
            options,
            registry,
            ctx: FilterContext::default(),
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    pub fn context(&self) -> &FilterContext {
        &self.ctx
    }

    pub fn load(&self, input_dir: &Path) -> Result<LoadOutcome> {
        Ok(load_directory(input_dir, &self.options.loader)?)
    }

    /// Run every stage over `input_dir`, writing into `output_dir`.
    pub fn run(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        observer: &dyn PipelineObserver,
    ) -> Result<PipelineRun> {
        info!("Starting house price data filtering pipeline");

        observer.stage_started(Stage::Load, 0);
        let loaded = self.load(input_dir)?;
        observer.stage_finished(Stage::Load);

        observer.stage_started(Stage::Analyze, loaded.datasets.len());
        let profiles = analyze_datasets(&loaded.datasets);
        observer.stage_finished(Stage::Analyze);

        let filtered = filter_datasets(
            &loaded.datasets,
            &self.registry,
            &self.options.kinds,
            &self.ctx,
            &self.options,
            observer,
        )?;

        let mut saved = if self.options.dry_run {
            info!("Dry run: skipping writes to {:?}", output_dir);
            SaveOutcome::default()
        } else {
            // Each file still records its own failure if this does not succeed.
            if let Err(e) = fs::create_dir_all(output_dir) {
                error!("Cannot create output directory {:?}: {}", output_dir, e);
            }
            save_filtered(&filtered, output_dir, observer)
        };

        observer.stage_started(Stage::Report, 1);
        let report = QualityReport::build(
            Local::now(),
            &loaded.datasets,
            &profiles,
            &filtered,
            &loaded.skipped,
            &saved.failures,
        );
        let report_paths = if self.options.dry_run {
            None
        } else {
            match report.write(output_dir, &self.options.report_files) {
                Ok(paths) => Some(paths),
                Err(e) => {
                    error!("Error writing quality report: {}", e);
                    saved.failures.push(WriteFailure {
                        filename: format!(
                            "{}, {}",
                            self.options.report_files.json_report, self.options.report_files.text_report
                        ),
                        reason: e.to_string(),
                    });
                    None
                }
            }
        };
        observer.stage_finished(Stage::Report);

        let stats = PipelineStats {
            datasets_loaded: loaded.datasets.len(),
            datasets_filtered: filtered.len(),
            files_skipped: loaded.skipped.len(),
            original_rows: report.summary.total_original_rows,
            filtered_rows: report.summary.total_filtered_rows,
            files_written: saved.written.len(),
            write_failures: saved.failures.len(),
        };
        info!(
            "Pipeline finished: {} -> {} rows ({:.1}% retained)",
            stats.original_rows,
            stats.filtered_rows,
            stats.retention_rate()
        );

        Ok(PipelineRun {
            profiles,
            filtered,
            skipped: loaded.skipped,
            saved,
            report,
            report_paths,
            stats,
        })
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    options: PipelineOptions,
    registry: Option<PolicyRegistry>,
    ctx: Option<FilterContext>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            options: PipelineOptions::default(),
            registry: None,
            ctx: None,
        }
    }

    pub fn options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn loader(mut self, loader: LoaderConfig) -> Self {
        self.options.loader = loader;
        self
    }

    pub fn kinds(mut self, kinds: KindAssignments) -> Self {
        self.options.kinds = kinds;
        self
    }

    pub fn assign(mut self, filename: impl Into<String>, kind: DatasetKind) -> Self {
        self.options.kinds.kinds.insert(filename.into(), kind);
        self
    }

    pub fn infer_kinds(mut self, infer: bool) -> Self {
        self.options.kinds.infer_kinds = infer;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.options.parallel = parallel;
        self
    }

    pub fn num_threads(mut self, threads: usize) -> Self {
        self.options.num_threads = Some(threads);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.options.dry_run = dry_run;
        self
    }

    pub fn report_files(mut self, files: ReportFiles) -> Self {
        self.options.report_files = files;
        self
    }

    pub fn registry(mut self, registry: PolicyRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Fix the filter context, e.g. the current year under test.
    pub fn context(mut self, ctx: FilterContext) -> Self {
        self.ctx = Some(ctx);
        self
    }

    pub fn build(self) -> Pipeline {
        let mut pipeline = Pipeline::new(self.options, self.registry.unwrap_or_default());
        if let Some(ctx) = self.ctx {
            pipeline.ctx = ctx;
        }
        pipeline
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
