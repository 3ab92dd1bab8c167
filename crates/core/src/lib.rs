//! Data quality analysis and the dataset filter pipeline
//!
//! This crate profiles loaded datasets, runs them through the kind-specific
//! filter policies and produces the before/after quality report.

pub mod error;
pub mod memory;
pub mod pipeline;
pub mod quality;
pub mod report;

pub use error::{Error, Result};
pub use pipeline::{
    classify_directory, FilterOutcome, KindResolution, NoopObserver, Pipeline, PipelineBuilder,
    PipelineObserver, PipelineOptions, PipelineRun, PipelineStats, SaveOutcome, Stage,
    WriteFailure,
};
pub use quality::{analyze_datasets, QualityProfile};
pub use report::{QualityReport, ReportFiles};
