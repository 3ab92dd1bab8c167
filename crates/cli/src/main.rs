//! housefilter CLI
//!
//! Cleans a directory of house-price datasets with kind-specific filters
//! and reports on data quality before and after.

mod config;
mod progress;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use housefilter_core::{classify_directory, Pipeline, QualityProfile};
use housefilter_filters::{DatasetKind, FilterContext, KindAssignments, PolicyRegistry};
use housefilter_formats::{load_directory, load_file, Dataset};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::{AppConfig, Overrides};
use progress::ProgressReporter;

#[derive(Parser)]
#[command(name = "housefilter")]
#[command(version, about = "Filter house-price datasets and report on data quality", long_about = None)]
#[command(author = "housefilter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output results in JSON format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: load, analyze, filter, save, report
    Run {
        /// Directory holding the input datasets
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for filtered datasets and reports (created if absent)
        #[arg(short, long)]
        output: PathBuf,

        /// Config file (YAML or TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        kinds: KindArgs,

        /// Filter datasets in parallel
        #[arg(long)]
        parallel: bool,

        /// Number of threads for --parallel
        #[arg(long)]
        threads: Option<usize>,

        /// Show statistics without writing output
        #[arg(long)]
        dry_run: bool,
    },

    /// Profile the data quality of a file or directory
    Inspect {
        /// Dataset file or directory
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Config file (YAML or TOML) for input settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of null-bearing columns to show per dataset
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Show which policy each file in a directory resolves to
    Classify {
        /// Directory holding the input datasets
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Config file (YAML or TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        kinds: KindArgs,
    },

    /// List the registered dataset kinds and their rules
    Policies {
        /// Config file (YAML or TOML) with policy overrides
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
struct KindArgs {
    /// Assign a dataset kind to a file: FILE=KIND (repeatable)
    #[arg(long = "kind", value_name = "FILE=KIND", value_parser = parse_kind_assignment)]
    kinds: Vec<(String, DatasetKind)>,

    /// Guess kinds from file names for files without an assignment
    #[arg(long)]
    infer_kinds: bool,
}

fn parse_kind_assignment(raw: &str) -> std::result::Result<(String, DatasetKind), String> {
    KindAssignments::parse_assignment(raw).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_ansi(!cli.json) // Disable colors if JSON output
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run {
            input,
            output,
            config,
            kinds,
            parallel,
            threads,
            dry_run,
        } => {
            let overrides = Overrides {
                kinds: kinds.kinds,
                infer_kinds: kinds.infer_kinds,
                parallel,
                num_threads: threads,
            };
            run_pipeline(&input, &output, config.as_deref(), overrides, dry_run, cli.json)?;
        }
        Commands::Inspect { path, config, limit } => {
            inspect(&path, config.as_deref(), limit, cli.json)?;
        }
        Commands::Classify { dir, config, kinds } => {
            let overrides = Overrides {
                kinds: kinds.kinds,
                infer_kinds: kinds.infer_kinds,
                ..Overrides::default()
            };
            classify(&dir, config.as_deref(), overrides, cli.json)?;
        }
        Commands::Policies { config } => {
            list_policies(config.as_deref(), cli.json)?;
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

fn run_pipeline(
    input: &Path,
    output: &Path,
    config_path: Option<&Path>,
    overrides: Overrides,
    dry_run: bool,
    json_output: bool,
) -> Result<()> {
    info!("Running filter pipeline");
    info!("  Input: {:?}", input);
    info!("  Output: {:?}", output);
    if let Some(path) = config_path {
        info!("  Config: {:?}", path);
    }

    let config = AppConfig::load_or_default(config_path)?.apply(overrides)?;
    let registry = PolicyRegistry::from_settings(&config.policies);
    let pipeline = Pipeline::new(config.pipeline_options(dry_run), registry);

    let reporter = if json_output {
        ProgressReporter::hidden()
    } else {
        ProgressReporter::new()
    };
    let run = pipeline
        .run(input, output, &reporter)
        .with_context(|| format!("Pipeline failed for input {}", input.display()))?;

    if json_output {
        let stats = &run.stats;
        let report = serde_json::json!({
            "input": input.to_string_lossy().to_string(),
            "output": if dry_run { serde_json::Value::Null } else { serde_json::Value::String(output.to_string_lossy().to_string()) },
            "datasets_loaded": stats.datasets_loaded,
            "datasets_filtered": stats.datasets_filtered,
            "files_skipped": stats.files_skipped,
            "original_rows": stats.original_rows,
            "filtered_rows": stats.filtered_rows,
            "retention_rate": stats.retention_rate(),
            "files_written": stats.files_written,
            "write_failures": stats.write_failures,
            "dry_run": dry_run,
            "report": run.report,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        progress::print_summary_report(input, if dry_run { None } else { Some(output) }, &run);
    }

    Ok(())
}

fn inspect(path: &Path, config_path: Option<&Path>, limit: usize, json_output: bool) -> Result<()> {
    info!("Inspecting {:?}", path);

    let config = AppConfig::load_or_default(config_path)?;
    let datasets: BTreeMap<String, Dataset> = if path.is_dir() {
        load_directory(path, &config.input)?.datasets
    } else {
        let dataset = load_file(path, &config.input)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        BTreeMap::from([(dataset.key.clone(), dataset)])
    };

    let profiles: BTreeMap<&str, QualityProfile> = datasets
        .iter()
        .map(|(key, dataset)| (key.as_str(), QualityProfile::analyze(&dataset.table)))
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    for (key, profile) in &profiles {
        let dataset = &datasets[*key];
        println!("{} ({})", key, dataset.filename);
        println!("  Shape:       {} rows × {} columns", profile.rows, profile.columns);
        println!("  Duplicates:  {}", profile.duplicate_rows);
        println!("  Memory:      {:.2} MB", profile.memory_mb);
        println!("  Columns:");
        for name in &profile.column_names {
            println!("    {:<30} {}", name, profile.column_types[name]);
        }
        let nulls = profile.top_null_columns(limit);
        if nulls.is_empty() {
            println!("  No missing values");
        } else {
            println!("  Null columns:");
            for col in nulls {
                println!("    {:<30} {} ({:.1}%)", col.column, col.count, col.percentage);
            }
        }
        println!();
    }

    Ok(())
}

fn classify(dir: &Path, config_path: Option<&Path>, overrides: Overrides, json_output: bool) -> Result<()> {
    let config = AppConfig::load_or_default(config_path)?.apply(overrides)?;
    let resolutions = classify_directory(dir, &config.input, &config.datasets)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&resolutions)?);
        return Ok(());
    }

    for resolution in &resolutions {
        println!(
            "{:<32} {:<15} ({})",
            resolution.filename,
            resolution.kind.to_string(),
            resolution.source
        );
    }
    if resolutions.is_empty() {
        println!("No tabular files found in {}", dir.display());
    }

    Ok(())
}

fn list_policies(config_path: Option<&Path>, json_output: bool) -> Result<()> {
    let config = AppConfig::load_or_default(config_path)?;
    let registry = PolicyRegistry::from_settings(&config.policies);
    let ctx = FilterContext::default();

    if json_output {
        let policies: Vec<_> = registry
            .kinds()
            .map(|kind| {
                serde_json::json!({
                    "kind": kind,
                    "description": kind.description(),
                    "rules": registry.policy_for(kind).describe(&ctx),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&policies)?);
        return Ok(());
    }

    for kind in registry.kinds() {
        println!("{} - {}", kind, kind.description());
        for rule in registry.policy_for(kind).describe(&ctx) {
            println!("    {}", rule);
        }
    }

    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_kinds() {
        let cli = Cli::try_parse_from([
            "housefilter",
            "run",
            "-i",
            "data",
            "-o",
            "out",
            "--kind",
            "Housing.csv=county-sales",
            "--kind",
            "Real_Year.csv=index-by-year",
            "--infer-kinds",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Run { kinds, dry_run, .. } => {
                assert!(dry_run);
                assert!(kinds.infer_kinds);
                assert_eq!(
                    kinds.kinds,
                    vec![
                        ("Housing.csv".to_string(), DatasetKind::CountySales),
                        ("Real_Year.csv".to_string(), DatasetKind::IndexByYear),
                    ]
                );
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_bad_kind_is_rejected() {
        let result = Cli::try_parse_from(["housefilter", "classify", "data", "--kind", "Housing.csv=sales"]);
        assert!(result.is_err());
    }
}
