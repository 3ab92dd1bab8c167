use housefilter_core::{NoopObserver, PipelineBuilder};
use housefilter_filters::{DatasetKind, FilterContext, KindSource};
use housefilter_formats::{load_file, LoaderConfig};
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

fn write_inputs(dir: &std::path::Path) {
    fs::write(
        dir.join("kc_house_prices.csv"),
        "price,bedrooms,bathrooms,lat,long,yr_built,grade\n\
         5000000,3,2,47.5,-122.0,2005,7\n\
         5000000,3,2,90,-122.0,2005,7\n\
         ,3,2,47.5,-122.0,2005,7\n",
    )
    .unwrap();
    fs::write(
        dir.join("Real_Year.csv"),
        "date,price\n2001-01-01,3.5\nnot a date,1.0\n2002,250\n",
    )
    .unwrap();
    fs::write(dir.join("price_index.csv"), "index\n5\n50\n2000\n").unwrap();
    fs::write(dir.join("misc.csv"), "a,b\n1,x\n1,x\n,\n").unwrap();
    fs::write(dir.join("broken.csv"), "a,b\n1,2,3\n").unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();
}

#[test]
fn test_full_run_with_explicit_kinds() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_inputs(input.path());

    let pipeline = PipelineBuilder::new()
        .assign("kc_house_prices.csv", DatasetKind::CountySales)
        .assign("real_year", DatasetKind::IndexByYear)
        .assign("price_index.csv", DatasetKind::NumericIndex)
        .context(FilterContext::for_year(2024))
        .build();

    let run = pipeline.run(input.path(), output.path(), &NoopObserver).unwrap();

    assert_eq!(run.stats.datasets_loaded, 4);
    assert_eq!(run.stats.files_skipped, 1);
    assert_eq!(run.stats.original_rows, 3 + 3 + 3 + 3);
    assert_eq!(run.stats.filtered_rows, 1 + 1 + 1 + 1);
    assert_eq!(run.stats.files_written, 4);

    assert_eq!(run.filtered["kc_house_prices"].kind, DatasetKind::CountySales);
    assert_eq!(run.filtered["misc"].kind_source, KindSource::Fallback);

    // Filtered files keep the original names and columns.
    let saved = load_file(output.path().join("kc_house_prices.csv"), &LoaderConfig::default()).unwrap();
    assert_eq!(saved.table.height(), 1);
    assert_eq!(saved.table.width(), 7);

    let dates = fs::read_to_string(output.path().join("Real_Year.csv")).unwrap();
    assert_eq!(dates, "date,price\n2001-01-01,3.5\n");

    let report: Value =
        serde_json::from_str(&fs::read_to_string(output.path().join("data_quality_report.json")).unwrap())
            .unwrap();
    assert_eq!(report["summary"]["total_datasets"], json!(4));
    assert_eq!(report["datasets"]["price_index"]["filtered_shape"], json!([1, 1]));
    assert_eq!(report["datasets"]["real_year"]["kind"], json!("index-by-year"));
    assert_eq!(report["skipped_files"][0]["filename"], json!("broken.csv"));

    let text = fs::read_to_string(output.path().join("data_quality_report.txt")).unwrap();
    assert!(text.contains("KC_HOUSE_PRICES:"));
}

#[test]
fn test_inferred_kinds_match_explicit() {
    let input = TempDir::new().unwrap();
    write_inputs(input.path());

    let explicit = PipelineBuilder::new()
        .assign("kc_house_prices.csv", DatasetKind::CountySales)
        .assign("Real_Year.csv", DatasetKind::IndexByYear)
        .assign("price_index.csv", DatasetKind::NumericIndex)
        .context(FilterContext::for_year(2024))
        .dry_run(true)
        .build()
        .run(input.path(), input.path(), &NoopObserver)
        .unwrap();

    let inferred = PipelineBuilder::new()
        .infer_kinds(true)
        .context(FilterContext::for_year(2024))
        .dry_run(true)
        .build()
        .run(input.path(), input.path(), &NoopObserver)
        .unwrap();

    for (key, outcome) in &explicit.filtered {
        assert_eq!(outcome.kind, inferred.filtered[key].kind, "{}", key);
        assert_eq!(outcome.table, inferred.filtered[key].table, "{}", key);
    }
    assert_eq!(inferred.filtered["real_year"].kind_source, KindSource::Inferred);
}

#[test]
fn test_dry_run_writes_nothing() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_inputs(input.path());
    let target = output.path().join("out");

    let run = PipelineBuilder::new()
        .dry_run(true)
        .build()
        .run(input.path(), &target, &NoopObserver)
        .unwrap();

    assert!(!target.exists());
    assert!(run.report_paths.is_none());
    assert!(run.saved.written.is_empty());
    assert_eq!(run.report.summary.datasets_processed, 4);
}

#[test]
fn test_parallel_run_matches_sequential() {
    let input = TempDir::new().unwrap();
    write_inputs(input.path());

    let build = |parallel: bool| {
        PipelineBuilder::new()
            .infer_kinds(true)
            .parallel(parallel)
            .context(FilterContext::for_year(2024))
            .dry_run(true)
            .build()
            .run(input.path(), input.path(), &NoopObserver)
            .unwrap()
    };

    let sequential = build(false);
    let parallel = build(true);
    assert_eq!(sequential.stats, parallel.stats);
    for (key, outcome) in &sequential.filtered {
        assert_eq!(outcome.table, parallel.filtered[key].table);
    }
}

#[test]
fn test_missing_input_directory_is_fatal() {
    let output = TempDir::new().unwrap();
    let result = PipelineBuilder::new()
        .build()
        .run(&output.path().join("missing"), output.path(), &NoopObserver);
    assert!(result.is_err());
}

#[test]
fn test_unwritable_output_is_recorded_not_fatal() {
    let input = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    write_inputs(input.path());
    // A plain file where the output directory should be.
    let output = scratch.path().join("out");
    fs::write(&output, "not a directory").unwrap();

    let run = PipelineBuilder::new()
        .build()
        .run(input.path(), &output, &NoopObserver)
        .unwrap();

    assert!(run.saved.written.is_empty());
    assert_eq!(run.saved.failures.len(), 4 + 1);
    assert!(run.saved.failures.last().unwrap().filename.contains("data_quality_report.json"));
    assert!(run.report_paths.is_none());
    assert_eq!(run.stats.write_failures, 5);
}
