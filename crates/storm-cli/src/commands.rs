use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, info_span};

use storm_cli::pipeline::{
    QUALITY_REPORT_FILE, SourcePaths, check, preprocess, run_pipeline, write_outputs,
};
use storm_ingest::{CsvStore, TableSink};
use storm_model::PipelineConfig;
use storm_report::write_report;

use crate::cli::{CheckArgs, PreprocessArgs, RunArgs};
use crate::types::{CheckResult, PreprocessResult, RunResult};

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("load config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

/// Directory holding `path`, or the working directory for a bare file name.
fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().into_owned())
}

pub fn run_clean(args: &RunArgs) -> Result<RunResult> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(key) = &args.key {
        config = config.with_key_column(key.clone());
    }
    if let Some(threshold) = args.source_threshold {
        config = config.with_source_drop_threshold(threshold);
    }
    if let Some(threshold) = args.final_threshold {
        config = config.with_final_drop_threshold(threshold);
    }

    let span = info_span!("run", key = %config.key_column);
    let _guard = span.enter();

    let paths = SourcePaths {
        details: args.details.clone(),
        fatalities: args.fatalities.clone(),
        locations: args.locations.clone(),
    };
    let store = CsvStore::new();
    let output = run_pipeline(&store, &paths, &config)?;

    let outputs = if args.dry_run {
        info!("dry run, no files written");
        None
    } else {
        let output_dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| parent_dir(&args.details));
        Some(write_outputs(&store, &output, &output_dir)?)
    };

    Ok(RunResult {
        merged_rows: output.table.height(),
        merged_columns: output.table.width(),
        issues: output.report.issue_count().unwrap_or(0),
        sources: output.sources,
        defects: output.defects,
        outputs,
    })
}

pub fn run_preprocess(args: &PreprocessArgs) -> Result<PreprocessResult> {
    let config = load_config(args.config.as_deref())?;
    let span = info_span!("preprocess", file = %args.file.display());
    let _guard = span.enter();

    let store = CsvStore::new();
    let preprocessed = preprocess(&store, &args.file, args.threshold, &config)?;

    let dir = parent_dir(&args.file);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| dir.join(format!("{}_preprocessed.csv", file_stem(&args.file))));
    let report = args
        .report
        .clone()
        .unwrap_or_else(|| dir.join("validation_report.txt"));

    store
        .save(&preprocessed.table, &output)
        .with_context(|| format!("write {}", output.display()))?;
    write_report(&preprocessed.report, &report)
        .with_context(|| format!("write {}", report.display()))?;
    info!(output = %output.display(), report = %report.display(), "preprocessing complete");

    Ok(PreprocessResult {
        input: args.file.clone(),
        kind: preprocessed.kind,
        rows_loaded: preprocessed.rows_loaded,
        rows: preprocessed.table.height(),
        columns: preprocessed.table.width(),
        defects: preprocessed.defects,
        output,
        report,
    })
}

pub fn run_check(args: &CheckArgs) -> Result<CheckResult> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(key) = &args.key {
        config = config.with_key_column(key.clone());
    }
    let span = info_span!("check", file = %args.file.display());
    let _guard = span.enter();

    let checked = check(&CsvStore::new(), &args.file, &config)?;
    let report = args
        .report
        .clone()
        .unwrap_or_else(|| parent_dir(&args.file).join(QUALITY_REPORT_FILE));
    write_report(&checked.report, &report)
        .with_context(|| format!("write {}", report.display()))?;

    Ok(CheckResult {
        input: args.file.clone(),
        rows: checked.table.height(),
        columns: checked.table.width(),
        issues: checked.report.issue_count().unwrap_or(0),
        report,
    })
}
