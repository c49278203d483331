//! Storm event pipeline with explicit stages.
//!
//! The `run` pipeline follows these stages in order:
//! 1. **Ingest**: load the details, fatalities and locations files
//! 2. **Clean**: per-source cleaning
//! 3. **Merge**: left joins on the event key
//! 4. **Final pass**: drop sparse columns, flag shared keys, fill nulls
//! 5. **Report**: consistency checks, duplicate analysis, quality report
//! 6. **Output**: write the merged table and the report
//!
//! Transformations return defects; this module is where they are logged.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, info_span, warn};

use storm_ingest::{LoadOptions, SourceKind, TableSink, TableSource, detect_source_kind};
use storm_model::{Defect, DefectLog, PipelineConfig, Table};
use storm_report::{QualityReport, ReportOptions, generate_report, profile_report, write_report};
use storm_transform::{
    FillPolicy, clean_details, clean_fatalities, clean_locations, coerce_monetary_column,
    drop_duplicate_rows, drop_empty_columns, drop_sparse_columns, fill_nulls,
    flag_duplicate_keys, merge_sources,
};

/// File name of the merged table.
pub const CLEAN_TABLE_FILE: &str = "storm_events_clean.csv";
/// File name of the quality report.
pub const QUALITY_REPORT_FILE: &str = "quality_report.txt";

/// Log each defect: `warn` when values were lost or altered, `info` otherwise.
pub fn log_defects(stage: &str, defects: &[Defect]) {
    for defect in defects {
        let column = defect.column().unwrap_or("-");
        if defect.is_warning() {
            warn!(stage, column, "{defect}");
        } else {
            info!(stage, column, "{defect}");
        }
    }
}

fn record(log: &mut DefectLog, stage: &str, defects: Vec<Defect>) {
    log_defects(stage, &defects);
    log.extend(stage, defects);
}

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Paths of the three source files.
#[derive(Debug, Clone)]
pub struct SourcePaths {
    pub details: PathBuf,
    pub fatalities: PathBuf,
    pub locations: PathBuf,
}

/// The three source tables.
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub details: Table,
    pub fatalities: Table,
    pub locations: Table,
}

/// Row and column counts of one source before and after cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSummary {
    pub name: String,
    pub rows_loaded: usize,
    pub rows_cleaned: usize,
    pub columns: usize,
    pub corrections: usize,
}

fn load_source<S: TableSource>(
    source: &S,
    kind: SourceKind,
    path: &Path,
    options: &LoadOptions,
    log: &mut DefectLog,
) -> Result<Table> {
    let ingested = source
        .load_with(path, options)
        .with_context(|| format!("load {kind} file {}", path.display()))?;
    let mut table = ingested.table;
    table.set_name(kind.label());

    let detected = detect_source_kind(&table);
    if detected != kind {
        warn!(
            path = %path.display(),
            expected = %kind,
            detected = %detected,
            "file does not look like a {kind} file"
        );
    }
    info!(
        source = %kind,
        rows = table.height(),
        columns = table.width(),
        "loaded source"
    );
    record(log, kind.label(), ingested.defects);
    Ok(table)
}

/// Load the three sources. Any load failure is fatal.
///
/// Monetary columns of the details file stay text so that suffixed amounts
/// reach the monetary parser intact.
pub fn ingest<S: TableSource>(
    source: &S,
    paths: &SourcePaths,
    config: &PipelineConfig,
    log: &mut DefectLog,
) -> Result<SourceTables> {
    let details = LoadOptions::with_text_columns(&config.monetary_columns);
    let typed = LoadOptions::default();
    Ok(SourceTables {
        details: load_source(source, SourceKind::Details, &paths.details, &details, log)?,
        fatalities: load_source(source, SourceKind::Fatalities, &paths.fatalities, &typed, log)?,
        locations: load_source(source, SourceKind::Locations, &paths.locations, &typed, log)?,
    })
}

// ============================================================================
// Stage 2: Clean
// ============================================================================

/// Clean each source in place.
pub fn clean(tables: &mut SourceTables, config: &PipelineConfig, log: &mut DefectLog) -> Result<()> {
    let defects = clean_details(&mut tables.details, config).context("clean details")?;
    record(log, "details", defects);
    record(log, "fatalities", clean_fatalities(&mut tables.fatalities, config));
    record(log, "locations", clean_locations(&mut tables.locations, config));
    Ok(())
}

// ============================================================================
// Stage 3: Merge
// ============================================================================

/// Join details with fatalities, then with locations. A missing key is fatal.
pub fn merge(tables: &SourceTables, config: &PipelineConfig, log: &mut DefectLog) -> Result<Table> {
    let outcome = merge_sources(
        &tables.details,
        &tables.fatalities,
        &tables.locations,
        &config.key_column,
    )
    .with_context(|| format!("merge sources on '{}'", config.key_column))?;
    record(log, "merge", outcome.defects);
    info!(
        rows = outcome.table.height(),
        columns = outcome.table.width(),
        "merged sources"
    );
    Ok(outcome.table)
}

// ============================================================================
// Stage 4: Final pass
// ============================================================================

/// Drop sparse merged columns, flag shared keys and fill the remaining nulls.
pub fn final_pass(table: &mut Table, config: &PipelineConfig, log: &mut DefectLog) -> Result<()> {
    let mut defects = drop_sparse_columns(table, config.final_drop_threshold);
    let flagged = flag_duplicate_keys(table, &config.key_column, &config.duplicate_flag_column)
        .context("flag shared keys")?;
    if !flagged {
        warn!(key = %config.key_column, "key column not found, shared keys not flagged");
    }
    defects.extend(fill_nulls(table, &FillPolicy::new(config.fill_token.clone())));
    record(log, "final", defects);
    Ok(())
}

// ============================================================================
// Stages 1-5 together
// ============================================================================

/// Everything a `run` produces before anything is written.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: Table,
    pub report: QualityReport,
    pub defects: DefectLog,
    pub sources: Vec<SourceSummary>,
}

fn summarize_source(table: &Table, rows_loaded: usize, log: &DefectLog) -> SourceSummary {
    SourceSummary {
        name: table.name().to_string(),
        rows_loaded,
        rows_cleaned: table.height(),
        columns: table.width(),
        corrections: log
            .entries()
            .iter()
            .filter(|entry| entry.stage == table.name())
            .count(),
    }
}

/// Run ingest, clean, merge, final pass and report. Nothing is written.
pub fn run_pipeline<S: TableSource>(
    source: &S,
    paths: &SourcePaths,
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    let mut log = DefectLog::new();

    let mut tables = info_span!("ingest").in_scope(|| ingest(source, paths, config, &mut log))?;
    let loaded = [
        tables.details.height(),
        tables.fatalities.height(),
        tables.locations.height(),
    ];

    info_span!("clean").in_scope(|| clean(&mut tables, config, &mut log))?;
    let mut table = info_span!("merge").in_scope(|| merge(&tables, config, &mut log))?;
    info_span!("final").in_scope(|| final_pass(&mut table, config, &mut log))?;

    let report = generate_report(&table, &ReportOptions::from_config(config), &log);
    if let Some(issues) = report.issue_count()
        && issues > 0
    {
        warn!(issues, "merged table has quality issues, see the report");
    }

    let sources = vec![
        summarize_source(&tables.details, loaded[0], &log),
        summarize_source(&tables.fatalities, loaded[1], &log),
        summarize_source(&tables.locations, loaded[2], &log),
    ];
    Ok(PipelineOutput {
        table,
        report,
        defects: log,
        sources,
    })
}

// ============================================================================
// Stage 6: Output
// ============================================================================

/// Paths written by [`write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub table: PathBuf,
    pub report: PathBuf,
}

/// Write the merged table and its report into `output_dir`.
pub fn write_outputs<K: TableSink>(
    sink: &K,
    output: &PipelineOutput,
    output_dir: &Path,
) -> Result<OutputPaths> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create output directory {}", output_dir.display()))?;
    let paths = OutputPaths {
        table: output_dir.join(CLEAN_TABLE_FILE),
        report: output_dir.join(QUALITY_REPORT_FILE),
    };
    sink.save(&output.table, &paths.table)
        .with_context(|| format!("write {}", paths.table.display()))?;
    write_report(&output.report, &paths.report)
        .with_context(|| format!("write {}", paths.report.display()))?;
    debug!(
        table = %paths.table.display(),
        report = %paths.report.display(),
        "wrote outputs"
    );
    Ok(paths)
}

// ============================================================================
// Single-file commands
// ============================================================================

/// A preprocessed single file and its profile.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub table: Table,
    pub kind: SourceKind,
    pub rows_loaded: usize,
    pub defects: DefectLog,
    pub report: QualityReport,
}

/// Generic preprocessing of one file.
///
/// Headers are normalized and types inferred on load; then empty columns,
/// columns above `threshold` nulls and exact duplicate rows are removed.
/// Monetary columns are parsed when the file looks like a details file.
pub fn preprocess<S: TableSource>(
    source: &S,
    path: &Path,
    threshold: f64,
    config: &PipelineConfig,
) -> Result<Preprocessed> {
    let options = LoadOptions::with_text_columns(&config.monetary_columns);
    let ingested = source
        .load_with(path, &options)
        .with_context(|| format!("load {}", path.display()))?;
    let mut log = DefectLog::new();
    record(&mut log, "ingest", ingested.defects);

    let mut table = ingested.table;
    let rows_loaded = table.height();
    let mut defects = drop_empty_columns(&mut table);
    defects.extend(drop_sparse_columns(&mut table, threshold));
    let removed = drop_duplicate_rows(&mut table);
    if removed > 0 {
        defects.push(Defect::DuplicateRowsRemoved {
            table: table.name().to_string(),
            count: removed,
        });
    }

    let kind = detect_source_kind(&table);
    info!(path = %path.display(), kind = %kind, "detected file kind");
    if kind == SourceKind::Details {
        for column in &config.monetary_columns {
            defects.extend(coerce_monetary_column(&mut table, column));
        }
    }
    record(&mut log, "preprocess", defects);

    let report = profile_report(&table);
    Ok(Preprocessed {
        table,
        kind,
        rows_loaded,
        defects: log,
        report,
    })
}

/// A loaded file and its quality report.
#[derive(Debug, Clone)]
pub struct Checked {
    pub table: Table,
    pub defects: DefectLog,
    pub report: QualityReport,
}

/// Load a cleaned file and build its quality report.
pub fn check<S: TableSource>(source: &S, path: &Path, config: &PipelineConfig) -> Result<Checked> {
    let ingested = source
        .load(path)
        .with_context(|| format!("load {}", path.display()))?;
    let mut log = DefectLog::new();
    record(&mut log, "ingest", ingested.defects);
    let report = generate_report(&ingested.table, &ReportOptions::from_config(config), &log);
    Ok(Checked {
        table: ingested.table,
        defects: log,
        report,
    })
}
