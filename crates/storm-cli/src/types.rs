use std::path::PathBuf;

use storm_cli::pipeline::{OutputPaths, SourceSummary};
use storm_ingest::SourceKind;
use storm_model::DefectLog;

#[derive(Debug)]
pub struct RunResult {
    pub sources: Vec<SourceSummary>,
    pub merged_rows: usize,
    pub merged_columns: usize,
    pub defects: DefectLog,
    pub issues: usize,
    /// `None` on a dry run.
    pub outputs: Option<OutputPaths>,
}

#[derive(Debug)]
pub struct PreprocessResult {
    pub input: PathBuf,
    pub kind: SourceKind,
    pub rows_loaded: usize,
    pub rows: usize,
    pub columns: usize,
    pub defects: DefectLog,
    pub output: PathBuf,
    pub report: PathBuf,
}

#[derive(Debug)]
pub struct CheckResult {
    pub input: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub issues: usize,
    pub report: PathBuf,
}
