//! CLI argument definitions for storm-clean.

use std::path::PathBuf;

use clap::{ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;
use storm_cli::logging::{LogFlags, LogFormat};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "storm-clean",
    version,
    about = "Clean, merge and check NOAA storm event files",
    long_about = "Clean the storm event details, fatalities and locations files,\n\
                  merge them on the event key and write the merged table together\n\
                  with a plain-text quality report."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// The logging flags, ready for [`storm_cli::logging::LogConfig::from_flags`].
    pub fn log_flags(&self) -> LogFlags {
        LogFlags {
            verbosity: self.verbosity.tracing_level_filter(),
            verbosity_given: self.verbosity.is_present(),
            log_level: self.log_level.map(LevelFilter::from),
            format: self.log_format.into(),
            log_file: self.log_file.clone(),
            color: match self.color.color {
                ColorChoice::Always => Some(true),
                ColorChoice::Never => Some(false),
                ColorChoice::Auto => None,
            },
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Clean and merge the three source files, then write the merged table and report.
    Run(RunArgs),

    /// Preprocess a single file: headers, empty and sparse columns, duplicate rows.
    Preprocess(PreprocessArgs),

    /// Write the quality report for an already cleaned file.
    Check(CheckArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Event details CSV.
    #[arg(long = "details", value_name = "PATH")]
    pub details: PathBuf,

    /// Fatalities CSV.
    #[arg(long = "fatalities", value_name = "PATH")]
    pub fatalities: PathBuf,

    /// Locations CSV.
    #[arg(long = "locations", value_name = "PATH")]
    pub locations: PathBuf,

    /// Output directory (default: the directory of the details file).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// JSON pipeline configuration; flags below override its values.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Event key column.
    #[arg(long = "key", value_name = "COLUMN")]
    pub key: Option<String>,

    /// Null fraction above which a details column is dropped before the merge.
    #[arg(long = "source-threshold", value_name = "FRACTION", value_parser = parse_threshold)]
    pub source_threshold: Option<f64>,

    /// Null fraction above which a merged column is dropped.
    #[arg(long = "final-threshold", value_name = "FRACTION", value_parser = parse_threshold)]
    pub final_threshold: Option<f64>,

    /// Clean, merge and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct PreprocessArgs {
    /// CSV file to preprocess.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Preprocessed CSV (default: <FILE stem>_preprocessed.csv next to FILE).
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Profile report (default: validation_report.txt next to FILE).
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Null fraction above which a column is dropped.
    #[arg(
        long = "threshold",
        value_name = "FRACTION",
        default_value = "0.9",
        value_parser = parse_threshold
    )]
    pub threshold: f64,

    /// JSON pipeline configuration (monetary columns).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Cleaned CSV file to check.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Quality report (default: quality_report.txt next to FILE).
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// JSON pipeline configuration; --key overrides its key column.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Event key column.
    #[arg(long = "key", value_name = "COLUMN")]
    pub key: Option<String>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => Self::ERROR,
            LogLevelArg::Warn => Self::WARN,
            LogLevelArg::Info => Self::INFO,
            LogLevelArg::Debug => Self::DEBUG,
            LogLevelArg::Trace => Self::TRACE,
        }
    }
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}

fn parse_threshold(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside 0..=1"))
    }
}
