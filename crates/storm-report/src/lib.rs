//! Text reports for storm event tables.
//!
//! - **Quality report**: summary, nulls, duplicate keys, out-of-range values,
//!   statistics, the cleaning log and a verdict
//! - **Profile report**: summary, null counts and cardinality of one file
//!
//! Rendering is deterministic: the same table, options and defects always give
//! byte-identical text.

mod error;
mod quality;
mod render;
mod stats;

pub use error::{ReportError, Result};
pub use quality::{
    QualityReport, ReportOptions, ReportSection, generate_report, profile_report, write_report,
};
pub use render::{NULL_MARKER, format_stat, render_rows, render_statistics};
pub use stats::{NumericSummary, describe, quantile, summarize};
