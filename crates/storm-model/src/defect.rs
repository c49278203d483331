//! Structured records of recoverable data-quality actions.
//!
//! Cleaning stages are pure: they return [`Defect`]s instead of logging. The
//! CLI logs them and the quality report renders every one of them, so no
//! correction happens silently.

use std::fmt;

use serde::Serialize;

use crate::value::ColumnType;

/// One recoverable defect found or corrected by a stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Defect {
    /// Header renamed to avoid a collision after normalization.
    ColumnRenamed { from: String, to: String },
    /// Values that did not coerce into the inferred type were nulled.
    CoercionFailed {
        column: String,
        expected: ColumnType,
        count: usize,
    },
    /// Column dropped because its null fraction exceeded the threshold.
    ColumnDropped {
        column: String,
        null_fraction: f64,
        threshold: f64,
    },
    /// Column dropped because it held no values at all.
    EmptyColumnDropped { column: String },
    /// Column removed because configuration lists it as irrelevant.
    ColumnRemoved { column: String },
    /// Remaining nulls replaced with a type-directed default.
    NullsFilled {
        column: String,
        count: usize,
        fill: String,
    },
    /// Monetary strings that did not parse and were set to 0.
    MonetaryMalformed { column: String, count: usize },
    /// Composite dates that did not parse and were left null.
    DateUnparsed { column: String, count: usize },
    /// Composite times that did not parse and were left null.
    TimeUnparsed { column: String, count: usize },
    /// Negative damage values clamped to 0.
    NegativeClamped { column: String, count: usize },
    /// Exact duplicate rows removed.
    DuplicateRowsRemoved { table: String, count: usize },
    /// Rows removed because an earlier row had the same key.
    KeyDuplicatesRemoved {
        table: String,
        key: String,
        count: usize,
    },
    /// Text values rewritten to a canonical form (trim/lowercase).
    ValuesNormalized { column: String, count: usize },
}

impl Defect {
    /// Column the defect is about, when it concerns a single column.
    pub fn column(&self) -> Option<&str> {
        match self {
            Defect::ColumnRenamed { to, .. } => Some(to),
            Defect::CoercionFailed { column, .. }
            | Defect::ColumnDropped { column, .. }
            | Defect::EmptyColumnDropped { column }
            | Defect::ColumnRemoved { column }
            | Defect::NullsFilled { column, .. }
            | Defect::MonetaryMalformed { column, .. }
            | Defect::DateUnparsed { column, .. }
            | Defect::TimeUnparsed { column, .. }
            | Defect::NegativeClamped { column, .. }
            | Defect::ValuesNormalized { column, .. } => Some(column),
            Defect::DuplicateRowsRemoved { .. } | Defect::KeyDuplicatesRemoved { .. } => None,
        }
    }

    /// Whether source data was lost or rewritten because it was bad.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Defect::CoercionFailed { .. }
                | Defect::MonetaryMalformed { .. }
                | Defect::DateUnparsed { .. }
                | Defect::TimeUnparsed { .. }
                | Defect::NegativeClamped { .. }
        )
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Defect::ColumnRenamed { from, to } => {
                write!(f, "column '{from}' renamed to '{to}' to avoid a name collision")
            }
            Defect::CoercionFailed {
                column,
                expected,
                count,
            } => write!(
                f,
                "{count} value(s) in '{column}' could not be read as {expected} and were set to null"
            ),
            Defect::ColumnDropped {
                column,
                null_fraction,
                threshold,
            } => write!(
                f,
                "column '{column}' dropped: {:.2}% null exceeds {:.2}% threshold",
                null_fraction * 100.0,
                threshold * 100.0
            ),
            Defect::EmptyColumnDropped { column } => {
                write!(f, "column '{column}' dropped: no values")
            }
            Defect::ColumnRemoved { column } => {
                write!(f, "column '{column}' removed by configuration")
            }
            Defect::NullsFilled {
                column,
                count,
                fill,
            } => write!(f, "{count} null(s) in '{column}' filled with '{fill}'"),
            Defect::MonetaryMalformed { column, count } => write!(
                f,
                "{count} malformed monetary value(s) in '{column}' set to 0"
            ),
            Defect::DateUnparsed { column, count } => {
                write!(f, "{count} date(s) for '{column}' could not be reconstructed")
            }
            Defect::TimeUnparsed { column, count } => {
                write!(f, "{count} time(s) for '{column}' could not be reconstructed")
            }
            Defect::NegativeClamped { column, count } => {
                write!(f, "{count} negative value(s) in '{column}' clamped to 0")
            }
            Defect::DuplicateRowsRemoved { table, count } => {
                write!(f, "{count} exact duplicate row(s) removed from {table}")
            }
            Defect::KeyDuplicatesRemoved { table, key, count } => write!(
                f,
                "{count} row(s) removed from {table} sharing '{key}' with an earlier row"
            ),
            Defect::ValuesNormalized { column, count } => {
                write!(f, "{count} value(s) in '{column}' trimmed and lowercased")
            }
        }
    }
}

/// A defect tagged with the pipeline stage that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefectEntry {
    pub stage: String,
    pub defect: Defect,
}

/// Ordered log of every defect of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DefectLog {
    entries: Vec<DefectEntry>,
}

impl DefectLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the defects of one stage, keeping their order.
    pub fn extend(&mut self, stage: &str, defects: impl IntoIterator<Item = Defect>) {
        self.entries.extend(defects.into_iter().map(|defect| DefectEntry {
            stage: stage.to_string(),
            defect,
        }));
    }

    pub fn entries(&self) -> &[DefectEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.entries.iter().filter(|e| e.defect.is_warning()).count()
    }
}
