//! Post-merge validation for storm event tables.
//!
//! Validation never mutates: it counts duplicates and consistency violations
//! so the report can show them.

pub mod consistency;
pub mod duplicates;

pub use consistency::{
    CoordinateCheck, ConsistencyOptions, ConsistencyReport, DamageCheck, check_consistency,
};
pub use duplicates::{DEFAULT_SAMPLE_SIZE, DuplicateAnalysis, DuplicateSummary, analyze_duplicates};
