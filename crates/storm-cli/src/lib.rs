//! CLI library components for storm-clean.

pub mod logging;
pub mod pipeline;
