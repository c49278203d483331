//! Data model for storm event cleaning.
//!
//! - [`table`]: columnar [`Table`] of typed, nullable [`Column`]s
//! - [`value`]: cell [`Value`]s and [`ColumnType`]s
//! - [`infer`]: column typing by majority-successful coercion
//! - [`defect`]: structured records of recoverable data-quality actions
//! - [`config`]: [`PipelineConfig`] and its parts

pub mod config;
pub mod defect;
pub mod error;
pub mod infer;
pub mod table;
pub mod value;

pub use config::{CoordinatePair, DateTimeSpec, PipelineConfig};
pub use defect::{Defect, DefectEntry, DefectLog};
pub use error::{ModelError, Result};
pub use infer::{
    InferredColumn, clean_raw, coerce, infer_column, infer_column_type, text_column,
};
pub use table::{Column, Table};
pub use value::{ColumnType, DATE_FORMAT, TIME_FORMAT, Value, format_numeric};
