//! Storm event table transformations.
//!
//! Every function here is pure with respect to logging policy: corrections are
//! returned as [`storm_model::Defect`] records and the caller decides how to
//! surface them.
//!
//! - [`normalize`]: canonical column names
//! - [`coerce`]: monetary amounts and composite date/time reconstruction
//! - [`nulls`]: column-drop and value-fill null policies
//! - [`dedupe`]: exact-row and key de-duplication, shared-key flags
//! - [`merge`]: left joins on the event key
//! - [`clean`]: per-source cleaning built from the above
//!
//! # Example
//!
//! ```ignore
//! use storm_model::PipelineConfig;
//! use storm_transform::{clean_details, merge_sources};
//!
//! let config = PipelineConfig::default();
//! let defects = clean_details(&mut details, &config)?;
//! let outcome = merge_sources(&details, &fatalities, &locations, &config.key_column)?;
//! ```

pub mod clean;
pub mod coerce;
pub mod dedupe;
pub mod merge;
pub mod normalize;
pub mod nulls;

pub use clean::{
    clamp_negative, clean_details, clean_fatalities, clean_locations, normalize_text_column,
};
pub use coerce::{
    apply_datetime_spec, coerce_monetary_column, parse_monetary, parse_monetary_str,
    reconstruct_datetime,
};
pub use dedupe::{dedupe_on_key, drop_duplicate_rows, flag_duplicate_keys, key_texts};
pub use merge::{MergeError, MergeOutcome, left_join, merge_sources};
pub use normalize::{normalize_column_name, normalize_table_columns};
pub use nulls::{FillPolicy, drop_empty_columns, drop_sparse_columns, fill_column, fill_nulls};
