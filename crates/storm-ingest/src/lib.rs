//! Storm event data ingestion.
//!
//! Loads delimited files into typed [`storm_model::Table`]s and writes tables
//! back out.
//!
//! # Features
//!
//! - **File checks**: existence, a 500 MB size limit and UTF-16 rejection
//! - **CSV loading**: every column read as text via Polars, headers
//!   normalized, column types inferred
//! - **CSV saving**: table to Polars `DataFrame` to CSV, column order kept
//! - **Source detection**: details, fatalities or locations by marker columns
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use storm_ingest::{CsvStore, TableSink, TableSource};
//!
//! let store = CsvStore::new();
//! let ingested = store.load(Path::new("data/details.csv"))?;
//! store.save(&ingested.table, Path::new("out/details_clean.csv"))?;
//! ```

mod csv;
mod detect;
mod error;
mod store;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading and Writing ===
pub use csv::{
    MAX_CSV_FILE_SIZE, RawCsv, check_file_size, check_file_size_with_limit, read_header_line,
    read_raw_csv, table_to_dataframe, validate_encoding, write_csv_table,
};

// === Source Detection ===
pub use detect::{SourceKind, detect_source_kind};

// === Source and Sink ===
pub use store::{CsvStore, Ingested, LoadOptions, TableSink, TableSource};
