//! Table source and sink collaborators.

use std::path::Path;

use storm_model::{Defect, Table, infer_column, text_column};
use storm_transform::{normalize_column_name, normalize_table_columns};

use crate::csv::{
    MAX_CSV_FILE_SIZE, check_file_size_with_limit, read_raw_csv, validate_encoding,
    write_csv_table,
};
use crate::error::Result;

/// A loaded table and the defects found while typing it.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub table: Table,
    pub defects: Vec<Defect>,
}

/// Settings for one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Columns kept as text instead of typed, matched on normalized name.
    pub text_columns: Vec<String>,
}

impl LoadOptions {
    pub fn with_text_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            text_columns: columns
                .into_iter()
                .map(|c| normalize_column_name(c.as_ref()))
                .collect(),
        }
    }

    fn keeps_text(&self, raw_name: &str) -> bool {
        let name = normalize_column_name(raw_name);
        self.text_columns
            .iter()
            .any(|c| normalize_column_name(c) == name)
    }
}

/// Something that can load a table from a path.
pub trait TableSource {
    fn load_with(&self, path: &Path, options: &LoadOptions) -> Result<Ingested>;

    /// Load with every column typed by inference.
    fn load(&self, path: &Path) -> Result<Ingested> {
        self.load_with(path, &LoadOptions::default())
    }
}

/// Something that can write a table to a path.
pub trait TableSink {
    fn save(&self, table: &Table, path: &Path) -> Result<()>;
}

/// CSV files on the local file system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvStore {
    max_file_size: u64,
}

impl Default for CsvStore {
    fn default() -> Self {
        Self {
            max_file_size: MAX_CSV_FILE_SIZE,
        }
    }
}

impl CsvStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }
}

fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl TableSource for CsvStore {
    /// Check, read, normalize headers and type every column not kept as text.
    fn load_with(&self, path: &Path, options: &LoadOptions) -> Result<Ingested> {
        check_file_size_with_limit(path, self.max_file_size)?;
        validate_encoding(path)?;
        let raw = read_raw_csv(path)?;

        let mut failures = Vec::with_capacity(raw.names.len());
        let mut columns = Vec::with_capacity(raw.names.len());
        for (name, values) in raw.names.iter().zip(&raw.columns) {
            if options.keeps_text(name) {
                let column = text_column(name.as_str(), values);
                failures.push((column.dtype(), 0));
                columns.push(column);
                continue;
            }
            let inferred = infer_column(name.as_str(), values);
            failures.push((inferred.column.dtype(), inferred.failures));
            columns.push(inferred.column);
        }

        let mut table = Table::from_columns(table_name(path), columns)?;
        let mut defects = normalize_table_columns(&mut table)?;
        for (idx, (expected, count)) in failures.into_iter().enumerate() {
            if count == 0 {
                continue;
            }
            if let Some(column) = table.column_at(idx) {
                defects.push(Defect::CoercionFailed {
                    column: column.name().to_string(),
                    expected,
                    count,
                });
            }
        }

        if table.height() == 0 {
            tracing::warn!(path = %path.display(), "CSV file has a header but no rows");
        }
        tracing::debug!(
            path = %path.display(),
            rows = table.height(),
            columns = table.width(),
            "loaded table"
        );
        Ok(Ingested { table, defects })
    }
}

impl TableSink for CsvStore {
    fn save(&self, table: &Table, path: &Path) -> Result<()> {
        write_csv_table(table, path)?;
        tracing::debug!(
            path = %path.display(),
            rows = table.height(),
            columns = table.width(),
            "wrote table"
        );
        Ok(())
    }
}
