//! CSV writing through a Polars `DataFrame`.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use storm_model::{ColumnType, Table, Value};

use crate::error::{IngestError, Result};

fn to_series(column: &storm_model::Column) -> Series {
    let name: PlSmallStr = column.name().into();
    match column.dtype() {
        ColumnType::Integer => {
            let values: Vec<Option<i64>> = column
                .values()
                .iter()
                .map(|v| match v {
                    Some(Value::Integer(i)) => Some(*i),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        }
        ColumnType::Float => {
            let values: Vec<Option<f64>> = column
                .values()
                .iter()
                .map(|v| v.as_ref().and_then(Value::as_f64))
                .collect();
            Series::new(name, values)
        }
        ColumnType::Boolean => {
            let values: Vec<Option<bool>> = column
                .values()
                .iter()
                .map(|v| match v {
                    Some(Value::Boolean(b)) => Some(*b),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        }
        ColumnType::String | ColumnType::Date | ColumnType::Time => {
            let values: Vec<Option<String>> = column
                .values()
                .iter()
                .map(|v| v.as_ref().map(Value::canonical))
                .collect();
            Series::new(name, values)
        }
    }
}

/// Convert a table into a Polars `DataFrame`, keeping column order.
///
/// Dates and times become text in their canonical layouts.
pub fn table_to_dataframe(table: &Table) -> Result<DataFrame> {
    let columns: Vec<Column> = table
        .columns()
        .iter()
        .map(|c| to_series(c).into())
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Write `table` as CSV with a header row.
pub fn write_csv_table(table: &Table, path: &Path) -> Result<()> {
    let mut df = table_to_dataframe(table)?;
    let mut file = File::create(path).map_err(|e| IngestError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut df)
        .map_err(|e| IngestError::CsvWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
