//! Columnar table with typed, nullable columns.
//!
//! A [`Table`] is an ordered list of [`Column`]s of equal length. Rows have no
//! identity beyond their position. Every mutating operation checks that each
//! row keeps exactly one (possibly null) value per column.

use crate::error::{ModelError, Result};
use crate::value::{ColumnType, Value};

/// A named, typed column of nullable cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    dtype: ColumnType,
    values: Vec<Option<Value>>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: ColumnType, values: Vec<Option<Value>>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    /// A column of `len` nulls.
    pub fn nulls(name: impl Into<String>, dtype: ColumnType, len: usize) -> Self {
        Self::new(name, dtype, vec![None; len])
    }

    /// Build a string column from optional text.
    pub fn from_strings<S: Into<String>>(name: impl Into<String>, values: Vec<Option<S>>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.map(|s| Value::String(s.into())))
            .collect();
        Self::new(name, ColumnType::String, values)
    }

    /// Build an integer column.
    pub fn from_i64(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        let values = values.into_iter().map(|v| v.map(Value::Integer)).collect();
        Self::new(name, ColumnType::Integer, values)
    }

    /// Build a float column; NaN becomes null.
    pub fn from_f64(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let values = values.into_iter().map(|v| v.and_then(Value::float)).collect();
        Self::new(name, ColumnType::Float, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> ColumnType {
        self.dtype
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row).and_then(Option::as_ref)
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Fraction of null cells; an empty column has fraction 0.
    pub fn null_fraction(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.null_count() as f64 / self.values.len() as f64
        }
    }

    /// Numeric view of the non-null values, in row order.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values
            .iter()
            .filter_map(|v| v.as_ref().and_then(Value::as_f64))
            .collect()
    }

    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Rewrite every cell and retag the column type.
    pub fn map_values<F>(&mut self, dtype: ColumnType, mut f: F)
    where
        F: FnMut(Option<&Value>) -> Option<Value>,
    {
        let mapped = self.values.iter().map(|v| f(v.as_ref())).collect();
        self.values = mapped;
        self.dtype = dtype;
    }

    /// Convert every value to its canonical text form.
    pub fn cast_to_string(&mut self) {
        if self.dtype == ColumnType::String {
            return;
        }
        self.map_values(ColumnType::String, |v| {
            v.map(|value| Value::String(value.canonical()))
        });
    }

    fn select(&self, indices: &[usize]) -> Column {
        let values = indices
            .iter()
            .map(|&idx| self.values.get(idx).cloned().flatten())
            .collect();
        Column::new(self.name.clone(), self.dtype, values)
    }
}

/// An ordered set of equal-length columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    height: usize,
}

impl Table {
    /// An empty table with no columns and no rows.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            height: 0,
        }
    }

    /// Build a table from columns, checking lengths and name uniqueness.
    pub fn from_columns(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let mut table = Self::new(name);
        if let Some(first) = columns.first() {
            table.height = first.len();
        }
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Position of a column; exact match first, then ASCII case-insensitive.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.name.eq_ignore_ascii_case(name))
            })
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|idx| &self.columns[idx])
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.column_index(name).map(move |idx| &mut self.columns[idx])
    }

    pub fn column_at(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    /// The cell at (`row`, `col`); `None` when null or out of range.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Value> {
        self.columns.get(col).and_then(|c| c.get(row))
    }

    /// A cloned row, one entry per column.
    pub fn row(&self, row: usize) -> Vec<Option<Value>> {
        self.columns
            .iter()
            .map(|c| c.values.get(row).cloned().flatten())
            .collect()
    }

    /// Append a column. The first column of an empty table sets the height.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if self.columns.is_empty() && self.height == 0 {
            self.height = column.len();
        }
        if column.len() != self.height {
            return Err(ModelError::LengthMismatch {
                column: column.name,
                expected: self.height,
                found: column.values.len(),
            });
        }
        if self.columns.iter().any(|c| c.name == column.name) {
            return Err(ModelError::DuplicateColumn { name: column.name });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Swap in a column with the same name (case-insensitive) at the same position.
    pub fn replace_column(&mut self, column: Column) -> Result<()> {
        if column.len() != self.height {
            return Err(ModelError::LengthMismatch {
                column: column.name,
                expected: self.height,
                found: column.values.len(),
            });
        }
        let idx = self
            .column_index(&column.name)
            .ok_or_else(|| ModelError::ColumnNotFound {
                name: column.name.clone(),
            })?;
        self.columns[idx] = column;
        Ok(())
    }

    /// Remove a column, returning it when present.
    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.column_index(name)?;
        Some(self.columns.remove(idx))
    }

    /// Remove every listed column that exists; returns the removed names.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<String> {
        names
            .iter()
            .filter_map(|name| self.drop_column(name.as_ref()))
            .map(|c| c.name)
            .collect()
    }

    /// Rename every column at once, in column order.
    pub fn set_column_names(&mut self, names: Vec<String>) -> Result<()> {
        if names.len() != self.columns.len() {
            return Err(ModelError::RowWidth {
                expected: self.columns.len(),
                found: names.len(),
            });
        }
        for (pos, name) in names.iter().enumerate() {
            if names[..pos].contains(name) {
                return Err(ModelError::DuplicateColumn { name: name.clone() });
            }
        }
        for (column, name) in self.columns.iter_mut().zip(names) {
            column.rename(name);
        }
        Ok(())
    }

    /// Add a column, or swap out an existing one with the same name.
    pub fn upsert_column(&mut self, column: Column) -> Result<()> {
        if self.has_column(&column.name) {
            self.replace_column(column)
        } else {
            self.push_column(column)
        }
    }

    /// Append one row.
    pub fn push_row(&mut self, row: Vec<Option<Value>>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ModelError::RowWidth {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.values.push(value);
        }
        self.height += 1;
        Ok(())
    }

    /// New table holding the given rows, in the given order.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            name: self.name.clone(),
            columns: self.columns.iter().map(|c| c.select(indices)).collect(),
            height: indices.len(),
        }
    }

    /// Keep rows whose mask entry is `true`; returns the number removed.
    pub fn retain_rows(&mut self, keep: &[bool]) -> usize {
        let indices: Vec<usize> = keep
            .iter()
            .enumerate()
            .filter_map(|(idx, &k)| if k && idx < self.height { Some(idx) } else { None })
            .collect();
        let removed = self.height - indices.len();
        if removed > 0 {
            *self = self.take_rows(&indices);
        }
        removed
    }

    /// Canonical text key of a row, used for exact-duplicate detection.
    pub fn row_key(&self, row: usize) -> Vec<Option<String>> {
        self.columns
            .iter()
            .map(|c| c.get(row).map(Value::canonical))
            .collect()
    }
}
