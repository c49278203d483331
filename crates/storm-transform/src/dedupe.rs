//! Row de-duplication and shared-key flagging.
//!
//! Keys are compared by canonical text. Null keys are equal to each other.

use std::collections::{HashMap, HashSet};

use storm_model::{Column, ColumnType, Result, Table, Value};

/// Canonical key text of every row, or `None` when the key column is absent.
pub fn key_texts(table: &Table, key: &str) -> Option<Vec<Option<String>>> {
    let column = table.column(key)?;
    Some(
        column
            .values()
            .iter()
            .map(|v| v.as_ref().map(Value::canonical))
            .collect(),
    )
}

/// Remove exact duplicate rows, keeping the first. Returns the removed count.
pub fn drop_duplicate_rows(table: &mut Table) -> usize {
    let mut seen = HashSet::new();
    let keep: Vec<bool> = (0..table.height())
        .map(|row| seen.insert(table.row_key(row)))
        .collect();
    table.retain_rows(&keep)
}

/// Remove rows whose key already appeared. Missing key removes nothing.
pub fn dedupe_on_key(table: &mut Table, key: &str) -> usize {
    let Some(keys) = key_texts(table, key) else {
        return 0;
    };
    let mut seen = HashSet::new();
    let keep: Vec<bool> = keys.into_iter().map(|k| seen.insert(k)).collect();
    table.retain_rows(&keep)
}

/// Append (or overwrite) a boolean column marking rows whose key is shared
/// with another row. Returns `false` when the key column is absent.
pub fn flag_duplicate_keys(table: &mut Table, key: &str, flag_column: &str) -> Result<bool> {
    let Some(keys) = key_texts(table, key) else {
        return Ok(false);
    };
    let mut counts: HashMap<&Option<String>, usize> = HashMap::new();
    for k in &keys {
        *counts.entry(k).or_default() += 1;
    }
    let flags = keys
        .iter()
        .map(|k| Some(Value::Boolean(counts.get(k).copied().unwrap_or(0) > 1)))
        .collect();
    table.upsert_column(Column::new(flag_column, ColumnType::Boolean, flags))?;
    Ok(true)
}
