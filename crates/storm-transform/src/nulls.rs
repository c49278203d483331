//! Null policy: drop sparse columns or fill remaining nulls.
//!
//! Thresholds are always passed by the caller; the details table and the
//! merged table use different ones.

use storm_model::{ColumnType, Defect, Table, Value};

/// How remaining nulls are filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillPolicy {
    /// Fill for non-numeric columns.
    pub fill_token: String,
}

impl Default for FillPolicy {
    fn default() -> Self {
        Self {
            fill_token: "unknown".to_string(),
        }
    }
}

impl FillPolicy {
    pub fn new(fill_token: impl Into<String>) -> Self {
        Self {
            fill_token: fill_token.into(),
        }
    }
}

/// Drop every column whose null fraction is strictly above `threshold`.
pub fn drop_sparse_columns(table: &mut Table, threshold: f64) -> Vec<Defect> {
    if table.height() == 0 {
        return Vec::new();
    }
    let sparse: Vec<(String, f64)> = table
        .columns()
        .iter()
        .filter(|c| c.null_fraction() > threshold)
        .map(|c| (c.name().to_string(), c.null_fraction()))
        .collect();

    sparse
        .into_iter()
        .filter_map(|(column, null_fraction)| {
            table.drop_column(&column)?;
            Some(Defect::ColumnDropped {
                column,
                null_fraction,
                threshold,
            })
        })
        .collect()
}

/// Drop columns that hold no values at all.
pub fn drop_empty_columns(table: &mut Table) -> Vec<Defect> {
    if table.height() == 0 {
        return Vec::new();
    }
    let empty: Vec<String> = table
        .columns()
        .iter()
        .filter(|c| c.null_count() == c.len())
        .map(|c| c.name().to_string())
        .collect();
    table
        .drop_columns(&empty)
        .into_iter()
        .map(|column| Defect::EmptyColumnDropped { column })
        .collect()
}

fn zero_for(dtype: ColumnType) -> Value {
    match dtype {
        ColumnType::Float => Value::Float(0.0),
        _ => Value::Integer(0),
    }
}

/// Fill the nulls of every column, in column order.
///
/// Numeric columns get 0. Every other column becomes a string column and gets
/// the fill token.
pub fn fill_nulls(table: &mut Table, policy: &FillPolicy) -> Vec<Defect> {
    let names: Vec<String> = table
        .columns()
        .iter()
        .filter(|c| c.null_count() > 0)
        .map(|c| c.name().to_string())
        .collect();

    let mut defects = Vec::with_capacity(names.len());
    for name in names {
        let Some(dtype) = table.column(&name).map(|c| c.dtype()) else {
            continue;
        };
        let fill = if dtype.is_numeric() {
            zero_for(dtype)
        } else {
            Value::String(policy.fill_token.clone())
        };
        if let Some(defect) = fill_column(table, &name, fill) {
            defects.push(defect);
        }
    }
    defects
}

/// Fill the nulls of one column with `value`.
///
/// A value of a different type turns the column into a string column first,
/// except that numbers are widened into float columns.
pub fn fill_column(table: &mut Table, column: &str, value: Value) -> Option<Defect> {
    let target = table.column_mut(column)?;
    let count = target.null_count();
    if count == 0 {
        return None;
    }

    let dtype = target.dtype();
    let fill = if value.column_type() == dtype {
        value
    } else {
        match (dtype, value) {
            (ColumnType::Float, Value::Integer(v)) => Value::Float(v as f64),
            (ColumnType::Integer, Value::Float(v)) => {
                target.map_values(ColumnType::Float, |cell| {
                    cell.and_then(Value::as_f64).map(Value::Float)
                });
                Value::Float(v)
            }
            (_, other) => {
                target.cast_to_string();
                Value::String(other.canonical())
            }
        }
    };

    let text = fill.canonical();
    let final_type = target.dtype();
    target.map_values(final_type, |v| Some(v.cloned().unwrap_or_else(|| fill.clone())));

    Some(Defect::NullsFilled {
        column: target.name().to_string(),
        count,
        fill: text,
    })
}
