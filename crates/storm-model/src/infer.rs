//! Column type inference by majority-successful coercion.
//!
//! Raw text columns are typed once, at load time. Candidates are tried in the
//! order boolean, integer, float, date, time; the first one that coerces more
//! than half of the non-null values wins. Values that fail coercion under the
//! winning type become null and are counted.

use chrono::{NaiveDate, NaiveTime};

use crate::table::Column;
use crate::value::{ColumnType, Value};

/// Tokens read as null, in addition to empty text.
pub const NULL_TOKENS: &[&str] = &[
    "nan", "NaN", "NAN", "NA", "N/A", "n/a", "null", "NULL", "None", "#N/A",
];

const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const TIME_LAYOUTS: &[&str] = &["%H:%M:%S", "%H:%M"];

const CANDIDATES: &[ColumnType] = &[
    ColumnType::Boolean,
    ColumnType::Integer,
    ColumnType::Float,
    ColumnType::Date,
    ColumnType::Time,
];

/// Trimmed text, or `None` for empty text and null tokens.
pub fn clean_raw(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || NULL_TOKENS.contains(&trimmed) {
        None
    } else {
        Some(trimmed)
    }
}

/// Coerce one trimmed text value into `dtype`.
pub fn coerce(raw: &str, dtype: ColumnType) -> Option<Value> {
    match dtype {
        ColumnType::String => Some(Value::String(raw.to_string())),
        ColumnType::Boolean => {
            if raw.eq_ignore_ascii_case("true") {
                Some(Value::Boolean(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Some(Value::Boolean(false))
            } else {
                None
            }
        }
        ColumnType::Integer => raw.parse::<i64>().ok().map(Value::Integer),
        ColumnType::Float => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Value::Float),
        ColumnType::Date => DATE_LAYOUTS
            .iter()
            .find_map(|layout| NaiveDate::parse_from_str(raw, layout).ok())
            .map(Value::Date),
        ColumnType::Time => TIME_LAYOUTS
            .iter()
            .find_map(|layout| NaiveTime::parse_from_str(raw, layout).ok())
            .map(Value::Time),
    }
}

/// Pick the column type for already-cleaned values.
pub fn infer_column_type(values: &[Option<&str>]) -> ColumnType {
    let present: Vec<&str> = values.iter().filter_map(|v| *v).collect();
    if present.is_empty() {
        return ColumnType::String;
    }
    for &candidate in CANDIDATES {
        let ok = present
            .iter()
            .filter(|raw| coerce(raw, candidate).is_some())
            .count();
        if ok * 2 <= present.len() {
            continue;
        }
        if candidate == ColumnType::Integer {
            // Mixed integral and fractional values are floats.
            let fractional = present
                .iter()
                .any(|raw| raw.parse::<i64>().is_err() && coerce(raw, ColumnType::Float).is_some());
            if fractional {
                continue;
            }
        }
        return candidate;
    }
    ColumnType::String
}

/// A typed column built from raw text, plus how many values failed coercion.
#[derive(Debug, Clone)]
pub struct InferredColumn {
    pub column: Column,
    pub failures: usize,
}

/// Type a raw text column.
pub fn infer_column(name: impl Into<String>, raw: &[Option<String>]) -> InferredColumn {
    let cleaned: Vec<Option<&str>> = raw
        .iter()
        .map(|v| v.as_deref().and_then(clean_raw))
        .collect();
    let dtype = infer_column_type(&cleaned);
    let mut failures = 0usize;
    let values = cleaned
        .iter()
        .map(|v| {
            let raw = (*v)?;
            let coerced = coerce(raw, dtype);
            if coerced.is_none() {
                failures += 1;
            }
            coerced
        })
        .collect();
    InferredColumn {
        column: Column::new(name, dtype, values),
        failures,
    }
}

/// Keep a raw column as text. Only empty text and null tokens become null.
pub fn text_column(name: impl Into<String>, raw: &[Option<String>]) -> Column {
    let values = raw
        .iter()
        .map(|v| {
            v.as_deref()
                .and_then(clean_raw)
                .map(|s| Value::String(s.to_string()))
        })
        .collect();
    Column::new(name, ColumnType::String, values)
}
