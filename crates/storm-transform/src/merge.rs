//! Left joins of the three event tables on the event key.

use std::collections::{HashMap, HashSet};

use storm_model::{Column, Defect, ModelError, Table, Value};
use thiserror::Error;

use crate::dedupe::{dedupe_on_key, key_texts};

/// Errors that stop a merge.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The key column is missing from one of the inputs.
    #[error("key column '{key}' not found in {table}")]
    MissingKey { key: String, table: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// The merged table and what the merge corrected on the way.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub table: Table,
    pub defects: Vec<Defect>,
}

fn require_key(table: &Table, key: &str) -> Result<Vec<Option<String>>, MergeError> {
    key_texts(table, key).ok_or_else(|| MergeError::MissingKey {
        key: key.to_string(),
        table: table.name().to_string(),
    })
}

fn gather(column: &Column, rows: &[Option<usize>]) -> Vec<Option<Value>> {
    rows.iter()
        .map(|row| row.and_then(|idx| column.get(idx).cloned()))
        .collect()
}

/// `left LEFT JOIN right ON key`.
///
/// Every left row is kept; a row with several matches fans out into one row
/// per match in right-table order. Null keys never match. The key column is
/// taken from the left once; other shared names get `_x` and `_y` suffixes.
pub fn left_join(left: &Table, right: &Table, key: &str) -> Result<Table, MergeError> {
    let left_keys = require_key(left, key)?;
    let right_keys = require_key(right, key)?;

    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (row, k) in right_keys.iter().enumerate() {
        if let Some(k) = k {
            index.entry(k.as_str()).or_default().push(row);
        }
    }

    let mut left_rows = Vec::with_capacity(left.height());
    let mut right_rows = Vec::with_capacity(left.height());
    for (row, k) in left_keys.iter().enumerate() {
        match k.as_deref().and_then(|k| index.get(k)) {
            Some(matches) => {
                for &matched in matches {
                    left_rows.push(Some(row));
                    right_rows.push(Some(matched));
                }
            }
            None => {
                left_rows.push(Some(row));
                right_rows.push(None);
            }
        }
    }

    let left_key = left.column_index(key);
    let right_key = right.column_index(key);
    let left_names: HashSet<String> = left
        .columns()
        .iter()
        .enumerate()
        .filter(|(idx, _)| Some(*idx) != left_key)
        .map(|(_, c)| c.name().to_ascii_lowercase())
        .collect();
    let right_names: HashSet<String> = right
        .columns()
        .iter()
        .enumerate()
        .filter(|(idx, _)| Some(*idx) != right_key)
        .map(|(_, c)| c.name().to_ascii_lowercase())
        .collect();

    let mut columns = Vec::with_capacity(left.width() + right.width());
    for (idx, column) in left.columns().iter().enumerate() {
        let shared = right_names.contains(&column.name().to_ascii_lowercase());
        let name = if Some(idx) != left_key && shared {
            format!("{}_x", column.name())
        } else {
            column.name().to_string()
        };
        columns.push(Column::new(name, column.dtype(), gather(column, &left_rows)));
    }
    for (idx, column) in right.columns().iter().enumerate() {
        if Some(idx) == right_key {
            continue;
        }
        let name = if left_names.contains(&column.name().to_ascii_lowercase()) {
            format!("{}_y", column.name())
        } else {
            column.name().to_string()
        };
        columns.push(Column::new(name, column.dtype(), gather(column, &right_rows)));
    }

    Ok(Table::from_columns(left.name(), columns)?)
}

/// Merge details, fatalities and locations into one table.
///
/// Locations are deduplicated on the key (keep first) before the second join,
/// so fan-out only comes from fatalities.
pub fn merge_sources(
    details: &Table,
    fatalities: &Table,
    locations: &Table,
    key: &str,
) -> Result<MergeOutcome, MergeError> {
    for table in [details, fatalities, locations] {
        require_key(table, key)?;
    }

    let mut defects = Vec::new();
    let mut unique_locations = locations.clone();
    let removed = dedupe_on_key(&mut unique_locations, key);
    if removed > 0 {
        defects.push(Defect::KeyDuplicatesRemoved {
            table: locations.name().to_string(),
            key: key.to_string(),
            count: removed,
        });
    }

    let with_fatalities = left_join(details, fatalities, key)?;
    let mut table = left_join(&with_fatalities, &unique_locations, key)?;
    table.set_name("merged");

    Ok(MergeOutcome { table, defects })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> Table {
        Table::from_columns(
            "details",
            vec![
                Column::from_strings("event_id", vec![Some("E1"), Some("E2"), None]),
                Column::from_strings("state", vec![Some("TX"), Some("OK"), Some("KS")]),
                Column::from_i64("episode_id", vec![Some(10), Some(20), Some(30)]),
            ],
        )
        .unwrap()
    }

    fn fatalities() -> Table {
        Table::from_columns(
            "fatalities",
            vec![
                Column::from_strings("event_id", vec![Some("E1"), Some("E1"), Some("E1"), None]),
                Column::from_i64("fatality_age", vec![Some(30), Some(40), Some(50), Some(60)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_fan_out_preserves_left_values() {
        let merged = left_join(&details(), &fatalities(), "EVENT_ID").unwrap();
        assert_eq!(merged.height(), 5);
        assert_eq!(merged.column_names(), vec!["event_id", "state", "episode_id", "fatality_age"]);
        let ages = merged.column("fatality_age").unwrap();
        assert_eq!(ages.numeric_values(), vec![30.0, 40.0, 50.0]);
        assert_eq!(ages.null_count(), 2);
        for row in 0..3 {
            assert_eq!(merged.cell(row, 1), Some(&Value::String("TX".into())));
        }
        // null key on the left never matches the null key on the right
        assert_eq!(merged.cell(4, 1), Some(&Value::String("KS".into())));
        assert_eq!(merged.cell(4, 3), None);
    }

    #[test]
    fn test_collisions_get_suffixes() {
        let locations = Table::from_columns(
            "locations",
            vec![
                Column::from_i64("episode_id", vec![Some(99)]),
                Column::from_strings("EVENT_ID", vec![Some("E2")]),
            ],
        )
        .unwrap();
        let merged = left_join(&details(), &locations, "event_id").unwrap();
        assert_eq!(
            merged.column_names(),
            vec!["event_id", "state", "episode_id_x", "episode_id_y"]
        );
        assert_eq!(merged.cell(1, 3), Some(&Value::Integer(99)));
    }

    #[test]
    fn test_keys_match_across_types() {
        let left = Table::from_columns("l", vec![Column::from_i64("event_id", vec![Some(42)])]).unwrap();
        let right = Table::from_columns(
            "r",
            vec![
                Column::from_strings("event_id", vec![Some("42")]),
                Column::from_strings("extra", vec![Some("hit")]),
            ],
        )
        .unwrap();
        let merged = left_join(&left, &right, "event_id").unwrap();
        assert_eq!(merged.cell(0, 1), Some(&Value::String("hit".into())));
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let no_key = Table::from_columns(
            "locations",
            vec![Column::from_i64("location_index", vec![Some(1)])],
        )
        .unwrap();
        let err = merge_sources(&details(), &fatalities(), &no_key, "event_id").unwrap_err();
        assert!(matches!(err, MergeError::MissingKey { ref table, .. } if table == "locations"));
        assert_eq!(err.to_string(), "key column 'event_id' not found in locations");
    }

    #[test]
    fn test_merge_sources_dedupes_locations() {
        let locations = Table::from_columns(
            "locations",
            vec![
                Column::from_strings("event_id", vec![Some("E1"), Some("E1")]),
                Column::from_strings("location", vec![Some("first"), Some("second")]),
            ],
        )
        .unwrap();
        let outcome = merge_sources(&details(), &fatalities(), &locations, "event_id").unwrap();
        assert_eq!(outcome.table.height(), 5);
        assert_eq!(outcome.table.name(), "merged");
        let places = outcome.table.column("location").unwrap();
        assert_eq!(places.get(2), Some(&Value::String("first".into())));
        assert_eq!(
            outcome.defects,
            vec![Defect::KeyDuplicatesRemoved {
                table: "locations".to_string(),
                key: "event_id".to_string(),
                count: 1,
            }]
        );
    }
}
