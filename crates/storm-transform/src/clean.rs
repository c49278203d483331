//! Per-table cleaning for the details, fatalities and locations sources.

use storm_model::{ColumnType, Defect, PipelineConfig, Result, Table, Value};

use crate::coerce::{apply_datetime_spec, coerce_monetary_column};
use crate::dedupe::{dedupe_on_key, drop_duplicate_rows};
use crate::nulls::{drop_sparse_columns, fill_column};

/// Clamp negative values of numeric columns to 0.
pub fn clamp_negative<S: AsRef<str>>(table: &mut Table, columns: &[S]) -> Vec<Defect> {
    let mut defects = Vec::new();
    for name in columns {
        let Some(column) = table.column_mut(name.as_ref()) else {
            continue;
        };
        let dtype = column.dtype();
        if !dtype.is_numeric() {
            continue;
        }
        let mut count = 0usize;
        column.map_values(dtype, |value| match value {
            Some(Value::Integer(v)) if *v < 0 => {
                count += 1;
                Some(Value::Integer(0))
            }
            Some(Value::Float(v)) if *v < 0.0 => {
                count += 1;
                Some(Value::Float(0.0))
            }
            other => other.cloned(),
        });
        if count > 0 {
            defects.push(Defect::NegativeClamped {
                column: column.name().to_string(),
                count,
            });
        }
    }
    defects
}

/// Trim and lowercase the text values of a string column.
pub fn normalize_text_column(table: &mut Table, column: &str) -> Option<Defect> {
    let target = table.column_mut(column)?;
    if target.dtype() != ColumnType::String {
        return None;
    }
    let mut count = 0usize;
    target.map_values(ColumnType::String, |value| {
        let text = value?.as_str()?;
        let normalized = text.trim().to_lowercase();
        if normalized != text {
            count += 1;
        }
        Some(Value::String(normalized))
    });
    (count > 0).then(|| Defect::ValuesNormalized {
        column: target.name().to_string(),
        count,
    })
}

fn drop_configured(table: &mut Table, columns: &[String]) -> Vec<Defect> {
    table
        .drop_columns(columns)
        .into_iter()
        .map(|column| Defect::ColumnRemoved { column })
        .collect()
}

/// Clean the details table before the merge.
///
/// Parses monetary columns, removes configured columns, rebuilds the
/// begin/end date-times, removes exact duplicate rows, drops sparse columns at
/// the source threshold and clamps negative damages.
pub fn clean_details(table: &mut Table, config: &PipelineConfig) -> Result<Vec<Defect>> {
    let mut defects = Vec::new();

    for column in &config.monetary_columns {
        defects.extend(coerce_monetary_column(table, column));
    }
    defects.extend(drop_configured(table, &config.details_drop_columns));
    for spec in &config.datetime_specs {
        defects.extend(apply_datetime_spec(table, spec)?);
    }

    let removed = drop_duplicate_rows(table);
    if removed > 0 {
        defects.push(Defect::DuplicateRowsRemoved {
            table: table.name().to_string(),
            count: removed,
        });
    }

    defects.extend(drop_sparse_columns(table, config.source_drop_threshold));
    defects.extend(clamp_negative(table, &config.damage_columns));
    Ok(defects)
}

/// Clean the fatalities table: fill age and sex, canonicalize location text.
pub fn clean_fatalities(table: &mut Table, config: &PipelineConfig) -> Vec<Defect> {
    let mut defects = Vec::new();
    defects.extend(fill_column(
        table,
        "fatality_age",
        Value::Integer(config.fatality_age_fill),
    ));
    defects.extend(fill_column(
        table,
        "fatality_sex",
        Value::String(config.fill_token.clone()),
    ));
    defects.extend(normalize_text_column(table, "fatality_location"));
    defects
}

/// Clean the locations table: remove configured columns, keep one row per key.
pub fn clean_locations(table: &mut Table, config: &PipelineConfig) -> Vec<Defect> {
    let mut defects = drop_configured(table, &config.locations_drop_columns);
    let removed = dedupe_on_key(table, &config.key_column);
    if removed > 0 {
        defects.push(Defect::KeyDuplicatesRemoved {
            table: table.name().to_string(),
            key: config.key_column.clone(),
            count: removed,
        });
    }
    defects
}

#[cfg(test)]
mod tests {
    use super::*;
    use storm_model::Column;

    #[test]
    fn test_clamp_negative() {
        let mut table = Table::from_columns(
            "details",
            vec![
                Column::from_f64("damage_crops", vec![Some(-5.0), Some(3.0), None]),
                Column::from_strings("state", vec![Some("-1"), None, None]),
            ],
        )
        .unwrap();
        let defects = clamp_negative(&mut table, &["DAMAGE_CROPS", "state", "missing"]);
        assert_eq!(
            defects,
            vec![Defect::NegativeClamped {
                column: "damage_crops".to_string(),
                count: 1,
            }]
        );
        assert_eq!(table.cell(0, 0), Some(&Value::Float(0.0)));
        assert_eq!(table.cell(2, 0), None);
    }

    #[test]
    fn test_normalize_text_column() {
        let mut table = Table::from_columns(
            "fatalities",
            vec![Column::from_strings(
                "fatality_location",
                vec![Some(" In Water "), Some("vehicle/towed trailer"), None],
            )],
        )
        .unwrap();
        let defect = normalize_text_column(&mut table, "fatality_location").unwrap();
        assert_eq!(
            defect,
            Defect::ValuesNormalized {
                column: "fatality_location".to_string(),
                count: 1,
            }
        );
        assert_eq!(table.cell(0, 0), Some(&Value::String("in water".into())));
        assert_eq!(table.cell(2, 0), None);
    }

    #[test]
    fn test_clean_fatalities() {
        let mut table = Table::from_columns(
            "fatalities",
            vec![
                Column::from_strings("event_id", vec![Some("E1"), Some("E1")]),
                Column::from_i64("fatality_age", vec![Some(30), None]),
                Column::from_strings("fatality_sex", vec![None, Some("M")]),
            ],
        )
        .unwrap();
        let defects = clean_fatalities(&mut table, &PipelineConfig::default());
        assert_eq!(defects.len(), 2);
        assert_eq!(table.cell(1, 1), Some(&Value::Integer(-1)));
        assert_eq!(table.cell(0, 2), Some(&Value::String("unknown".into())));
    }

    #[test]
    fn test_clean_locations() {
        let mut table = Table::from_columns(
            "locations",
            vec![
                Column::from_strings("event_id", vec![Some("E1"), Some("E1")]),
                Column::from_f64("lat2", vec![Some(1.0), Some(2.0)]),
                Column::from_f64("lat", vec![Some(35.0), Some(36.0)]),
            ],
        )
        .unwrap();
        let defects = clean_locations(&mut table, &PipelineConfig::default());
        assert_eq!(table.column_names(), vec!["event_id", "lat"]);
        assert_eq!(table.height(), 1);
        assert_eq!(defects.len(), 2);
    }

    #[test]
    fn test_clean_details() {
        let mut table = Table::from_columns(
            "details",
            vec![
                Column::from_i64("event_id", vec![Some(1), Some(2), Some(2)]),
                Column::from_strings("damage_property", vec![Some("10K"), Some("bad"), Some("bad")]),
                Column::from_i64("begin_yearmonth", vec![Some(202403), Some(202403), Some(202403)]),
                Column::from_i64("begin_day", vec![Some(1), Some(2), Some(2)]),
                Column::from_strings("wfo", vec![Some("OUN"), Some("OUN"), Some("OUN")]),
                Column::nulls("tor_other_wfo", ColumnType::String, 3),
            ],
        )
        .unwrap();
        let defects = clean_details(&mut table, &PipelineConfig::default()).unwrap();

        assert_eq!(table.height(), 2);
        assert!(!table.has_column("wfo"));
        assert!(table.has_column("begin_date"));
        assert!(!table.has_column("tor_other_wfo"));
        assert!(defects.contains(&Defect::MonetaryMalformed {
            column: "damage_property".to_string(),
            count: 2,
        }));
        assert!(defects.contains(&Defect::DuplicateRowsRemoved {
            table: "details".to_string(),
            count: 1,
        }));
    }
}
