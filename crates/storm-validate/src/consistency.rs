//! Cross-column consistency checks on the merged table.
//!
//! Checks are read-only and count violations. A column that is not present is
//! reported as `None` (not checked) rather than as zero violations.

use serde::Serialize;
use storm_model::{CoordinatePair, PipelineConfig, Table, Value};

const LATITUDE_BOUND: f64 = 90.0;
const LONGITUDE_BOUND: f64 = 180.0;

/// Which columns the checks look at.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyOptions {
    pub coordinate_pairs: Vec<CoordinatePair>,
    pub damage_columns: Vec<String>,
    pub begin_date_column: String,
    pub end_date_column: String,
}

impl Default for ConsistencyOptions {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl ConsistencyOptions {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            coordinate_pairs: config.coordinate_pairs.clone(),
            damage_columns: config.damage_columns.clone(),
            begin_date_column: config.begin_date_column.clone(),
            end_date_column: config.end_date_column.clone(),
        }
    }
}

/// Out-of-range counts for one latitude/longitude pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoordinateCheck {
    pub latitude: String,
    pub longitude: String,
    pub latitude_out_of_range: Option<usize>,
    pub longitude_out_of_range: Option<usize>,
}

/// Negative count for one damage column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DamageCheck {
    pub column: String,
    pub negative: Option<usize>,
}

/// Result of [`check_consistency`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    pub coordinates: Vec<CoordinateCheck>,
    pub damages: Vec<DamageCheck>,
    /// Rows whose begin date is after their end date.
    pub begin_after_end: Option<usize>,
}

impl ConsistencyReport {
    /// Sum of every violation that was checked.
    pub fn total_violations(&self) -> usize {
        let coordinates: usize = self
            .coordinates
            .iter()
            .map(|c| c.latitude_out_of_range.unwrap_or(0) + c.longitude_out_of_range.unwrap_or(0))
            .sum();
        let damages: usize = self.damages.iter().filter_map(|d| d.negative).sum();
        coordinates + damages + self.begin_after_end.unwrap_or(0)
    }

    pub fn is_clean(&self) -> bool {
        self.total_violations() == 0
    }
}

fn count_outside(table: &Table, column: &str, bound: f64) -> Option<usize> {
    let column = table.column(column)?;
    Some(
        column
            .numeric_values()
            .into_iter()
            .filter(|v| !(-bound..=bound).contains(v))
            .count(),
    )
}

fn count_negative(table: &Table, column: &str) -> Option<usize> {
    let column = table.column(column)?;
    Some(column.numeric_values().into_iter().filter(|v| *v < 0.0).count())
}

fn count_begin_after_end(table: &Table, begin: &str, end: &str) -> Option<usize> {
    let begin = table.column(begin)?;
    let end = table.column(end)?;
    let count = begin
        .values()
        .iter()
        .zip(end.values())
        .filter(|&(b, e)| {
            let b = b.as_ref().and_then(Value::as_date);
            let e = e.as_ref().and_then(Value::as_date);
            matches!((b, e), (Some(b), Some(e)) if b > e)
        })
        .count();
    Some(count)
}

/// Run every configured check against `table`.
pub fn check_consistency(table: &Table, options: &ConsistencyOptions) -> ConsistencyReport {
    let coordinates = options
        .coordinate_pairs
        .iter()
        .map(|pair| CoordinateCheck {
            latitude: pair.latitude.clone(),
            longitude: pair.longitude.clone(),
            latitude_out_of_range: count_outside(table, &pair.latitude, LATITUDE_BOUND),
            longitude_out_of_range: count_outside(table, &pair.longitude, LONGITUDE_BOUND),
        })
        .collect();

    let damages = options
        .damage_columns
        .iter()
        .map(|column| DamageCheck {
            column: column.clone(),
            negative: count_negative(table, column),
        })
        .collect();

    ConsistencyReport {
        coordinates,
        damages,
        begin_after_end: count_begin_after_end(
            table,
            &options.begin_date_column,
            &options.end_date_column,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use storm_model::{Column, ColumnType};

    fn date(y: i32, m: u32, d: u32) -> Option<Value> {
        NaiveDate::from_ymd_opt(y, m, d).map(Value::Date)
    }

    #[test]
    fn test_counts_violations() {
        let table = Table::from_columns(
            "merged",
            vec![
                Column::from_f64("begin_lat", vec![Some(35.0), Some(95.0), None]),
                Column::from_f64("begin_lon", vec![Some(-181.0), Some(-97.0), Some(180.0)]),
                Column::from_f64("damage_crops", vec![Some(-1.0), Some(0.0), Some(2.0)]),
                Column::new(
                    "begin_date",
                    ColumnType::Date,
                    vec![date(2024, 5, 3), date(2024, 5, 9), None],
                ),
                Column::new(
                    "end_date",
                    ColumnType::String,
                    vec![
                        Some(Value::String("2024-05-04".into())),
                        Some(Value::String("2024-05-01".into())),
                        Some(Value::String("2024-05-01".into())),
                    ],
                ),
            ],
        )
        .unwrap();

        let report = check_consistency(&table, &ConsistencyOptions::default());
        assert_eq!(report.coordinates[0].latitude_out_of_range, Some(1));
        assert_eq!(report.coordinates[0].longitude_out_of_range, Some(1));
        assert_eq!(report.coordinates[1].latitude_out_of_range, None);
        assert_eq!(report.damages[0].negative, None);
        assert_eq!(report.damages[1].negative, Some(1));
        assert_eq!(report.begin_after_end, Some(1));
        assert_eq!(report.total_violations(), 4);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_absent_columns_are_not_checked() {
        let table = Table::from_columns(
            "merged",
            vec![Column::from_i64("event_id", vec![Some(1)])],
        )
        .unwrap();
        let report = check_consistency(&table, &ConsistencyOptions::default());
        assert!(report.coordinates.iter().all(|c| c.latitude_out_of_range.is_none()));
        assert_eq!(report.begin_after_end, None);
        assert!(report.is_clean());
    }
}
