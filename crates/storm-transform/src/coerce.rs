//! Value coercers: monetary amounts and composite date/time reconstruction.
//!
//! Both are soft: malformed amounts become 0 and unparseable dates or times
//! become null. The column-level wrappers count what was lost.

use std::fmt::Write as _;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use storm_model::{Column, ColumnType, DateTimeSpec, Defect, Result, Table, Value};

/// `<number>[K|M|B]`, anchored at the start only.
static MONETARY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(\.\d+)?)([KMB])?").expect("Invalid monetary regex"));

const TIME_LAYOUT: &str = "%H%M";

/// Recognized amount, or `None` when the text is malformed.
fn monetary_amount(raw: &str) -> Option<f64> {
    let text = raw.to_uppercase();
    let text = text.trim();

    let amount = match MONETARY_REGEX.captures(text) {
        Some(caps) => {
            let number: f64 = caps[1].parse().ok()?;
            let multiplier = match caps.get(3).map(|m| m.as_str()) {
                Some("K") => 1e3,
                Some("M") => 1e6,
                Some("B") => 1e9,
                _ => 1.0,
            };
            number * multiplier
        }
        None => text.parse::<f64>().ok()?,
    };

    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

/// Parse a monetary string such as `12K` or `3.5M` into dollars.
///
/// Total: malformed, negative or non-finite input yields 0.
pub fn parse_monetary_str(raw: &str) -> f64 {
    monetary_amount(raw).unwrap_or(0.0)
}

/// Parse a monetary cell. Numbers pass through; null and non-finite are 0.
pub fn parse_monetary(raw: Option<&Value>) -> f64 {
    match raw {
        None => 0.0,
        Some(Value::Integer(v)) => *v as f64,
        Some(Value::Float(v)) if v.is_finite() => *v,
        Some(Value::Float(_)) => 0.0,
        Some(Value::String(s)) => parse_monetary_str(s),
        Some(other) => parse_monetary_str(&other.canonical()),
    }
}

/// Rewrite `column` as dollars. Missing columns are skipped.
pub fn coerce_monetary_column(table: &mut Table, column: &str) -> Vec<Defect> {
    let Some(target) = table.column_mut(column) else {
        tracing::debug!(column, "monetary column not present, skipping");
        return Vec::new();
    };

    let mut malformed = 0usize;
    target.map_values(ColumnType::Float, |value| {
        if let Some(Value::String(s)) = value
            && monetary_amount(s).is_none()
        {
            malformed += 1;
        }
        Some(Value::Float(parse_monetary(value)))
    });

    if malformed == 0 {
        Vec::new()
    } else {
        vec![Defect::MonetaryMalformed {
            column: target.name().to_string(),
            count: malformed,
        }]
    }
}

/// Rebuild a date and a time of day from their split parts.
///
/// The date is `year_month` followed by `day` zero-padded to two digits,
/// parsed with `layout` plus `%d`. The time is zero-padded to four digits
/// and parsed as `HHMM`. Either half is null when it does not parse.
pub fn reconstruct_datetime(
    year_month: Option<&Value>,
    day: Option<&Value>,
    time: Option<&Value>,
    layout: &str,
) -> (Option<NaiveDate>, Option<NaiveTime>) {
    let date = match (year_month, day) {
        (Some(ym), Some(d)) => {
            let text = format!("{}{:0>2}", ym.canonical().trim(), d.canonical().trim());
            NaiveDate::parse_from_str(&text, &format!("{layout}%d")).ok()
        }
        _ => None,
    };
    let time = time.and_then(|t| {
        let text = format!("{:0>4}", t.canonical().trim());
        NaiveTime::parse_from_str(&text, TIME_LAYOUT).ok()
    });
    (date, time)
}

fn format_date(date: NaiveDate, layout: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(layout)).ok()?;
    Some(out)
}

/// Add `<prefix>_date` and `<prefix>_time` columns for one date/time triple.
pub fn apply_datetime_spec(table: &mut Table, spec: &DateTimeSpec) -> Result<Vec<Defect>> {
    let (Some(ym_idx), Some(day_idx)) = (
        table.column_index(&spec.year_month_column),
        table.column_index(&spec.day_column),
    ) else {
        tracing::debug!(
            prefix = %spec.output_prefix,
            "date parts not present, skipping reconstruction"
        );
        return Ok(Vec::new());
    };
    let time_idx = match &spec.time_column {
        Some(name) => {
            let idx = table.column_index(name);
            if idx.is_none() {
                tracing::debug!(column = %name, "time column not present, skipping time");
            }
            idx
        }
        None => None,
    };

    let mut dates = Vec::with_capacity(table.height());
    let mut times = Vec::with_capacity(table.height());
    let mut date_failures = 0usize;
    let mut time_failures = 0usize;

    for row in 0..table.height() {
        let ym = table.cell(row, ym_idx);
        let day = table.cell(row, day_idx);
        let time = time_idx.and_then(|idx| table.cell(row, idx));
        let (date, parsed_time) = reconstruct_datetime(ym, day, time, &spec.date_layout);

        let date_value = match (&spec.output_layout, date) {
            (Some(layout), Some(d)) => format_date(d, layout).map(Value::String),
            (None, Some(d)) => Some(Value::Date(d)),
            (_, None) => None,
        };
        if date_value.is_none() && (ym.is_some() || day.is_some()) {
            date_failures += 1;
        }
        if parsed_time.is_none() && time.is_some() {
            time_failures += 1;
        }
        dates.push(date_value);
        times.push(parsed_time.map(Value::Time));
    }

    let date_name = spec.date_column_name();
    let time_name = spec.time_column_name();
    let date_type = if spec.output_layout.is_some() {
        ColumnType::String
    } else {
        ColumnType::Date
    };

    let mut defects = Vec::new();
    if date_failures > 0 {
        defects.push(Defect::DateUnparsed {
            column: date_name.clone(),
            count: date_failures,
        });
    }
    table.upsert_column(Column::new(date_name, date_type, dates))?;

    if time_idx.is_some() {
        if time_failures > 0 {
            defects.push(Defect::TimeUnparsed {
                column: time_name.clone(),
                count: time_failures,
            });
        }
        table.upsert_column(Column::new(time_name, ColumnType::Time, times))?;
    }

    Ok(defects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_monetary_suffixes() {
        assert_eq!(parse_monetary_str("12K"), 12_000.0);
        assert_eq!(parse_monetary_str("3.5M"), 3_500_000.0);
        assert_eq!(parse_monetary_str("2b"), 2_000_000_000.0);
        assert_eq!(parse_monetary_str(" 0.00K "), 0.0);
        assert_eq!(parse_monetary_str("250"), 250.0);
    }

    #[test]
    fn test_monetary_malformed_is_zero() {
        assert_eq!(parse_monetary_str("garbage"), 0.0);
        assert_eq!(parse_monetary_str(""), 0.0);
        assert_eq!(parse_monetary_str("-5K"), 0.0);
        assert_eq!(parse_monetary_str("inf"), 0.0);
        assert_eq!(parse_monetary(None), 0.0);
    }

    #[test]
    fn test_monetary_numbers_pass_through() {
        assert_eq!(parse_monetary(Some(&Value::Integer(42))), 42.0);
        assert_eq!(parse_monetary(Some(&Value::Float(1.5))), 1.5);
        assert_eq!(parse_monetary(Some(&Value::Float(f64::INFINITY))), 0.0);
    }

    #[test]
    fn test_monetary_column_counts_malformed() {
        let mut table = Table::from_columns(
            "details",
            vec![Column::from_strings(
                "damage_property",
                vec![Some("10K"), Some("oops"), None, Some("0")],
            )],
        )
        .unwrap();
        let defects = coerce_monetary_column(&mut table, "DAMAGE_PROPERTY");
        let column = table.column("damage_property").unwrap();
        assert_eq!(column.dtype(), ColumnType::Float);
        assert_eq!(column.numeric_values(), vec![10_000.0, 0.0, 0.0, 0.0]);
        assert_eq!(
            defects,
            vec![Defect::MonetaryMalformed {
                column: "damage_property".to_string(),
                count: 1,
            }]
        );
    }

    #[test]
    fn test_reconstruct_date() {
        let (date, time) = reconstruct_datetime(
            Some(&Value::Integer(202403)),
            Some(&Value::Integer(15)),
            Some(&Value::Integer(930)),
            "%Y%m",
        );
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(time, NaiveTime::from_hms_opt(9, 30, 0));
    }

    #[test]
    fn test_reconstruct_invalid_date_keeps_time() {
        let (date, time) = reconstruct_datetime(
            Some(&Value::Integer(202302)),
            Some(&Value::Integer(31)),
            Some(&Value::Integer(2359)),
            "%Y%m",
        );
        assert_eq!(date, None);
        assert_eq!(time, NaiveTime::from_hms_opt(23, 59, 0));
    }

    #[test]
    fn test_reconstruct_pads_day_and_time() {
        let (date, time) = reconstruct_datetime(
            Some(&Value::String("202401".into())),
            Some(&Value::String("5".into())),
            Some(&Value::String("5".into())),
            "%Y%m",
        );
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(time, NaiveTime::from_hms_opt(0, 5, 0));
        let (_, bad) = reconstruct_datetime(None, None, Some(&Value::Integer(2460)), "%Y%m");
        assert_eq!(bad, None);
    }

    #[test]
    fn test_apply_spec_adds_columns() {
        let mut table = Table::from_columns(
            "details",
            vec![
                Column::from_i64("begin_yearmonth", vec![Some(202403), Some(202302)]),
                Column::from_i64("begin_day", vec![Some(15), Some(31)]),
                Column::from_i64("begin_time", vec![Some(1200), Some(99)]),
            ],
        )
        .unwrap();
        let spec = DateTimeSpec::new("BEGIN_YEARMONTH", "BEGIN_DAY", Some("BEGIN_TIME"), "begin");
        let defects = apply_datetime_spec(&mut table, &spec).unwrap();

        let dates = table.column("begin_date").unwrap();
        assert_eq!(dates.dtype(), ColumnType::Date);
        assert_eq!(dates.null_count(), 1);
        let times = table.column("begin_time").unwrap();
        assert_eq!(times.dtype(), ColumnType::Time);
        assert_eq!(times.null_count(), 1);
        assert_eq!(
            defects,
            vec![
                Defect::DateUnparsed {
                    column: "begin_date".to_string(),
                    count: 1,
                },
                Defect::TimeUnparsed {
                    column: "begin_time".to_string(),
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_apply_spec_with_output_layout() {
        let mut table = Table::from_columns(
            "details",
            vec![
                Column::from_i64("end_yearmonth", vec![Some(202403)]),
                Column::from_i64("end_day", vec![Some(1)]),
            ],
        )
        .unwrap();
        let mut spec = DateTimeSpec::new("end_yearmonth", "end_day", None, "end");
        spec.output_layout = Some("%d/%m/%Y".to_string());
        let defects = apply_datetime_spec(&mut table, &spec).unwrap();
        assert!(defects.is_empty());
        assert_eq!(
            table.column("end_date").unwrap().get(0),
            Some(&Value::String("01/03/2024".into()))
        );
        assert!(!table.has_column("end_time"));
    }

    #[test]
    fn test_apply_spec_missing_parts_is_noop() {
        let mut table = Table::from_columns(
            "details",
            vec![Column::from_i64("begin_day", vec![Some(1)])],
        )
        .unwrap();
        let spec = DateTimeSpec::new("begin_yearmonth", "begin_day", None, "begin");
        assert!(apply_datetime_spec(&mut table, &spec).unwrap().is_empty());
        assert_eq!(table.width(), 1);
    }

    proptest! {
        #[test]
        fn prop_parse_monetary_is_total(raw in "\\PC{0,16}") {
            let value = parse_monetary_str(&raw);
            prop_assert!(value.is_finite());
            prop_assert!(value >= 0.0);
        }

        #[test]
        fn prop_suffix_scales(n in 0u32..100_000) {
            prop_assert_eq!(parse_monetary_str(&format!("{n}K")), f64::from(n) * 1e3);
        }
    }
}
