//! Validation of a table after the fatalities fan-out.

use storm_model::{Column, Table};
use storm_transform::left_join;
use storm_validate::{ConsistencyOptions, analyze_duplicates, check_consistency};

#[test]
fn fan_out_rows_are_partial_duplicates() {
    let details = Table::from_columns(
        "details",
        vec![
            Column::from_strings("EVENT_ID", vec![Some("E1"), Some("E2")]),
            Column::from_f64("BEGIN_LAT", vec![Some(35.2), Some(-91.0)]),
            Column::from_f64("DAMAGE_PROPERTY", vec![Some(5000.0), Some(0.0)]),
        ],
    )
    .unwrap();
    let fatalities = Table::from_columns(
        "fatalities",
        vec![
            Column::from_strings("EVENT_ID", vec![Some("E1"), Some("E1")]),
            Column::from_i64("FATALITY_AGE", vec![Some(61), Some(64)]),
            Column::from_strings("FATALITY_SEX", vec![Some("F"), Some("F")]),
        ],
    )
    .unwrap();

    let merged = left_join(&details, &fatalities, "EVENT_ID").unwrap();
    let analysis = analyze_duplicates(&merged, "EVENT_ID", 10);
    let summary = analysis.summary().unwrap();
    assert_eq!(summary.duplicated_count, 1);
    assert_eq!(summary.partial_duplicates, vec![0, 1]);
    assert_eq!(summary.columns_with_differences, vec!["FATALITY_AGE"]);

    let report = check_consistency(&merged, &ConsistencyOptions::default());
    assert_eq!(report.coordinates[0].latitude_out_of_range, Some(1));
    assert_eq!(report.coordinates[0].longitude_out_of_range, None);
    assert_eq!(report.damages[0].negative, Some(0));
    assert_eq!(report.total_violations(), 1);
}
