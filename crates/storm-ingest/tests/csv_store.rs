//! Saving and reloading tables through `CsvStore`.

use std::io::Write;

use chrono::NaiveDate;
use storm_ingest::{CsvStore, IngestError, SourceKind, TableSink, TableSource, detect_source_kind};
use storm_model::{Column, ColumnType, Table, Value};
use tempfile::{NamedTempFile, TempDir};

#[test]
fn saved_table_reloads_with_types() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("storm_events_clean.csv");

    let table = Table::from_columns(
        "merged",
        vec![
            Column::from_i64("event_id", vec![Some(10), Some(11)]),
            Column::from_f64("damage_property", vec![Some(25_000.5), Some(0.0)]),
            Column::new(
                "begin_date",
                ColumnType::Date,
                vec![
                    NaiveDate::from_ymd_opt(2024, 5, 3).map(Value::Date),
                    NaiveDate::from_ymd_opt(2024, 5, 4).map(Value::Date),
                ],
            ),
            Column::from_strings("state", vec![Some("TEXAS"), Some("unknown")]),
            Column::new(
                "is_event_id_duplicated",
                ColumnType::Boolean,
                vec![Some(Value::Boolean(false)), Some(Value::Boolean(true))],
            ),
        ],
    )
    .unwrap();

    let store = CsvStore::new();
    store.save(&table, &path).unwrap();
    let reloaded = store.load(&path).unwrap();

    assert!(reloaded.defects.is_empty());
    let reloaded = reloaded.table;
    assert_eq!(reloaded.name(), "storm_events_clean");
    assert_eq!(reloaded.column_names(), table.column_names());
    assert_eq!(reloaded.column("event_id").unwrap().dtype(), ColumnType::Integer);
    assert_eq!(reloaded.column("damage_property").unwrap().dtype(), ColumnType::Float);
    assert_eq!(reloaded.column("begin_date").unwrap().dtype(), ColumnType::Date);
    assert_eq!(
        reloaded.column("is_event_id_duplicated").unwrap().dtype(),
        ColumnType::Boolean
    );
    assert_eq!(reloaded.cell(0, 1), Some(&Value::Float(25_000.5)));
    assert_eq!(detect_source_kind(&reloaded), SourceKind::Details);
}

#[test]
fn missing_file_is_fatal() {
    let err = CsvStore::new()
        .load(std::path::Path::new("/nonexistent/StormEvents_details.csv"))
        .unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn empty_file_is_fatal() {
    let file = NamedTempFile::new().unwrap();
    let err = CsvStore::new().load(file.path()).unwrap_err();
    assert!(matches!(err, IngestError::EmptyCsv { .. }));
}

#[test]
fn header_only_file_loads_empty_table() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "EVENT_ID,FATALITY_TYPE").unwrap();
    let ingested = CsvStore::new().load(file.path()).unwrap();
    assert_eq!(ingested.table.height(), 0);
    assert_eq!(ingested.table.width(), 2);
    assert_eq!(detect_source_kind(&ingested.table), SourceKind::Fatalities);
}
