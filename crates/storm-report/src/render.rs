//! Plain text tables for report sections.
//!
//! Tables use the markdown preset with no terminal width detection, so the
//! same rows always render to the same text.

use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::{CellAlignment, Table as TextTable};
use storm_model::{Table, Value};

use crate::stats::NumericSummary;

/// Shown for null cells.
pub const NULL_MARKER: &str = "<null>";

const STATISTICS_HEADER: [&str; 9] = [
    "Column", "count", "mean", "std", "min", "25%", "50%", "75%", "max",
];

fn text_table() -> TextTable {
    let mut table = TextTable::new();
    table.load_preset(ASCII_MARKDOWN);
    table
}

fn align_column(table: &mut TextTable, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

/// Two decimals, `NaN` kept visible.
pub fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.2}")
    }
}

/// Every row of `table` with its column names as header.
pub fn render_rows(table: &Table) -> String {
    let mut text = text_table();
    text.set_header(table.column_names());
    for row in 0..table.height() {
        text.add_row(table.row(row).into_iter().map(|cell| {
            cell.as_ref()
                .map_or_else(|| NULL_MARKER.to_string(), Value::canonical)
        }));
    }
    text.to_string()
}

/// One row per numeric column, statistics right aligned.
pub fn render_statistics(summaries: &[NumericSummary]) -> String {
    let mut text = text_table();
    text.set_header(STATISTICS_HEADER);
    for summary in summaries {
        text.add_row(vec![
            summary.column.clone(),
            summary.count.to_string(),
            format_stat(summary.mean),
            format_stat(summary.std),
            format_stat(summary.min),
            format_stat(summary.q25),
            format_stat(summary.median),
            format_stat(summary.q75),
            format_stat(summary.max),
        ]);
    }
    for index in 1..STATISTICS_HEADER.len() {
        align_column(&mut text, index, CellAlignment::Right);
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use storm_model::Column;

    #[test]
    fn test_format_stat() {
        assert_eq!(format_stat(2.5), "2.50");
        assert_eq!(format_stat(f64::NAN), "NaN");
        assert_eq!(format_stat(-0.004), "-0.00");
    }

    #[test]
    fn test_rows_show_null_marker() {
        let table = Table::from_columns(
            "sample",
            vec![
                Column::from_strings("event_id", vec![Some("E1"), Some("E1")]),
                Column::from_i64("fatality_age", vec![Some(30), None]),
            ],
        )
        .unwrap();
        let text = render_rows(&table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("event_id"));
        assert!(lines[0].contains("fatality_age"));
        assert!(lines[2].contains("30"));
        assert!(lines[3].contains(NULL_MARKER));
    }
}
