//! Quality and profile reports.

use std::collections::HashSet;
use std::path::Path;

use storm_model::{DefectLog, PipelineConfig, Table, Value};
use storm_validate::{
    ConsistencyOptions, ConsistencyReport, DEFAULT_SAMPLE_SIZE, DuplicateAnalysis,
    analyze_duplicates, check_consistency,
};

use crate::error::{ReportError, Result};
use crate::render::{render_rows, render_statistics};
use crate::stats::describe;

/// What the quality report checks.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub key_column: String,
    /// Rows shown in the partial duplicate sample.
    pub sample_size: usize,
    pub consistency: ConsistencyOptions,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            key_column: PipelineConfig::default().key_column,
            sample_size: DEFAULT_SAMPLE_SIZE,
            consistency: ConsistencyOptions::default(),
        }
    }
}

impl ReportOptions {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            key_column: config.key_column.clone(),
            sample_size: config.sample_size,
            consistency: ConsistencyOptions::from_config(config),
        }
    }
}

/// A titled block of report text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub title: String,
    pub body: String,
}

impl ReportSection {
    fn new(title: &str, lines: Vec<String>) -> Self {
        Self {
            title: title.to_string(),
            body: lines.join("\n"),
        }
    }
}

/// Rendered report sections in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityReport {
    pub sections: Vec<ReportSection>,
    issues: Option<usize>,
}

impl QualityReport {
    /// Section by title.
    pub fn section(&self, title: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// Columns with nulls, duplicate keys and consistency violations found by
    /// [`generate_report`]. Profile reports carry no verdict.
    pub fn issue_count(&self) -> Option<usize> {
        self.issues
    }

    /// Full report text. Identical reports render to identical text.
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|section| format!("=== {} ===\n{}\n", section.title, section.body))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn general_summary(table: &Table) -> ReportSection {
    ReportSection::new(
        "General Summary",
        vec![
            format!(
                "Dimensions: {} rows, {} columns.",
                table.height(),
                table.width()
            ),
            String::new(),
            "Columns:".to_string(),
            table.column_names().join(", "),
        ],
    )
}

fn null_percentages(table: &Table) -> ReportSection {
    let lines: Vec<String> = table
        .columns()
        .iter()
        .filter(|column| column.null_count() > 0)
        .map(|column| {
            format!(
                "{}: {:.2}% ({} of {})",
                column.name(),
                column.null_fraction() * 100.0,
                column.null_count(),
                column.len()
            )
        })
        .collect();
    if lines.is_empty() {
        ReportSection::new("Null Values", vec!["No null values.".to_string()])
    } else {
        ReportSection::new("Null Values", lines)
    }
}

fn duplicate_values(analysis: &DuplicateAnalysis) -> ReportSection {
    let summary = match analysis {
        DuplicateAnalysis::KeyNotFound { key } => {
            return ReportSection::new(
                "Duplicate Values",
                vec![format!("Key column '{key}' not found.")],
            );
        }
        DuplicateAnalysis::Analyzed(summary) => summary,
    };

    let mut lines = vec![format!(
        "Rows repeating an earlier '{}': {}",
        summary.key, summary.duplicated_count
    )];
    lines.push(String::new());
    if summary.partial_count() == 0 {
        lines.push("No partial duplicates.".to_string());
        return ReportSection::new("Duplicate Values", lines);
    }

    lines.push(format!(
        "Partial duplicates: {} row(s) share a '{}' value.",
        summary.partial_count(),
        summary.key
    ));
    let differing = if summary.columns_with_differences.is_empty() {
        "(none)".to_string()
    } else {
        summary.columns_with_differences.join(", ")
    };
    lines.push(format!("Columns with differences: {differing}"));
    lines.push(format!(
        "Sample ({} of {} rows):",
        summary.sample.height(),
        summary.partial_count()
    ));
    lines.push(render_rows(&summary.sample));
    ReportSection::new("Duplicate Values", lines)
}

fn checked(count: Option<usize>) -> String {
    count.map_or_else(|| "not checked".to_string(), |c| c.to_string())
}

fn out_of_range(report: &ConsistencyReport) -> ReportSection {
    let mut lines = Vec::new();
    for pair in &report.coordinates {
        lines.push(format!(
            "{} outside [-90, 90]: {}",
            pair.latitude,
            checked(pair.latitude_out_of_range)
        ));
        lines.push(format!(
            "{} outside [-180, 180]: {}",
            pair.longitude,
            checked(pair.longitude_out_of_range)
        ));
    }
    for damage in &report.damages {
        lines.push(format!(
            "{} negative: {}",
            damage.column,
            checked(damage.negative)
        ));
    }
    lines.push(format!(
        "Begin date after end date: {}",
        checked(report.begin_after_end)
    ));
    ReportSection::new("Out-of-Range Values", lines)
}

fn statistics(table: &Table) -> ReportSection {
    let summaries = describe(table);
    if summaries.is_empty() {
        ReportSection::new("Statistics", vec!["No numeric columns.".to_string()])
    } else {
        ReportSection::new("Statistics", vec![render_statistics(&summaries)])
    }
}

fn cleaning_log(defects: &DefectLog) -> ReportSection {
    if defects.is_empty() {
        return ReportSection::new(
            "Cleaning Log",
            vec!["No corrections were needed.".to_string()],
        );
    }
    let mut lines = vec![format!(
        "{} correction(s), {} warning(s).",
        defects.len(),
        defects.warning_count()
    )];
    lines.extend(defects.entries().iter().map(|entry| {
        let level = if entry.defect.is_warning() {
            "warning"
        } else {
            "info"
        };
        format!("[{}] {}: {}", entry.stage, level, entry.defect)
    }));
    ReportSection::new("Cleaning Log", lines)
}

/// Build the quality report of `table`.
///
/// Sections come in a fixed order: general summary, nulls, duplicates,
/// out-of-range values, statistics, the cleaning log and a closing verdict.
pub fn generate_report(
    table: &Table,
    options: &ReportOptions,
    defects: &DefectLog,
) -> QualityReport {
    let duplicates = analyze_duplicates(table, &options.key_column, options.sample_size);
    let consistency = check_consistency(table, &options.consistency);

    let null_columns = table.columns().iter().filter(|c| c.null_count() > 0).count();
    let duplicate_keys = duplicates.summary().map_or(0, |s| s.duplicated_count);
    let issues = null_columns + duplicate_keys + consistency.total_violations();

    let verdict = if issues == 0 {
        "No problems found.".to_string()
    } else {
        "The file contains problems.".to_string()
    };

    QualityReport {
        sections: vec![
            general_summary(table),
            null_percentages(table),
            duplicate_values(&duplicates),
            out_of_range(&consistency),
            statistics(table),
            cleaning_log(defects),
            ReportSection::new("Report Generated", vec![verdict]),
        ],
        issues: Some(issues),
    }
}

/// Build the profile of a single preprocessed file: summary, null counts
/// and distinct non-null values per column.
pub fn profile_report(table: &Table) -> QualityReport {
    let nulls = table
        .columns()
        .iter()
        .map(|column| format!("{}: {}", column.name(), column.null_count()))
        .collect();
    let cardinality = table
        .columns()
        .iter()
        .map(|column| {
            let distinct: HashSet<String> = column
                .values()
                .iter()
                .flatten()
                .map(Value::canonical)
                .collect();
            format!("{}: {}", column.name(), distinct.len())
        })
        .collect();

    QualityReport {
        sections: vec![
            general_summary(table),
            ReportSection::new("Null Values per Column", nulls),
            ReportSection::new("Column Cardinality", cardinality),
        ],
        issues: None,
    }
}

/// Write the rendered report to `path`.
pub fn write_report(report: &QualityReport, path: &Path) -> Result<()> {
    std::fs::write(path, report.render()).map_err(|e| ReportError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), sections = report.sections.len(), "wrote report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use storm_model::{Column, Defect};

    fn merged() -> Table {
        Table::from_columns(
            "merged",
            vec![
                Column::from_i64("event_id", vec![Some(1), Some(1), Some(2)]),
                Column::from_i64("fatality_age", vec![Some(30), Some(45), None]),
                Column::from_f64("begin_lat", vec![Some(35.0), Some(35.0), Some(91.0)]),
                Column::from_strings("state", vec![Some("TEXAS"), Some("TEXAS"), Some("KANSAS")]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_section_order() {
        let report = generate_report(&merged(), &ReportOptions::default(), &DefectLog::new());
        let titles: Vec<&str> = report.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "General Summary",
                "Null Values",
                "Duplicate Values",
                "Out-of-Range Values",
                "Statistics",
                "Cleaning Log",
                "Report Generated",
            ]
        );
    }

    #[test]
    fn test_findings_are_reported() {
        let report = generate_report(&merged(), &ReportOptions::default(), &DefectLog::new());

        let nulls = &report.section("Null Values").unwrap().body;
        assert_eq!(nulls, "fatality_age: 33.33% (1 of 3)");

        let duplicates = &report.section("Duplicate Values").unwrap().body;
        assert!(duplicates.starts_with("Rows repeating an earlier 'event_id': 1"));
        assert!(duplicates.contains("Partial duplicates: 2 row(s)"));
        assert!(duplicates.contains("Columns with differences: fatality_age"));

        let range = &report.section("Out-of-Range Values").unwrap().body;
        assert!(range.contains("BEGIN_LAT outside [-90, 90]: 1"));
        assert!(range.contains("END_LAT outside [-90, 90]: not checked"));
        assert!(range.contains("Begin date after end date: not checked"));

        // one null column, one duplicate key, one latitude
        assert_eq!(report.issue_count(), Some(3));
        assert_eq!(
            report.section("Report Generated").unwrap().body,
            "The file contains problems."
        );
    }

    #[test]
    fn test_missing_key_and_clean_verdict() {
        let table = Table::from_columns(
            "clean",
            vec![Column::from_strings("state", vec![Some("TEXAS")])],
        )
        .unwrap();
        let report = generate_report(&table, &ReportOptions::default(), &DefectLog::new());
        assert_eq!(
            report.section("Duplicate Values").unwrap().body,
            "Key column 'EVENT_ID' not found."
        );
        assert_eq!(report.section("Statistics").unwrap().body, "No numeric columns.");
        assert_eq!(report.issue_count(), Some(0));
        assert_eq!(
            report.section("Report Generated").unwrap().body,
            "No problems found."
        );
    }

    #[test]
    fn test_cleaning_log_lists_defects_in_order() {
        let mut log = DefectLog::new();
        log.extend(
            "details",
            vec![
                Defect::MonetaryMalformed {
                    column: "damage_property".to_string(),
                    count: 2,
                },
                Defect::EmptyColumnDropped {
                    column: "tor_other_wfo".to_string(),
                },
            ],
        );
        let report = generate_report(&merged(), &ReportOptions::default(), &log);
        let body = &report.section("Cleaning Log").unwrap().body;
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], "2 correction(s), 1 warning(s).");
        assert!(lines[1].starts_with("[details] warning: "));
        assert!(lines[2].starts_with("[details] info: "));
    }

    #[test]
    fn test_render_is_deterministic() {
        let table = merged();
        let options = ReportOptions::default();
        let first = generate_report(&table, &options, &DefectLog::new()).render();
        let second = generate_report(&table, &options, &DefectLog::new()).render();
        assert_eq!(first, second);
        assert!(first.starts_with("=== General Summary ===\n"));
        assert!(first.ends_with("The file contains problems.\n"));
    }

    #[test]
    fn test_profile_report_snapshot() {
        let table = Table::from_columns(
            "storm_events_details",
            vec![
                Column::from_i64("event_id", vec![Some(1), Some(2), Some(3)]),
                Column::from_strings("state", vec![Some("TEXAS"), None, Some("TEXAS")]),
            ],
        )
        .unwrap();
        let report = profile_report(&table);
        assert_eq!(report.issue_count(), None);
        insta::assert_snapshot!(report.render(), @r"
        === General Summary ===
        Dimensions: 3 rows, 2 columns.

        Columns:
        event_id, state

        === Null Values per Column ===
        event_id: 0
        state: 1

        === Column Cardinality ===
        event_id: 3
        state: 1
        ");
    }
}
