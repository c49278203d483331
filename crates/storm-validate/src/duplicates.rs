//! Exact and partial key duplicates.
//!
//! "Keep first" counts rows whose key already appeared; "keep all" lists every
//! row whose key is shared. Null keys are equal to each other for both, but
//! are left out when looking for the columns that disagree.

use std::collections::{BTreeMap, HashMap, HashSet};

use storm_model::{Table, Value};
use storm_transform::key_texts;

/// Rows shown in the partial-duplicate sample by default.
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Duplicate statistics for one key column.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateSummary {
    pub key: String,
    /// Rows whose key already appeared earlier.
    pub duplicated_count: usize,
    /// Rows whose key is shared with at least one other row.
    pub partial_duplicates: Vec<usize>,
    /// Columns where some key group holds more than one distinct value.
    pub columns_with_differences: Vec<String>,
    /// The first partial-duplicate rows.
    pub sample: Table,
}

impl DuplicateSummary {
    pub fn partial_count(&self) -> usize {
        self.partial_duplicates.len()
    }
}

/// Outcome of [`analyze_duplicates`].
#[derive(Debug, Clone, PartialEq)]
pub enum DuplicateAnalysis {
    KeyNotFound { key: String },
    Analyzed(DuplicateSummary),
}

impl DuplicateAnalysis {
    pub fn summary(&self) -> Option<&DuplicateSummary> {
        match self {
            Self::Analyzed(summary) => Some(summary),
            Self::KeyNotFound { .. } => None,
        }
    }
}

/// Analyze duplicates of `key` in `table`.
pub fn analyze_duplicates(table: &Table, key: &str, sample_size: usize) -> DuplicateAnalysis {
    let Some(keys) = key_texts(table, key) else {
        return DuplicateAnalysis::KeyNotFound {
            key: key.to_string(),
        };
    };

    let mut seen = HashSet::new();
    let duplicated_count = keys.iter().filter(|k| !seen.insert(*k)).count();

    let mut counts: HashMap<&Option<String>, usize> = HashMap::new();
    for k in &keys {
        *counts.entry(k).or_default() += 1;
    }
    let partial_duplicates: Vec<usize> = keys
        .iter()
        .enumerate()
        .filter(|(_, k)| counts.get(k).copied().unwrap_or(0) > 1)
        .map(|(row, _)| row)
        .collect();

    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for &row in &partial_duplicates {
        if let Some(k) = &keys[row] {
            groups.entry(k.as_str()).or_default().push(row);
        }
    }

    let columns_with_differences = table
        .columns()
        .iter()
        .filter(|column| {
            groups.values().any(|rows| {
                let distinct: HashSet<String> = rows
                    .iter()
                    .filter_map(|&row| column.get(row).map(Value::canonical))
                    .collect();
                distinct.len() > 1
            })
        })
        .map(|column| column.name().to_string())
        .collect();

    let shown = partial_duplicates.len().min(sample_size);
    let sample = table.take_rows(&partial_duplicates[..shown]);

    DuplicateAnalysis::Analyzed(DuplicateSummary {
        key: table
            .column(key)
            .map_or_else(|| key.to_string(), |c| c.name().to_string()),
        duplicated_count,
        partial_duplicates,
        columns_with_differences,
        sample,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use storm_model::Column;

    fn fatalities() -> Table {
        Table::from_columns(
            "fatalities",
            vec![
                Column::from_strings("EVENT_ID", vec![Some("E1"), Some("E1"), Some("E2"), None, None]),
                Column::from_i64("FATALITY_AGE", vec![Some(30), Some(45), Some(50), Some(1), Some(2)]),
                Column::from_strings("FATALITY_SEX", vec![Some("M"), Some("M"), Some("F"), None, None]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_differences_exclude_null_keys() {
        let analysis = analyze_duplicates(&fatalities(), "EVENT_ID", DEFAULT_SAMPLE_SIZE);
        let summary = analysis.summary().unwrap();
        assert_eq!(summary.duplicated_count, 2);
        assert_eq!(summary.partial_duplicates, vec![0, 1, 3, 4]);
        assert_eq!(summary.columns_with_differences, vec!["FATALITY_AGE"]);
        assert_eq!(summary.sample.height(), 4);
    }

    #[test]
    fn test_sample_is_truncated() {
        let analysis = analyze_duplicates(&fatalities(), "event_id", 1);
        let summary = analysis.summary().unwrap();
        assert_eq!(summary.sample.height(), 1);
        assert_eq!(summary.key, "EVENT_ID");
    }

    #[test]
    fn test_unique_keys() {
        let table = Table::from_columns(
            "details",
            vec![Column::from_i64("event_id", vec![Some(1), Some(2)])],
        )
        .unwrap();
        let analysis = analyze_duplicates(&table, "event_id", 10);
        let summary = analysis.summary().unwrap();
        assert_eq!(summary.duplicated_count, 0);
        assert!(summary.partial_duplicates.is_empty());
        assert!(summary.columns_with_differences.is_empty());
        assert_eq!(summary.sample.height(), 0);
    }

    #[test]
    fn test_missing_key_is_not_an_error() {
        let analysis = analyze_duplicates(&fatalities(), "episode_id", 10);
        assert_eq!(
            analysis,
            DuplicateAnalysis::KeyNotFound {
                key: "episode_id".to_string()
            }
        );
    }
}
