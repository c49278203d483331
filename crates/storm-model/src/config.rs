//! Pipeline configuration.
//!
//! Defaults reproduce the storm event processing: two distinct null-drop
//! thresholds (0.5 on the details table before the merge, 0.9 on the master
//! table), `EVENT_ID` as the key and the begin/end date-time triples.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// One composite date/time reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTimeSpec {
    /// Column holding `YYYYMM` (or whatever `date_layout` describes).
    pub year_month_column: String,
    /// Day-of-month column, zero-padded to two digits before parsing.
    pub day_column: String,
    /// Optional `HHMM` column.
    #[serde(default)]
    pub time_column: Option<String>,
    /// Prefix of the `<prefix>_date` and `<prefix>_time` output columns.
    pub output_prefix: String,
    /// chrono layout of the year-month column; `%d` is appended.
    #[serde(default = "default_date_layout")]
    pub date_layout: String,
    /// When set, the date column is emitted as text in this layout.
    #[serde(default)]
    pub output_layout: Option<String>,
}

impl DateTimeSpec {
    pub fn new(
        year_month_column: impl Into<String>,
        day_column: impl Into<String>,
        time_column: Option<&str>,
        output_prefix: impl Into<String>,
    ) -> Self {
        Self {
            year_month_column: year_month_column.into(),
            day_column: day_column.into(),
            time_column: time_column.map(str::to_string),
            output_prefix: output_prefix.into(),
            date_layout: default_date_layout(),
            output_layout: None,
        }
    }

    pub fn date_column_name(&self) -> String {
        format!("{}_date", self.output_prefix)
    }

    pub fn time_column_name(&self) -> String {
        format!("{}_time", self.output_prefix)
    }
}

fn default_date_layout() -> String {
    "%Y%m".to_string()
}

/// A latitude/longitude column pair checked against coordinate bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatePair {
    pub latitude: String,
    pub longitude: String,
}

impl CoordinatePair {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }
}

/// Every tunable of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Event key shared by the three sources.
    pub key_column: String,
    /// Null-drop threshold applied to the details table before the merge.
    pub source_drop_threshold: f64,
    /// Null-drop threshold applied to the merged table.
    pub final_drop_threshold: f64,
    /// Columns holding `<number>[K|M|B]` amounts.
    pub monetary_columns: Vec<String>,
    pub datetime_specs: Vec<DateTimeSpec>,
    /// Details columns removed before cleaning.
    pub details_drop_columns: Vec<String>,
    /// Locations columns removed before cleaning.
    pub locations_drop_columns: Vec<String>,
    /// Fill for non-numeric nulls.
    pub fill_token: String,
    /// Fill for missing fatality ages.
    pub fatality_age_fill: i64,
    /// Boolean column marking rows whose key is shared.
    pub duplicate_flag_column: String,
    /// Rows shown in the partial-duplicate sample.
    pub sample_size: usize,
    pub coordinate_pairs: Vec<CoordinatePair>,
    /// Columns that must be non-negative.
    pub damage_columns: Vec<String>,
    pub begin_date_column: String,
    pub end_date_column: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            key_column: "EVENT_ID".to_string(),
            source_drop_threshold: 0.5,
            final_drop_threshold: 0.9,
            monetary_columns: vec!["DAMAGE_PROPERTY".to_string(), "DAMAGE_CROPS".to_string()],
            datetime_specs: vec![
                DateTimeSpec::new("BEGIN_YEARMONTH", "BEGIN_DAY", Some("BEGIN_TIME"), "begin"),
                DateTimeSpec::new("END_YEARMONTH", "END_DAY", Some("END_TIME"), "end"),
            ],
            details_drop_columns: ["STATE_FIPS", "CZ_FIPS", "DATA_SOURCE", "WFO", "CATEGORY"]
                .into_iter()
                .map(String::from)
                .collect(),
            locations_drop_columns: vec!["LAT2".to_string(), "LON2".to_string()],
            fill_token: "unknown".to_string(),
            fatality_age_fill: -1,
            duplicate_flag_column: "is_event_id_duplicated".to_string(),
            sample_size: 10,
            coordinate_pairs: vec![
                CoordinatePair::new("BEGIN_LAT", "BEGIN_LON"),
                CoordinatePair::new("END_LAT", "END_LON"),
            ],
            damage_columns: vec!["DAMAGE_PROPERTY".to_string(), "DAMAGE_CROPS".to_string()],
            begin_date_column: "begin_date".to_string(),
            end_date_column: "end_date".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ModelError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn with_key_column(mut self, key: impl Into<String>) -> Self {
        self.key_column = key.into();
        self
    }

    #[must_use]
    pub fn with_source_drop_threshold(mut self, threshold: f64) -> Self {
        self.source_drop_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_final_drop_threshold(mut self, threshold: f64) -> Self {
        self.final_drop_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_keep_both_thresholds() {
        let config = PipelineConfig::default();
        assert_eq!(config.source_drop_threshold, 0.5);
        assert_eq!(config.final_drop_threshold, 0.9);
        assert_eq!(config.key_column, "EVENT_ID");
        assert_eq!(config.datetime_specs[0].date_column_name(), "begin_date");
        assert_eq!(config.datetime_specs[1].time_column_name(), "end_time");
    }

    #[test]
    fn partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"key_column": "event_id", "final_drop_threshold": 0.8}}"#).unwrap();
        let config = PipelineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.key_column, "event_id");
        assert_eq!(config.final_drop_threshold, 0.8);
        assert_eq!(config.source_drop_threshold, 0.5);
        assert_eq!(config.sample_size, 10);
    }

    #[test]
    fn datetime_spec_layout_defaults() {
        let spec: DateTimeSpec = serde_json::from_str(
            r#"{"year_month_column": "YM", "day_column": "D", "output_prefix": "x"}"#,
        )
        .unwrap();
        assert_eq!(spec.date_layout, "%Y%m");
        assert!(spec.time_column.is_none());
    }

    #[test]
    fn invalid_json_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = PipelineConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ModelError::ConfigParse { .. }));
    }
}
