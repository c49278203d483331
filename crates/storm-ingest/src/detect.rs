//! Classification of a loaded table by its marker columns.

use std::fmt;

use storm_model::Table;

/// Which of the three storm event sources a table looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Details,
    Fatalities,
    Locations,
    Unknown,
}

impl SourceKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Details => "details",
            Self::Fatalities => "fatalities",
            Self::Locations => "locations",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Detect the source kind: `damage_property` marks details, `fatality_type`
/// marks fatalities, `begin_lat` with `begin_location` marks locations.
pub fn detect_source_kind(table: &Table) -> SourceKind {
    if table.has_column("damage_property") {
        SourceKind::Details
    } else if table.has_column("fatality_type") {
        SourceKind::Fatalities
    } else if table.has_column("begin_lat") && table.has_column("begin_location") {
        SourceKind::Locations
    } else {
        SourceKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storm_model::{Column, ColumnType};

    fn table_with(names: &[&str]) -> Table {
        Table::from_columns(
            "t",
            names
                .iter()
                .map(|n| Column::nulls(*n, ColumnType::String, 1))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_detects_each_kind() {
        assert_eq!(
            detect_source_kind(&table_with(&["event_id", "DAMAGE_PROPERTY"])),
            SourceKind::Details
        );
        assert_eq!(
            detect_source_kind(&table_with(&["fatality_type"])),
            SourceKind::Fatalities
        );
        assert_eq!(
            detect_source_kind(&table_with(&["begin_lat", "begin_location"])),
            SourceKind::Locations
        );
        assert_eq!(detect_source_kind(&table_with(&["begin_lat"])), SourceKind::Unknown);
        assert_eq!(SourceKind::Locations.to_string(), "locations");
    }
}
