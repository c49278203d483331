//! CSV reading: pre-load file checks and raw text extraction.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use polars::prelude::*;

use crate::error::{IngestError, Result};

/// Maximum file size for CSV loading (500 MB default).
pub const MAX_CSV_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// A CSV file read as text: column names and one optional string per cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCsv {
    pub names: Vec<String>,
    pub columns: Vec<Vec<Option<String>>>,
}

impl RawCsv {
    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Check file size before loading.
pub fn check_file_size(path: &Path) -> Result<()> {
    check_file_size_with_limit(path, MAX_CSV_FILE_SIZE)
}

/// Check file size against a custom limit.
pub fn check_file_size_with_limit(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }

    Ok(())
}

/// Reject UTF-16 input. A UTF-8 BOM is accepted.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = open(path)?;

    let mut buffer = [0u8; 4];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read >= 2 {
        if buffer[0..2] == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer[0..2] == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }

    Ok(())
}

/// Read the header line, without a BOM. Fails on an empty file or a blank header.
pub fn read_header_line(path: &Path) -> Result<String> {
    let mut reader = BufReader::new(open(path)?);
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    if read == 0 {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let header = line
        .strip_prefix('\u{feff}')
        .unwrap_or(&line)
        .trim_end_matches(['\r', '\n'])
        .to_string();
    if header.split(',').all(|field| field.trim().trim_matches('"').is_empty()) {
        return Err(IngestError::NoHeaderDetected {
            path: path.to_path_buf(),
        });
    }
    Ok(header)
}

/// Read a CSV file with a single header row, every column as text.
pub fn read_raw_csv(path: &Path) -> Result<RawCsv> {
    read_header_line(path)?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if df.width() > 500 {
        tracing::warn!(
            path = %path.display(),
            columns = df.width(),
            "Dataset has more than 500 columns - may impact performance"
        );
    }

    let mut raw = RawCsv::default();
    for column in df.get_columns() {
        let text = column.cast(&DataType::String)?;
        let values = text
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        raw.names.push(column.name().to_string());
        raw.columns.push(values);
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_read_raw_csv() {
        let file = create_temp_csv("EVENT_ID,DAMAGE_PROPERTY\n1,10K\n2,\n");
        let raw = read_raw_csv(file.path()).unwrap();
        assert_eq!(raw.names, vec!["EVENT_ID", "DAMAGE_PROPERTY"]);
        assert_eq!(raw.height(), 2);
        assert_eq!(raw.columns[1][0].as_deref(), Some("10K"));
    }

    #[test]
    fn test_header_with_bom() {
        let file = create_temp_csv("\u{feff}A,B\n1,2\n");
        assert_eq!(read_header_line(file.path()).unwrap(), "A,B");
    }

    #[test]
    fn test_empty_file() {
        let file = create_temp_csv("");
        assert!(matches!(
            read_header_line(file.path()),
            Err(IngestError::EmptyCsv { .. })
        ));
    }

    #[test]
    fn test_blank_header() {
        let file = create_temp_csv(" , \n1,2\n");
        assert!(matches!(
            read_header_line(file.path()),
            Err(IngestError::NoHeaderDetected { .. })
        ));
    }

    #[test]
    fn test_utf16_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xFE, b'A', 0]).unwrap();
        assert!(matches!(
            validate_encoding(file.path()),
            Err(IngestError::UnsupportedEncoding { encoding: "UTF-16 LE", .. })
        ));
    }

    #[test]
    fn test_size_limit() {
        let file = create_temp_csv("A\n1\n");
        assert!(check_file_size(file.path()).is_ok());
        assert!(matches!(
            check_file_size_with_limit(file.path(), 2),
            Err(IngestError::FileTooLarge { max_size: 2, .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            check_file_size(Path::new("/nonexistent/details.csv")),
            Err(IngestError::FileNotFound { .. })
        ));
    }
}
