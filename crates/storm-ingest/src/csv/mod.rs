//! CSV reading and writing.

mod reader;
mod writer;

pub use reader::{
    MAX_CSV_FILE_SIZE, RawCsv, check_file_size, check_file_size_with_limit, read_header_line,
    read_raw_csv, validate_encoding,
};
pub use writer::{table_to_dataframe, write_csv_table};
