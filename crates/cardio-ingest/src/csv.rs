//! CSV sources.

use std::path::Path;

use polars::prelude::*;

use crate::columns::rename_normalized;
use crate::error::{IngestError, Result};

/// Reads a CSV file as an all-text frame.
///
/// `header_row` lines are skipped before the header. Schema inference is
/// disabled so that codes such as `NA` (Namibia) or years written as
/// `2000.0` reach the cleaners untouched.
pub fn read_csv_table(path: &Path, header_row: usize) -> Result<DataFrame> {
    std::fs::metadata(path).map_err(|e| IngestError::open(path, e))?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_skip_rows(header_row)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(SerReader::finish)
        .map_err(|e| IngestError::csv(path, e))?;

    if df.width() == 0 {
        return Err(IngestError::NoHeader {
            path: path.to_path_buf(),
            row: header_row,
        });
    }

    rename_normalized(&df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardio_common::{column_names, text_values};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_every_column_as_text() {
        let file = csv_file("Entity,Code,Year\nNamibia,NA,2000\n");
        let df = read_csv_table(file.path(), 0).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(
            text_values(&df, "Code").unwrap(),
            vec![Some("NA".to_string())]
        );
        assert_eq!(df.column("Year").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn skips_rows_above_header() {
        let file = csv_file("exported by GHO\nindicator: overweight\nLocation,Period\nFrance,2010\n");
        let df = read_csv_table(file.path(), 2).unwrap();
        assert_eq!(column_names(&df), ["Location", "Period"]);
        assert_eq!(df.height(), 1);
    }

    #[test]
    fn normalizes_header_whitespace() {
        let file = csv_file("\u{feff} location_name ,val\nFrance,1.5\n");
        let df = read_csv_table(file.path(), 0).unwrap();
        assert_eq!(column_names(&df), ["location_name", "val"]);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_csv_table(Path::new("/nonexistent/GBD_INCIDENCE.csv"), 0).unwrap_err();
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }
}
