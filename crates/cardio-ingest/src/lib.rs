//! Raw source loading.
//!
//! Every source is read as an all-text frame with normalized headers. Typing
//! happens in the cleaners, where the expected shape of each file is known.

pub mod columns;
pub mod csv;
pub mod error;
pub mod sheet;

use std::path::Path;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

pub use columns::{has_column, require_columns, select_renamed};
pub use error::{IngestError, Result};

/// Where the header sits and which sheet to read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadOptions {
    /// Zero-based row holding the column names; rows above it are skipped.
    #[serde(default)]
    pub header_row: usize,
    /// Sheet name for spreadsheets; the first sheet when absent.
    #[serde(default)]
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    pub fn detect(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Spreadsheet),
            _ => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

/// Reads a source file, choosing the reader from the extension.
pub fn read_table(path: &Path, options: &ReadOptions) -> Result<DataFrame> {
    let df = match SourceFormat::detect(path)? {
        SourceFormat::Csv => csv::read_csv_table(path, options.header_row)?,
        SourceFormat::Spreadsheet => {
            sheet::read_sheet_table(path, options.header_row, options.sheet.as_deref())?
        }
    };
    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "source loaded"
    );
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(
            SourceFormat::detect(Path::new("data/GBD_INCIDENCE.csv")).unwrap(),
            SourceFormat::Csv
        );
        assert_eq!(
            SourceFormat::detect(Path::new("data/obesity_data.XLSX")).unwrap(),
            SourceFormat::Spreadsheet
        );
        assert!(matches!(
            SourceFormat::detect(Path::new("data/notes.json")),
            Err(IngestError::UnsupportedFormat { .. })
        ));
    }
}
