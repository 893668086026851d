//! Spreadsheet sources (xlsx, xls, ods).

use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use cardio_common::{ColumnData, format_numeric, frame_from_columns};
use polars::prelude::DataFrame;

use crate::columns::normalize_headers;
use crate::error::{IngestError, Result};

/// Reads one sheet as an all-text frame.
///
/// `header_row` counts from the sheet's first row, even when the rows above
/// the used area are blank. Rows above it are skipped. Empty cells, error cells and blank
/// strings become nulls. Numeric cells are formatted without trailing zeros.
pub fn read_sheet_table(path: &Path, header_row: usize, sheet: Option<&str>) -> Result<DataFrame> {
    std::fs::metadata(path).map_err(|e| IngestError::open(path, e))?;

    let workbook_error = |message: String| IngestError::Workbook {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| workbook_error("workbook has no sheets".to_string()))?,
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| workbook_error(format!("sheet '{sheet_name}': {e}")))?;

    range_table(path, &range, header_row)
}

/// Builds the frame from a sheet's used area. Calamine ranges start at the
/// first non-empty cell, so `header_row` is shifted by the range's origin.
fn range_table(path: &Path, range: &Range<Data>, header_row: usize) -> Result<DataFrame> {
    let no_header = || IngestError::NoHeader {
        path: path.to_path_buf(),
        row: header_row,
    };
    let first_used = range.start().map_or(0, |(row, _)| row as usize);
    let skip = header_row.checked_sub(first_used).ok_or_else(no_header)?;

    let mut rows = range.rows().skip(skip);
    let header = rows.next().ok_or_else(no_header)?;
    let raw_names: Vec<String> = header
        .iter()
        .map(|cell| cell_text(cell).unwrap_or_default())
        .collect();
    if raw_names.iter().all(String::is_empty) {
        return Err(no_header());
    }

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); raw_names.len()];
    for row in rows {
        for (idx, values) in columns.iter_mut().enumerate() {
            values.push(row.get(idx).and_then(cell_text));
        }
    }

    let named = normalize_headers(&raw_names)
        .into_iter()
        .zip(columns)
        .map(|(name, values)| (name, ColumnData::Text(values)))
        .collect();
    Ok(frame_from_columns(named)?)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Data::Float(v) => Some(format_numeric(*v)),
        Data::Int(v) => Some(v.to_string()),
        Data::Bool(v) => Some(v.to_string()),
        other => Some(other.to_string()),
    }
}
