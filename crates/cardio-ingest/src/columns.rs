//! Header normalization and required-column checks.

use std::collections::BTreeMap;
use std::path::Path;

use cardio_common::{column_names, normalize_whitespace};
use polars::prelude::*;

use crate::error::{IngestError, Result};

/// Collapses whitespace, names blank headers by position, and suffixes
/// repeated names so the frame stays constructible.
pub fn normalize_headers(raw: &[String]) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    raw.iter()
        .enumerate()
        .map(|(idx, name)| {
            let mut normalized = normalize_whitespace(name);
            if normalized.is_empty() {
                normalized = format!("column_{}", idx + 1);
            }
            let count = seen.entry(normalized.clone()).or_insert(0);
            *count += 1;
            if *count > 1 {
                format!("{normalized}_{count}")
            } else {
                normalized
            }
        })
        .collect()
}

/// Rebuilds a frame with [`normalize_headers`] applied to its column names.
pub fn rename_normalized(df: &DataFrame) -> Result<DataFrame> {
    let names = normalize_headers(&column_names(df));
    let columns: Vec<Column> = df
        .get_columns()
        .iter()
        .zip(names)
        .map(|(column, name)| {
            let mut column = column.clone();
            column.rename(name.into());
            column
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Fails on the first absent column.
pub fn require_columns(df: &DataFrame, columns: &[&str], path: &Path) -> Result<()> {
    for column in columns {
        if !has_column(df, column) {
            return Err(IngestError::MissingColumn {
                column: (*column).to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Selects `(source, target)` columns in order and renames them.
pub fn select_renamed(df: &DataFrame, mapping: &[(&str, &str)], path: &Path) -> Result<DataFrame> {
    let sources: Vec<&str> = mapping.iter().map(|(source, _)| *source).collect();
    require_columns(df, &sources, path)?;
    let columns: Vec<Column> = mapping
        .iter()
        .map(|(source, target)| {
            let mut column = df.column(source)?.clone();
            column.rename((*target).into());
            Ok(column)
        })
        .collect::<PolarsResult<_>>()?;
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_blank_and_repeated_headers() {
        let raw = vec![
            " Location ".to_string(),
            String::new(),
            "Location".to_string(),
        ];
        assert_eq!(
            normalize_headers(&raw),
            vec!["Location", "column_2", "Location_2"]
        );
    }

    #[test]
    fn select_renamed_reports_missing_source() {
        let df = df! { "location_name" => ["France"], "val" => ["1.0"] }.unwrap();
        let renamed = select_renamed(
            &df,
            &[("location_name", "Country"), ("val", "IncidenceRate")],
            Path::new("incidence.csv"),
        )
        .unwrap();
        assert_eq!(column_names(&renamed), ["Country", "IncidenceRate"]);

        let err = select_renamed(&df, &[("year", "Year")], Path::new("incidence.csv")).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { ref column, .. } if column == "year"));
    }
}
