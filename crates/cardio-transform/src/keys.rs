//! Composite row keys.
//!
//! Keys render each part with [`ColumnData::key_part`], so `2000`, `2000.0`
//! and `"2000"` are the same key and nulls compare equal to each other.

use std::collections::{HashMap, HashSet};

use cardio_common::{ColumnData, column_names};
use polars::prelude::*;
use tracing::debug;

use crate::error::{Result, TransformError};
use crate::rows::filter_rows;

const KEY_SEPARATOR: &str = "\u{1f}";

/// One key per row over `columns`.
pub fn composite_keys(df: &DataFrame, columns: &[&str]) -> Result<Vec<String>> {
    let data = key_columns(df, columns)?;
    Ok((0..df.height())
        .map(|idx| {
            data.iter()
                .map(|column| column.key_part(idx))
                .collect::<Vec<_>>()
                .join(KEY_SEPARATOR)
        })
        .collect())
}

/// Fails with [`TransformError::DuplicateKey`] on the first key that occurs
/// more than once.
pub fn assert_unique_keys(df: &DataFrame, columns: &[&str], stage: &str) -> Result<()> {
    let keys = composite_keys(df, columns)?;
    let mut counts: HashMap<&str, usize> = HashMap::with_capacity(keys.len());
    for key in &keys {
        *counts.entry(key.as_str()).or_default() += 1;
    }
    if let Some(key) = keys.iter().find(|key| counts[key.as_str()] > 1) {
        return Err(TransformError::DuplicateKey {
            stage: stage.to_string(),
            columns: columns.join(", "),
            key: display_key(key),
            count: counts[key.as_str()],
        });
    }
    Ok(())
}

/// Removes rows identical in every column, keeping the first occurrence.
pub fn dedupe_exact(df: &DataFrame) -> Result<(DataFrame, usize)> {
    let names = column_names(df);
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let keys = composite_keys(df, &refs)?;
    let mut seen = HashSet::with_capacity(keys.len());
    let keep: Vec<bool> = keys.into_iter().map(|key| seen.insert(key)).collect();
    let removed = keep.iter().filter(|k| !**k).count();
    if removed == 0 {
        return Ok((df.clone(), 0));
    }
    debug!(removed, "exact duplicate rows removed");
    Ok((filter_rows(df, &keep)?, removed))
}

pub(crate) fn key_columns(df: &DataFrame, columns: &[&str]) -> Result<Vec<ColumnData>> {
    columns
        .iter()
        .map(|name| {
            let column = df.column(name).map_err(|_| TransformError::MissingColumn {
                column: (*name).to_string(),
            })?;
            Ok(ColumnData::from_column(column)?)
        })
        .collect()
}

pub(crate) fn display_key(key: &str) -> String {
    key.split(KEY_SEPARATOR).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df! {
            "Country_Code" => ["USA", "USA", "FRA", "USA"],
            "Year" => [2000i64, 2001, 2000, 2000],
            "GDP" => [Some(1.0), Some(2.0), None, Some(1.0)],
        }
        .unwrap()
    }

    #[test]
    fn numeric_and_text_keys_agree() {
        let ints = df! { "Year" => [2000i64] }.unwrap();
        let floats = df! { "Year" => [2000.0f64] }.unwrap();
        let text = df! { "Year" => ["2000"] }.unwrap();
        let expected = composite_keys(&ints, &["Year"]).unwrap();
        assert_eq!(composite_keys(&floats, &["Year"]).unwrap(), expected);
        assert_eq!(composite_keys(&text, &["Year"]).unwrap(), expected);
    }

    #[test]
    fn duplicate_key_is_reported_with_count() {
        let err = assert_unique_keys(&frame(), &["Country_Code", "Year"], "merge").unwrap_err();
        match err {
            TransformError::DuplicateKey {
                stage, key, count, ..
            } => {
                assert_eq!(stage, "merge");
                assert_eq!(key, "USA, 2000");
                assert_eq!(count, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unique_keys_pass() {
        let df = frame();
        assert!(assert_unique_keys(&df, &["Country_Code", "Year", "GDP"], "clean").is_err());
        let (deduped, removed) = dedupe_exact(&df).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(deduped.height(), 3);
        assert!(assert_unique_keys(&deduped, &["Country_Code", "Year"], "clean").is_ok());
    }

    #[test]
    fn missing_key_column_is_an_error() {
        let err = composite_keys(&frame(), &["Gender"]).unwrap_err();
        assert!(matches!(err, TransformError::MissingColumn { ref column } if column == "Gender"));
    }
}
