//! Row filters. Each returns the filtered frame and the number of rows removed.

use cardio_common::{int_values, text_values};
use cardio_standards::{ExclusionList, ExclusionScope};
use polars::prelude::*;

use crate::error::{Result, TransformError};
use crate::rows::filter_rows;

fn retain(df: &DataFrame, keep: Vec<bool>) -> Result<(DataFrame, usize)> {
    let removed = keep.iter().filter(|k| !**k).count();
    if removed == 0 {
        return Ok((df.clone(), 0));
    }
    Ok((filter_rows(df, &keep)?, removed))
}

fn text_column(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    if df.column(column).is_err() {
        return Err(TransformError::MissingColumn {
            column: column.to_string(),
        });
    }
    Ok(text_values(df, column)?)
}

/// Drops rows whose `column` names an excluded entity in `scope`.
pub fn drop_excluded(
    df: &DataFrame,
    column: &str,
    exclusions: &ExclusionList,
    scope: ExclusionScope,
) -> Result<(DataFrame, usize)> {
    let keep = text_column(df, column)?
        .iter()
        .map(|name| {
            name.as_deref()
                .is_none_or(|name| !exclusions.is_excluded(name, scope))
        })
        .collect();
    retain(df, keep)
}

/// Drops rows where `column` is null or blank.
pub fn drop_null(df: &DataFrame, column: &str) -> Result<(DataFrame, usize)> {
    let keep = text_column(df, column)?.iter().map(Option::is_some).collect();
    retain(df, keep)
}

/// Keeps rows whose trimmed `column` value equals `value`.
pub fn keep_equal(df: &DataFrame, column: &str, value: &str) -> Result<(DataFrame, usize)> {
    let keep = text_column(df, column)?
        .iter()
        .map(|cell| cell.as_deref().is_some_and(|cell| cell.trim() == value))
        .collect();
    retain(df, keep)
}

/// Drops rows whose integer `column` is one of `years`.
pub fn drop_years(df: &DataFrame, column: &str, years: &[i64]) -> Result<(DataFrame, usize)> {
    if df.column(column).is_err() {
        return Err(TransformError::MissingColumn {
            column: column.to_string(),
        });
    }
    let keep = int_values(df, column)?
        .iter()
        .map(|year| year.is_none_or(|year| !years.contains(&year)))
        .collect();
    retain(df, keep)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df! {
            "Country" => [Some("World"), Some("France"), None, Some("Somalia")],
            "Year" => [1999i64, 2000, 2022, 2001],
            "Dim1ValueCode" => ["SEX_BTSX", "SEX_MLE", "SEX_BTSX", " SEX_BTSX "],
        }
        .unwrap()
    }

    #[test]
    fn drops_entities_by_scope() {
        let exclusions = ExclusionList::new([
            ("World".to_string(), ExclusionScope::Aggregate),
            ("Somalia".to_string(), ExclusionScope::WorldHealth),
        ]);
        let (out, removed) = drop_excluded(&frame(), "Country", &exclusions, ExclusionScope::Aggregate).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(out.height(), 3);
    }

    #[test]
    fn null_years_and_equality_filters() {
        let (_, removed) = drop_null(&frame(), "Country").unwrap();
        assert_eq!(removed, 1);
        let (_, removed) = drop_years(&frame(), "Year", &[1999, 2022, 2023]).unwrap();
        assert_eq!(removed, 2);
        let (out, removed) = keep_equal(&frame(), "Dim1ValueCode", "SEX_BTSX").unwrap();
        assert_eq!(removed, 1);
        assert_eq!(out.height(), 3);
    }

    #[test]
    fn missing_column_is_reported() {
        assert!(matches!(
            drop_null(&frame(), "Code").unwrap_err(),
            TransformError::MissingColumn { .. }
        ));
    }
}
