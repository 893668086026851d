//! Explicit typing of all-text source frames.
//!
//! Source files are read with every column as text. Numeric columns are
//! parsed here; a recognised missing-value marker becomes null and anything
//! else that fails to parse aborts with [`TransformError::InvalidValue`].

use cardio_common::{ColumnData, format_numeric, parse_f64, parse_i64, set_column, text_values};
use cardio_model::Gender;
use polars::prelude::*;

use crate::error::{Result, TransformError};

/// Cell texts treated as a missing observation.
pub const MISSING_MARKERS: &[&str] = &["", "nan", "NaN", "NA", "N/A", "..", "No data", "-"];

fn is_missing(value: &str) -> bool {
    MISSING_MARKERS.contains(&value.trim())
}

fn column_data(df: &DataFrame, column: &str) -> Result<ColumnData> {
    let column_ref = df.column(column).map_err(|_| TransformError::MissingColumn {
        column: column.to_string(),
    })?;
    Ok(ColumnData::from_column(column_ref)?)
}

/// Parses each of `columns` into `Float64`.
pub fn parse_float_columns(df: &mut DataFrame, columns: &[&str]) -> Result<()> {
    for column in columns {
        let values = match column_data(df, column)? {
            ColumnData::Float(values) => values,
            ColumnData::Int(values) => values.into_iter().map(|v| v.map(|x| x as f64)).collect(),
            ColumnData::Text(values) => values
                .into_iter()
                .enumerate()
                .map(|(row, value)| match value {
                    None => Ok(None),
                    Some(text) if is_missing(&text) => Ok(None),
                    Some(text) => parse_f64(&text).map(Some).ok_or_else(|| TransformError::InvalidValue {
                        column: (*column).to_string(),
                        value: text,
                        row,
                        expected: "numeric",
                    }),
                })
                .collect::<Result<_>>()?,
        };
        set_column(df, column, ColumnData::Float(values))?;
    }
    Ok(())
}

/// Parses `column` into `Int64`. Integral floats such as `2000.0` are accepted.
pub fn parse_int_column(df: &mut DataFrame, column: &str) -> Result<()> {
    let invalid = |value: String, row: usize| TransformError::InvalidValue {
        column: column.to_string(),
        value,
        row,
        expected: "integer",
    };
    let values = match column_data(df, column)? {
        ColumnData::Int(values) => values,
        ColumnData::Float(values) => values
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Ok(None),
                Some(v) => {
                    let text = format_numeric(v);
                    parse_i64(&text).map(Some).ok_or_else(|| invalid(text, row))
                }
            })
            .collect::<Result<_>>()?,
        ColumnData::Text(values) => values
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Ok(None),
                Some(text) if is_missing(&text) => Ok(None),
                Some(text) => parse_i64(&text).map(Some).ok_or_else(|| invalid(text, row)),
            })
            .collect::<Result<_>>()?,
    };
    set_column(df, column, ColumnData::Int(values))?;
    Ok(())
}

/// Rewrites `column` to the canonical gender labels (`Male`, `Female`,
/// `Both`). Blank cells stay null; an unrecognised label is fatal.
pub fn parse_gender_column(df: &mut DataFrame, column: &str) -> Result<()> {
    column_data(df, column)?;
    let values = text_values(df, column)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            None => Ok(None),
            Some(text) => text
                .parse::<Gender>()
                .map(|gender| Some(gender.as_str().to_string()))
                .map_err(|_| TransformError::InvalidValue {
                    column: column.to_string(),
                    value: text,
                    row,
                    expected: "gender",
                }),
        })
        .collect::<Result<_>>()?;
    set_column(df, column, ColumnData::Text(values))?;
    Ok(())
}
