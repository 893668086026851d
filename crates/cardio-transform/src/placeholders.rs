//! Placeholder rows for years a group does not cover.

use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;

use cardio_common::{ColumnData, frame_columns, frame_from_columns, int_values};
use cardio_model::YEAR;
use polars::prelude::*;
use tracing::debug;

use crate::error::{Result, TransformError};
use crate::keys::composite_keys;

/// Appends one row per `(group, year)` for every year in `years` the group
/// lacks.
///
/// Placeholder rows copy `group_columns` and `carry_columns` from the
/// group's first row, take the new `Year`, and leave every other column
/// null. Existing rows are untouched and keep their order; placeholders
/// follow, grouped in first-appearance order. Returns the number of rows
/// added.
pub fn add_missing_years(
    df: &DataFrame,
    group_columns: &[&str],
    carry_columns: &[&str],
    years: RangeInclusive<i64>,
) -> Result<(DataFrame, usize)> {
    if df.column(YEAR).is_err() {
        return Err(TransformError::MissingColumn {
            column: YEAR.to_string(),
        });
    }
    let keys = composite_keys(df, group_columns)?;
    let existing_years = int_values(df, YEAR)?;

    let mut groups: Vec<(&str, usize)> = Vec::new();
    let mut covered: HashMap<&str, HashSet<i64>> = HashMap::new();
    for (idx, key) in keys.iter().enumerate() {
        let entry = covered.entry(key.as_str()).or_insert_with(|| {
            groups.push((key.as_str(), idx));
            HashSet::new()
        });
        if let Some(year) = existing_years[idx] {
            entry.insert(year);
        }
    }

    let mut template_rows = Vec::new();
    let mut new_years = Vec::new();
    for (key, first_row) in &groups {
        let present = &covered[key];
        for year in years.clone() {
            if !present.contains(&year) {
                template_rows.push(*first_row);
                new_years.push(year);
            }
        }
    }
    let added = new_years.len();
    if added == 0 {
        return Ok((df.clone(), 0));
    }

    let original: Vec<Option<usize>> = (0..df.height()).map(Some).collect();
    let copied: Vec<Option<usize>> = original
        .iter()
        .copied()
        .chain(template_rows.iter().map(|row| Some(*row)))
        .collect();
    let blanked: Vec<Option<usize>> = original
        .iter()
        .copied()
        .chain(std::iter::repeat_n(None, added))
        .collect();

    let mut columns = Vec::with_capacity(df.width());
    for (name, data) in frame_columns(df)? {
        let data = if name == YEAR {
            let mut values = existing_years.clone();
            values.extend(new_years.iter().map(|year| Some(*year)));
            ColumnData::Int(values)
        } else if group_columns.contains(&name.as_str()) || carry_columns.contains(&name.as_str()) {
            data.gather(&copied)
        } else {
            data.gather(&blanked)
        };
        columns.push((name, data));
    }

    debug!(groups = groups.len(), added, "placeholder years added");
    Ok((frame_from_columns(columns)?, added))
}
