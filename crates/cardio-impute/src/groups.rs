//! Shared column access for the imputers.

use std::collections::HashMap;

use cardio_common::{float_values, int_values};
use cardio_model::YEAR;
use cardio_transform::composite_keys;
use polars::prelude::*;

use crate::error::{ImputeError, Result};

/// Row indices per group in first-appearance order. An empty `group_by`
/// yields a single group holding every row.
pub fn group_rows(df: &DataFrame, group_by: &[String]) -> Result<Vec<Vec<usize>>> {
    if group_by.is_empty() {
        return Ok(vec![(0..df.height()).collect()]);
    }
    let columns: Vec<&str> = group_by.iter().map(String::as_str).collect();
    let keys = composite_keys(df, &columns)?;
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (idx, key) in keys.iter().enumerate() {
        let slot = *slots.entry(key.as_str()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(idx);
    }
    Ok(groups)
}

pub(crate) fn require_column(df: &DataFrame, column: &str) -> Result<()> {
    if df.column(column).is_err() {
        return Err(ImputeError::MissingColumn {
            column: column.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn target_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
    require_column(df, column)?;
    Ok(float_values(df, column)?)
}

pub(crate) fn years(df: &DataFrame) -> Result<Vec<Option<f64>>> {
    require_column(df, YEAR)?;
    Ok(int_values(df, YEAR)?
        .into_iter()
        .map(|year| year.map(|y| y as f64))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_follow_first_appearance() {
        let df = df! { "Country_Code" => ["FRA", "USA", "FRA"] }.unwrap();
        let groups = group_rows(&df, &["Country_Code".to_string()]).unwrap();
        assert_eq!(groups, vec![vec![0, 2], vec![1]]);
        assert_eq!(group_rows(&df, &[]).unwrap(), vec![vec![0, 1, 2]]);
    }
}
