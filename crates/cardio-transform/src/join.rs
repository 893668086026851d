//! Key-coalescing joins.
//!
//! Output rows keep left order (each left row followed by its matches), then
//! unmatched right rows for outer joins. Key columns appear once, filled from
//! whichever side has the row. Null key parts match each other.

use std::collections::HashMap;
use std::mem::discriminant;

use cardio_common::{ColumnData, column_names, frame_columns, frame_from_columns};
use polars::prelude::*;
use tracing::debug;

use crate::error::{Result, TransformError};
use crate::keys::{composite_keys, display_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinKind {
    Outer,
    Left,
}

/// Full outer join on `on`.
///
/// A key repeated on both sides fails with
/// [`TransformError::ManyToManyJoin`]; one-to-many fan-out is allowed.
pub fn outer_join(left: &DataFrame, right: &DataFrame, on: &[&str]) -> Result<DataFrame> {
    join(left, right, on, JoinKind::Outer)
}

/// Left join on `on`. Right keys must be unique.
pub fn left_join(left: &DataFrame, right: &DataFrame, on: &[&str]) -> Result<DataFrame> {
    join(left, right, on, JoinKind::Left)
}

fn join(left: &DataFrame, right: &DataFrame, on: &[&str], kind: JoinKind) -> Result<DataFrame> {
    let left_keys = composite_keys(left, on)?;
    let right_keys = composite_keys(right, on)?;

    let left_names = column_names(left);
    for name in column_names(right) {
        if !on.contains(&name.as_str()) && left_names.contains(&name) {
            return Err(TransformError::ColumnCollision { column: name });
        }
    }

    let mut right_index: HashMap<&str, Vec<usize>> = HashMap::with_capacity(right_keys.len());
    for (idx, key) in right_keys.iter().enumerate() {
        right_index.entry(key.as_str()).or_default().push(idx);
    }
    let mut left_counts: HashMap<&str, usize> = HashMap::with_capacity(left_keys.len());
    for key in &left_keys {
        *left_counts.entry(key.as_str()).or_default() += 1;
    }

    for key in &right_keys {
        let right_count = right_index[key.as_str()].len();
        if right_count < 2 {
            continue;
        }
        match kind {
            JoinKind::Left => {
                return Err(TransformError::DuplicateKey {
                    stage: "left join".to_string(),
                    columns: on.join(", "),
                    key: display_key(key),
                    count: right_count,
                });
            }
            JoinKind::Outer if left_counts.get(key.as_str()).copied().unwrap_or(0) > 1 => {
                return Err(TransformError::ManyToManyJoin {
                    columns: on.join(", "),
                    key: display_key(key),
                });
            }
            JoinKind::Outer => {}
        }
    }

    let mut left_rows = Vec::with_capacity(left.height());
    let mut right_rows = Vec::with_capacity(left.height());
    let mut matched = vec![false; right.height()];
    for (idx, key) in left_keys.iter().enumerate() {
        match right_index.get(key.as_str()) {
            Some(rows) => {
                for &row in rows {
                    left_rows.push(Some(idx));
                    right_rows.push(Some(row));
                    matched[row] = true;
                }
            }
            None => {
                left_rows.push(Some(idx));
                right_rows.push(None);
            }
        }
    }
    if kind == JoinKind::Outer {
        for (row, was_matched) in matched.iter().enumerate() {
            if !was_matched {
                left_rows.push(None);
                right_rows.push(Some(row));
            }
        }
    }

    let mut columns = Vec::with_capacity(left.width() + right.width());
    for (name, data) in frame_columns(left)? {
        let mut gathered = data.gather(&left_rows);
        if on.contains(&name.as_str()) {
            let other = ColumnData::from_column(right.column(&name)?)?.gather(&right_rows);
            let (mut merged, other) = align(gathered, other);
            merged.coalesce(&other);
            gathered = merged;
        }
        columns.push((name, gathered));
    }
    for (name, data) in frame_columns(right)? {
        if !on.contains(&name.as_str()) {
            columns.push((name, data.gather(&right_rows)));
        }
    }

    let joined = frame_from_columns(columns)?;
    debug!(
        kind = ?kind,
        left_rows = left.height(),
        right_rows = right.height(),
        output_rows = joined.height(),
        "frames joined"
    );
    Ok(joined)
}

/// Brings two key columns to a shared variant: integers widen to floats,
/// any other mismatch falls back to text.
fn align(left: ColumnData, right: ColumnData) -> (ColumnData, ColumnData) {
    if discriminant(&left) == discriminant(&right) {
        return (left, right);
    }
    match (left, right) {
        (ColumnData::Int(l), ColumnData::Float(r)) => (ColumnData::Float(widen(l)), ColumnData::Float(r)),
        (ColumnData::Float(l), ColumnData::Int(r)) => (ColumnData::Float(l), ColumnData::Float(widen(r))),
        (l, r) => (as_text(&l), as_text(&r)),
    }
}

fn widen(values: Vec<Option<i64>>) -> Vec<Option<f64>> {
    values.into_iter().map(|v| v.map(|x| x as f64)).collect()
}

fn as_text(data: &ColumnData) -> ColumnData {
    ColumnData::Text(
        (0..data.len())
            .map(|idx| (!data.is_null(idx)).then(|| data.key_part(idx)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardio_common::{float_values, int_values, text_values};

    #[test]
    fn outer_join_keeps_unmatched_rows_from_both_sides() {
        let gdp = df! {
            "Country_Code" => ["USA", "USA"],
            "Year" => [2000i64, 2001],
            "GDP" => [None, Some(50000.0)],
        }
        .unwrap();
        let health = df! {
            "Country_Code" => ["USA", "FRA"],
            "Year" => [2000i64, 2000],
            "Life_Expectancy" => [77.0, 79.0],
        }
        .unwrap();

        let joined = outer_join(&gdp, &health, &["Country_Code", "Year"]).unwrap();

        assert_eq!(joined.height(), 3);
        assert_eq!(
            text_values(&joined, "Country_Code").unwrap(),
            vec![Some("USA".into()), Some("USA".into()), Some("FRA".into())]
        );
        assert_eq!(
            int_values(&joined, "Year").unwrap(),
            vec![Some(2000), Some(2001), Some(2000)]
        );
        assert_eq!(float_values(&joined, "GDP").unwrap(), vec![None, Some(50000.0), None]);
        assert_eq!(
            float_values(&joined, "Life_Expectancy").unwrap(),
            vec![Some(77.0), None, Some(79.0)]
        );
    }

    #[test]
    fn null_keys_match_each_other() {
        let left = df! {
            "Country_Code" => ["USA"],
            "Gender" => [None::<&str>],
            "A" => [1.0],
        }
        .unwrap();
        let right = df! {
            "Country_Code" => ["USA"],
            "Gender" => [None::<&str>],
            "B" => [2.0],
        }
        .unwrap();
        let joined = outer_join(&left, &right, &["Country_Code", "Gender"]).unwrap();
        assert_eq!(joined.height(), 1);
    }

    #[test]
    fn one_to_many_fans_out_but_many_to_many_fails() {
        let left = df! { "Code" => ["USA"], "A" => [1.0] }.unwrap();
        let right = df! { "Code" => ["USA", "USA"], "B" => [1.0, 2.0] }.unwrap();
        assert_eq!(outer_join(&left, &right, &["Code"]).unwrap().height(), 2);

        let left = df! { "Code" => ["USA", "USA"], "A" => [1.0, 2.0] }.unwrap();
        let err = outer_join(&left, &right, &["Code"]).unwrap_err();
        assert!(matches!(err, TransformError::ManyToManyJoin { .. }));
    }

    #[test]
    fn left_join_requires_unique_right_keys() {
        let left = df! { "Code" => ["USA", "FRA"], "A" => [1.0, 2.0] }.unwrap();
        let right = df! { "Code" => ["USA", "DEU"], "B" => [5.0, 6.0] }.unwrap();
        let joined = left_join(&left, &right, &["Code"]).unwrap();
        assert_eq!(joined.height(), 2);
        assert_eq!(float_values(&joined, "B").unwrap(), vec![Some(5.0), None]);

        let dup = df! { "Code" => ["USA", "USA"], "B" => [5.0, 6.0] }.unwrap();
        assert!(matches!(
            left_join(&left, &dup, &["Code"]).unwrap_err(),
            TransformError::DuplicateKey { .. }
        ));
    }

    #[test]
    fn shared_value_columns_are_rejected() {
        let left = df! { "Code" => ["USA"], "GDP" => [1.0] }.unwrap();
        let right = df! { "Code" => ["USA"], "GDP" => [2.0] }.unwrap();
        assert!(matches!(
            outer_join(&left, &right, &["Code"]).unwrap_err(),
            TransformError::ColumnCollision { ref column } if column == "GDP"
        ));
    }

    #[test]
    fn mixed_year_types_still_coalesce() {
        let left = df! { "Year" => [2000i64], "A" => [1.0] }.unwrap();
        let right = df! { "Year" => [2001.0f64], "B" => [2.0] }.unwrap();
        let joined = outer_join(&left, &right, &["Year"]).unwrap();
        assert_eq!(int_values(&joined, "Year").unwrap(), vec![Some(2000), Some(2001)]);
    }
}
