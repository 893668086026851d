use std::cmp::Ordering;

use cardio_common::ColumnData;
use polars::prelude::*;

use crate::error::Result;
use crate::keys::key_columns;
use crate::rows::take_rows;

/// Stable ascending sort on `by`, nulls last.
pub fn sort_rows(df: &DataFrame, by: &[&str]) -> Result<DataFrame> {
    let keys = key_columns(df, by)?;
    let mut order: Vec<usize> = (0..df.height()).collect();
    order.sort_by(|&a, &b| {
        keys.iter()
            .map(|column| compare(column, a, b))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    let indices: Vec<Option<usize>> = order.into_iter().map(Some).collect();
    take_rows(df, &indices)
}

fn compare(column: &ColumnData, a: usize, b: usize) -> Ordering {
    match column {
        ColumnData::Text(v) => nulls_last(&v[a], &v[b], |x, y| x.cmp(y)),
        ColumnData::Float(v) => nulls_last(&v[a], &v[b], |x, y| x.total_cmp(y)),
        ColumnData::Int(v) => nulls_last(&v[a], &v[b], |x, y| x.cmp(y)),
    }
}

fn nulls_last<T>(a: &Option<T>, b: &Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
