//! Row selection helpers.

use cardio_common::{frame_columns, frame_from_columns};
use polars::prelude::*;

use crate::error::Result;

/// Keeps rows whose mask entry is `true`.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    Ok(df.filter(&mask)?)
}

/// Builds a frame from row indices; `None` yields an all-null row.
pub fn take_rows(df: &DataFrame, indices: &[Option<usize>]) -> Result<DataFrame> {
    let columns = frame_columns(df)?
        .into_iter()
        .map(|(name, data)| (name, data.gather(indices)))
        .collect();
    Ok(frame_from_columns(columns)?)
}
