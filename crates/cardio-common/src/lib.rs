//! Shared utilities for the cardio crates.
//!
//! Typed column extraction and rebuilding over Polars frames, numeric cell
//! parsing, and the text normalization used when matching
//! country names across sources.

pub mod frame;
pub mod numeric;
pub mod text;

pub use frame::{
    ColumnData, column_names, float_values, frame_columns, frame_from_columns, int_values, set_column,
    text_values,
};
pub use numeric::{format_numeric, parse_f64, parse_i64};
pub use text::{lookup_key, normalize_whitespace, title_case};
