//! Keyed fills.
//!
//! Both fills build a hash index once and fill in a single pass, so the cost
//! is linear in the two frames.

use std::collections::HashMap;

use cardio_common::{ColumnData, float_values, set_column, text_values};
use cardio_standards::RegionalFallbacks;
use polars::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::keys::composite_keys;

/// Fills gaps in `value_column` for locations that have a regional fallback,
/// taking the region row's value for the same year.
///
/// Returns the number of cells filled.
pub fn fill_from_regions(
    df: &mut DataFrame,
    location_column: &str,
    year_column: &str,
    value_column: &str,
    fallbacks: &RegionalFallbacks,
) -> Result<usize> {
    let locations = text_values(df, location_column)?;
    let years = composite_keys(df, &[year_column])?;
    let mut values = float_values(df, value_column)?;

    let mut by_location_year: HashMap<(&str, &str), f64> = HashMap::new();
    for ((location, year), value) in locations.iter().zip(&years).zip(&values) {
        if let (Some(location), Some(value)) = (location, value) {
            by_location_year
                .entry((location.as_str(), year.as_str()))
                .or_insert(*value);
        }
    }

    let mut filled = 0;
    let mut updates = Vec::new();
    for (idx, location) in locations.iter().enumerate() {
        if values[idx].is_some() {
            continue;
        }
        let Some(region) = location.as_deref().and_then(|l| fallbacks.region_for(l)) else {
            continue;
        };
        if let Some(value) = by_location_year.get(&(region, years[idx].as_str())) {
            updates.push((idx, *value));
        }
    }
    for (idx, value) in updates {
        values[idx] = Some(value);
        filled += 1;
    }

    if filled > 0 {
        set_column(df, value_column, ColumnData::Float(values))?;
    }
    debug!(column = value_column, filled, "regional fallback fill");
    Ok(filled)
}

/// Fills gaps in `target_column` from `source_column` of `lookup` where the
/// `keys` match. The first non-null lookup value per key wins.
///
/// Returns the number of cells filled.
pub fn fill_from_lookup(
    df: &mut DataFrame,
    lookup: &DataFrame,
    keys: &[&str],
    source_column: &str,
    target_column: &str,
) -> Result<usize> {
    let lookup_keys = composite_keys(lookup, keys)?;
    let lookup_values = float_values(lookup, source_column)?;
    let mut index: HashMap<&str, f64> = HashMap::with_capacity(lookup_keys.len());
    for (key, value) in lookup_keys.iter().zip(lookup_values) {
        if let Some(value) = value {
            index.entry(key.as_str()).or_insert(value);
        }
    }

    let row_keys = composite_keys(df, keys)?;
    let mut values = float_values(df, target_column)?;
    let mut filled = 0;
    for (slot, key) in values.iter_mut().zip(&row_keys) {
        if slot.is_none()
            && let Some(value) = index.get(key.as_str())
        {
            *slot = Some(*value);
            filled += 1;
        }
    }

    if filled > 0 {
        set_column(df, target_column, ColumnData::Float(values))?;
    }
    debug!(column = target_column, filled, "lookup fill");
    Ok(filled)
}
