use cardio_common::{ColumnData, float_values, set_column};
use polars::prelude::*;

use crate::error::Result;

/// Replaces negative values in `column` with null. Returns the count masked.
pub fn mask_negative(df: &mut DataFrame, column: &str) -> Result<usize> {
    let mut values = float_values(df, column)?;
    let mut masked = 0;
    for slot in values.iter_mut() {
        if slot.is_some_and(|v| v < 0.0) {
            *slot = None;
            masked += 1;
        }
    }
    if masked > 0 {
        set_column(df, column, ColumnData::Float(values))?;
    }
    Ok(masked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_gdp_becomes_missing() {
        let mut df = df! { "GDP" => [Some(-100.0), Some(0.0), None, Some(5.0)] }.unwrap();
        assert_eq!(mask_negative(&mut df, "GDP").unwrap(), 1);
        assert_eq!(
            float_values(&df, "GDP").unwrap(),
            vec![None, Some(0.0), None, Some(5.0)]
        );
    }
}
