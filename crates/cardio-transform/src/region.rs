use cardio_common::{ColumnData, set_column, text_values};
use cardio_model::{COUNTRY_CODE, REGION, Region};
use cardio_standards::RegionClassifier;
use polars::prelude::*;

use crate::error::{Result, TransformError};

/// Sets `Region` from `Country_Code`. A null code maps to
/// [`Region::Unknown`], so the column never holds nulls.
pub fn add_region_column(df: &mut DataFrame, classifier: &RegionClassifier) -> Result<()> {
    if df.column(COUNTRY_CODE).is_err() {
        return Err(TransformError::MissingColumn {
            column: COUNTRY_CODE.to_string(),
        });
    }
    let regions = text_values(df, COUNTRY_CODE)?
        .iter()
        .map(|code| {
            let region = code
                .as_deref()
                .map_or(Region::Unknown, |code| classifier.region_of(code));
            Some(region.as_str().to_string())
        })
        .collect();
    set_column(df, REGION, ColumnData::Text(regions))?;
    Ok(())
}
