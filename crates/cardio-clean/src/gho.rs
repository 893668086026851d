//! WHO Global Health Observatory indicator exports.
//!
//! GHO sheets carry one observation per row with a fixed set of dimension
//! columns. The header sits on the third sheet row.

use std::path::Path;

use cardio_ingest::{has_column, select_renamed};
use cardio_model::{COUNTRY, COUNTRY_CODE, YEAR};
use cardio_transform::{keep_equal, parse_float_columns, parse_int_column};
use polars::prelude::DataFrame;

use crate::error::{AtPath, Result};

pub const HEADER_ROW: usize = 2;

pub const LOCATION: &str = "Location";
pub const SPATIAL_CODE: &str = "SpatialDimValueCode";
pub const PERIOD: &str = "Period";
pub const FACT_VALUE: &str = "FactValueNumeric";
pub const SEX_DIMENSION: &str = "Dim1ValueCode";
pub const BOTH_SEXES: &str = "SEX_BTSX";

/// Keeps both-sexes rows when the export has a sex dimension.
pub fn keep_both_sexes(raw: &DataFrame, path: &Path) -> Result<(DataFrame, usize)> {
    if !has_column(raw, SEX_DIMENSION) {
        return Ok((raw.clone(), 0));
    }
    keep_equal(raw, SEX_DIMENSION, BOTH_SEXES).at(path)
}

/// Typed `(Country, Country_Code, Year, value_column)` frame of one
/// indicator. Also returns the number of other-sex rows dropped.
pub fn indicator_frame(raw: &DataFrame, path: &Path, value_column: &str) -> Result<(DataFrame, usize)> {
    let (raw, other_sexes) = keep_both_sexes(raw, path)?;
    let mut df = select_renamed(
        &raw,
        &[
            (LOCATION, COUNTRY),
            (SPATIAL_CODE, COUNTRY_CODE),
            (PERIOD, YEAR),
            (FACT_VALUE, value_column),
        ],
        path,
    )?;
    parse_int_column(&mut df, YEAR).at(path)?;
    parse_float_columns(&mut df, &[value_column]).at(path)?;
    Ok((df, other_sexes))
}
