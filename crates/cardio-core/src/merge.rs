//! Outer-join merge of the cleaned source frames.

use std::collections::BTreeSet;

use cardio_common::{int_values, text_values};
use cardio_model::{AGE_GROUP, COUNTRY, COUNTRY_CODE, GENDER, YEAR};
use cardio_transform::{SourceFrame, TransformError, assert_unique_keys, outer_join};
use polars::prelude::DataFrame;
use tracing::{debug, info};

use crate::error::{PipelineError, Result, Stage};

/// Columns two frames may be joined on, when both carry them.
pub const JOIN_CANDIDATES: [&str; 5] = [COUNTRY_CODE, COUNTRY, YEAR, GENDER, AGE_GROUP];

/// Key of an analytic row.
pub const OBSERVATION_KEYS: [&str; 4] = [COUNTRY_CODE, YEAR, GENDER, AGE_GROUP];

/// The join keys shared by two frames, in [`JOIN_CANDIDATES`] order.
pub fn shared_keys(left: &DataFrame, right: &DataFrame) -> Vec<&'static str> {
    JOIN_CANDIDATES
        .into_iter()
        .filter(|column| left.column(column).is_ok() && right.column(column).is_ok())
        .collect()
}

/// Folds `frames` left to right with outer joins on their shared keys.
///
/// Every frame must carry `Country_Code` and `Year`. The result is checked
/// for unique observation keys over whichever of those columns it has.
pub fn merge_frames(frames: &[SourceFrame]) -> Result<DataFrame> {
    let Some((first, rest)) = frames.split_first() else {
        return Err(PipelineError::InvalidConfig {
            message: "nothing to merge".to_string(),
        });
    };

    let mut merged = first.data.clone();
    for frame in rest {
        let on = shared_keys(&merged, &frame.data);
        if !on.contains(&COUNTRY_CODE) || !on.contains(&YEAR) {
            return Err(PipelineError::Transform {
                stage: Stage::Merge,
                source: TransformError::MissingColumn {
                    column: format!("{COUNTRY_CODE}/{YEAR} in {}", frame.name),
                },
            });
        }
        let before = merged.height();
        merged = outer_join(&merged, &frame.data, &on).map_err(PipelineError::transform(Stage::Merge))?;
        debug!(
            dataset = %frame.name,
            on = %on.join(", "),
            left_rows = before,
            right_rows = frame.record_count(),
            output_rows = merged.height(),
            "source merged"
        );
    }

    let keys: Vec<&str> = OBSERVATION_KEYS
        .into_iter()
        .filter(|column| merged.column(column).is_ok())
        .collect();
    assert_unique_keys(&merged, &keys, Stage::Merge.as_str())
        .map_err(PipelineError::transform(Stage::Merge))?;

    info!(
        sources = frames.len(),
        rows = merged.height(),
        columns = merged.width(),
        "sources merged"
    );
    Ok(merged)
}

/// Distinct `(Country_Code, Year)` pairs with a known code.
pub fn country_year_coverage(df: &DataFrame) -> Result<BTreeSet<(String, i64)>> {
    let to_err = |e: polars::prelude::PolarsError| PipelineError::Transform {
        stage: Stage::Merge,
        source: e.into(),
    };
    let codes = text_values(df, COUNTRY_CODE).map_err(to_err)?;
    let years = int_values(df, YEAR).map_err(to_err)?;
    Ok(codes
        .into_iter()
        .zip(years)
        .filter_map(|(code, year)| Some((code?, year?)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn frame(name: &str, data: DataFrame) -> SourceFrame {
        SourceFrame::new(name, data, &[COUNTRY_CODE, YEAR])
    }

    #[test]
    fn joins_on_columns_both_sides_carry() {
        let disease = df! {
            "Country" => ["Chile"], "Country_Code" => ["CHL"], "Year" => [2000i64],
            "Gender" => ["Male"], "Age_Group" => ["All ages"],
        }
        .unwrap();
        let gdp = df! { "Country" => ["Chile"], "Country_Code" => ["CHL"], "Year" => [2000i64] }.unwrap();
        assert_eq!(shared_keys(&disease, &gdp), vec![COUNTRY_CODE, COUNTRY, YEAR]);
    }

    #[test]
    fn fans_country_values_across_genders() {
        let diabetes = df! {
            "Country" => ["Chile", "Chile"],
            "Country_Code" => ["CHL", "CHL"],
            "Year" => [2000i64, 2000],
            "Gender" => ["Male", "Female"],
            "Diabetes_Prevalence_Rate" => [8.0, 9.0],
        }
        .unwrap();
        let gdp = df! {
            "Country" => ["Chile", "Peru"],
            "Country_Code" => ["CHL", "PER"],
            "Year" => [2000i64, 2000],
            "GDP" => [20000.0, 11000.0],
        }
        .unwrap();

        let merged = merge_frames(&[frame("diabetes", diabetes), frame("gdp", gdp)]).unwrap();
        assert_eq!(merged.height(), 3);
        assert_eq!(
            cardio_common::float_values(&merged, "GDP").unwrap(),
            vec![Some(20000.0), Some(20000.0), Some(11000.0)]
        );
    }

    #[test]
    fn rejects_frames_without_country_year_keys() {
        let a = df! { "Country_Code" => ["CHL"], "Year" => [2000i64], "A" => [1.0] }.unwrap();
        let b = df! { "Country" => ["Chile"], "B" => [1.0] }.unwrap();
        let err = merge_frames(&[frame("a", a), frame("b", b)]).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Merge));
    }
}
