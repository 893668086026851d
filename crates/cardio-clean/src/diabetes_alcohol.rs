//! NCD-RisC diabetes prevalence and WHO alcohol consumption.
//!
//! Diabetes is reported per sex from 1990 on. Placeholder rows extend each
//! (country, sex) series back over [`CleanContext::placeholder_years`] and a
//! per-series trend replaces the whole series. Alcohol arrives wide, one
//! column per year, and is imputed by KNN over location and year.

use std::path::Path;

use cardio_impute::{KnnImputer, PolynomialImputer, PolynomialMode};
use cardio_ingest::{require_columns, select_renamed};
use cardio_model::{COUNTRY, COUNTRY_CODE, GENDER, Metric, SourceId, YEAR};
use cardio_transform::{
    SourceFrame, SourceFrameMeta, add_missing_years, assert_unique_keys, fill_from_regions, melt,
    outer_join, parse_float_columns, parse_gender_column, parse_int_column, sort_rows,
};
use polars::prelude::DataFrame;
use tracing::info;

use crate::error::{AtPath, InDataset, Result};
use crate::input::SourceInput;
use crate::steps::{finish, impute, resolve_countries};
use crate::{CleanContext, SourceCleaner};

pub const DATASET: &str = "diabetes_alcohol";

pub const DIABETES_SOURCE_COLUMN: &str = "Prevalence of diabetes (18+ years)";

const ALCOHOL_LOCATION: &str = "Location";
const ALCOHOL_CODE: &str = "Code";

const KEYS: [&str; 3] = [COUNTRY_CODE, YEAR, GENDER];
const JOIN_KEYS: [&str; 3] = [COUNTRY_CODE, COUNTRY, YEAR];

#[derive(Debug, Clone)]
pub struct DiabetesAlcoholCleaner {
    pub diabetes: SourceInput,
    pub alcohol: SourceInput,
}

impl DiabetesAlcoholCleaner {
    pub fn new(diabetes: SourceInput, alcohol: SourceInput) -> Self {
        Self { diabetes, alcohol }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(
            SourceInput::default_in(SourceId::Diabetes, data_dir),
            SourceInput::default_in(SourceId::Alcohol, data_dir),
        )
    }

    pub fn clean_frames(
        &self,
        ctx: &CleanContext<'_>,
        diabetes: &DataFrame,
        alcohol: &DataFrame,
    ) -> Result<SourceFrame> {
        let mut meta = SourceFrameMeta::default();
        let diabetes = diabetes_frame(ctx, diabetes, &self.diabetes.path, &mut meta)?;
        let alcohol = alcohol_frame(ctx, alcohol, &self.alcohol.path, &mut meta)?;

        let mut data = outer_join(&diabetes, &alcohol, &JOIN_KEYS).in_dataset(DATASET)?;

        // Years only one side covers are gap-filled from each series' trend.
        let gaps = [
            (Metric::AlcoholValue.column(), &[COUNTRY_CODE][..]),
            (Metric::DiabetesPrevalenceRate.column(), &[COUNTRY_CODE, GENDER][..]),
        ];
        for (column, group_by) in gaps {
            let trend = PolynomialImputer::default()
                .grouped(group_by)
                .with_mode(PolynomialMode::FillGaps);
            data = impute(&data, &trend, column, DATASET)?;
        }

        finish(
            DATASET,
            data,
            &KEYS,
            &[&self.diabetes, &self.alcohol],
            meta,
        )
    }
}

impl SourceCleaner for DiabetesAlcoholCleaner {
    fn name(&self) -> &'static str {
        DATASET
    }

    fn inputs(&self) -> Vec<&SourceInput> {
        vec![&self.diabetes, &self.alcohol]
    }

    fn clean(&self, ctx: &CleanContext<'_>) -> Result<SourceFrame> {
        let diabetes = self.diabetes.load()?;
        let alcohol = self.alcohol.load()?;
        self.clean_frames(ctx, &diabetes, &alcohol)
    }
}

fn diabetes_frame(
    ctx: &CleanContext<'_>,
    raw: &DataFrame,
    path: &Path,
    meta: &mut SourceFrameMeta,
) -> Result<DataFrame> {
    let diabetes = Metric::DiabetesPrevalenceRate.column();
    let mut df = select_renamed(
        raw,
        &[
            ("Country/Region/World", COUNTRY),
            ("ISO", COUNTRY_CODE),
            ("Sex", GENDER),
            ("Year", YEAR),
            (DIABETES_SOURCE_COLUMN, diabetes),
        ],
        path,
    )?;
    parse_int_column(&mut df, YEAR).at(path)?;
    parse_float_columns(&mut df, &[diabetes]).at(path)?;
    parse_gender_column(&mut df, GENDER).at(path)?;
    let df = resolve_countries(&df, ctx, meta).at(path)?;
    assert_unique_keys(&df, &KEYS, "clean").at(path)?;

    let (df, added) = add_missing_years(
        &df,
        &[COUNTRY_CODE, GENDER],
        &[COUNTRY],
        ctx.placeholder_years.clone(),
    )
    .at(path)?;
    info!(
        path = %path.display(),
        added,
        first = ctx.placeholder_years.start(),
        last = ctx.placeholder_years.end(),
        "placeholder years added"
    );
    let df = sort_rows(&df, &[COUNTRY_CODE, GENDER, YEAR]).at(path)?;

    let trend = PolynomialImputer::default().grouped(&[COUNTRY_CODE, GENDER]);
    impute(&df, &trend, diabetes, DATASET)
}

fn alcohol_frame(
    ctx: &CleanContext<'_>,
    raw: &DataFrame,
    path: &Path,
    meta: &mut SourceFrameMeta,
) -> Result<DataFrame> {
    let alcohol = Metric::AlcoholValue.column();
    require_columns(raw, &[ALCOHOL_LOCATION, ALCOHOL_CODE], path)?;
    let long = melt(raw, &[ALCOHOL_LOCATION, ALCOHOL_CODE], YEAR, alcohol).at(path)?;
    let mut df = select_renamed(
        &long,
        &[
            (ALCOHOL_LOCATION, COUNTRY),
            (ALCOHOL_CODE, COUNTRY_CODE),
            (YEAR, YEAR),
            (alcohol, alcohol),
        ],
        path,
    )?;
    parse_int_column(&mut df, YEAR).at(path)?;
    parse_float_columns(&mut df, &[alcohol]).at(path)?;

    // Region rows are aggregates and leave with the exclusions below, so
    // they must lend their values first.
    let filled = fill_from_regions(&mut df, COUNTRY, YEAR, alcohol, &ctx.standards.fallbacks)
        .at(path)?;
    info!(path = %path.display(), filled, "alcohol gaps filled from regions");

    let df = resolve_countries(&df, ctx, meta).at(path)?;
    assert_unique_keys(&df, &[COUNTRY_CODE, YEAR], "clean").at(path)?;

    let knn = KnnImputer::new(5)
        .standardized()
        .with_features(&[YEAR])
        .with_ordinal_features(&[COUNTRY, COUNTRY_CODE]);
    impute(&df, &knn, alcohol, DATASET)
}
