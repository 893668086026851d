//! Physical inactivity, obesity and GDP per capita.

use std::path::Path;

use cardio_impute::KnnImputer;
use cardio_ingest::select_renamed;
use cardio_model::{COUNTRY, COUNTRY_CODE, Metric, SourceId, YEAR};
use cardio_transform::{
    SourceFrame, SourceFrameMeta, assert_unique_keys, dedupe_exact, drop_null, mask_negative,
    outer_join, parse_float_columns, parse_int_column,
};
use polars::prelude::DataFrame;
use tracing::info;

use crate::error::{AtPath, InDataset, Result};
use crate::gho::indicator_frame;
use crate::input::SourceInput;
use crate::steps::{finish, impute_jointly, resolve_countries, tally};
use crate::{CleanContext, SourceCleaner};

pub const DATASET: &str = "activity_obesity_gdp";

pub const GDP_SOURCE_COLUMN: &str = "GDP per capita, PPP (constant 2017 international $)";

const KEYS: [&str; 2] = [COUNTRY_CODE, YEAR];
const JOIN_KEYS: [&str; 3] = [COUNTRY_CODE, COUNTRY, YEAR];

#[derive(Debug, Clone)]
pub struct ActivityObesityGdpCleaner {
    pub activity: SourceInput,
    pub obesity: SourceInput,
    pub gdp: SourceInput,
}

impl ActivityObesityGdpCleaner {
    pub fn new(activity: SourceInput, obesity: SourceInput, gdp: SourceInput) -> Self {
        Self {
            activity,
            obesity,
            gdp,
        }
    }

    /// Default file names under `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(
            SourceInput::default_in(SourceId::Activity, data_dir),
            SourceInput::default_in(SourceId::Obesity, data_dir),
            SourceInput::default_in(SourceId::Gdp, data_dir),
        )
    }

    pub fn clean_frames(
        &self,
        ctx: &CleanContext<'_>,
        activity: &DataFrame,
        obesity: &DataFrame,
        gdp: &DataFrame,
    ) -> Result<SourceFrame> {
        let mut meta = SourceFrameMeta::default();
        let activity = indicator(
            ctx,
            activity,
            &self.activity.path,
            Metric::ActivityPrevalenceRate.column(),
            &mut meta,
        )?;
        let obesity = indicator(
            ctx,
            obesity,
            &self.obesity.path,
            Metric::ObesityPrevalenceRate.column(),
            &mut meta,
        )?;
        let gdp = gdp_frame(ctx, gdp, &self.gdp.path, &mut meta)?;

        let joined = outer_join(&activity, &obesity, &JOIN_KEYS).in_dataset(DATASET)?;
        let mut joined = outer_join(&joined, &gdp, &JOIN_KEYS).in_dataset(DATASET)?;
        let masked = mask_negative(&mut joined, Metric::Gdp.column()).in_dataset(DATASET)?;
        if masked > 0 {
            info!(dataset = DATASET, masked, "negative GDP treated as missing");
        }

        let metrics = [
            Metric::ActivityPrevalenceRate.column(),
            Metric::ObesityPrevalenceRate.column(),
            Metric::Gdp.column(),
        ];
        let knn = KnnImputer::default().with_features(&metrics);
        let data = impute_jointly(&joined, &knn, &metrics, DATASET)?;

        finish(
            DATASET,
            data,
            &KEYS,
            &[&self.activity, &self.obesity, &self.gdp],
            meta,
        )
    }
}

impl SourceCleaner for ActivityObesityGdpCleaner {
    fn name(&self) -> &'static str {
        DATASET
    }

    fn inputs(&self) -> Vec<&SourceInput> {
        vec![&self.activity, &self.obesity, &self.gdp]
    }

    fn clean(&self, ctx: &CleanContext<'_>) -> Result<SourceFrame> {
        let activity = self.activity.load()?;
        let obesity = self.obesity.load()?;
        let gdp = self.gdp.load()?;
        self.clean_frames(ctx, &activity, &obesity, &gdp)
    }
}

fn indicator(
    ctx: &CleanContext<'_>,
    raw: &DataFrame,
    path: &Path,
    value_column: &str,
    meta: &mut SourceFrameMeta,
) -> Result<DataFrame> {
    let (df, other_sexes) = indicator_frame(raw, path, value_column)?;
    tally(meta, "sex-specific row", other_sexes);
    let (df, duplicates) = dedupe_exact(&df).at(path)?;
    if duplicates > 0 {
        info!(path = %path.display(), duplicates, "exact duplicate rows removed");
    }
    tally(meta, "exact duplicate", duplicates);
    let df = resolve_countries(&df, ctx, meta).at(path)?;
    assert_unique_keys(&df, &KEYS, "clean").at(path)?;
    Ok(df)
}

fn gdp_frame(
    ctx: &CleanContext<'_>,
    raw: &DataFrame,
    path: &Path,
    meta: &mut SourceFrameMeta,
) -> Result<DataFrame> {
    let gdp = Metric::Gdp.column();
    let df = select_renamed(
        raw,
        &[
            ("Entity", COUNTRY),
            ("Code", COUNTRY_CODE),
            ("Year", YEAR),
            (GDP_SOURCE_COLUMN, gdp),
        ],
        path,
    )?;
    let (mut df, without_code) = drop_null(&df, COUNTRY_CODE).at(path)?;
    tally(meta, "missing country code", without_code);
    parse_int_column(&mut df, YEAR).at(path)?;
    parse_float_columns(&mut df, &[gdp]).at(path)?;
    let (df, duplicates) = dedupe_exact(&df).at(path)?;
    tally(meta, "exact duplicate", duplicates);
    let df = resolve_countries(&df, ctx, meta).at(path)?;
    assert_unique_keys(&df, &KEYS, "clean").at(path)?;
    Ok(df)
}
