//! WHO overweight prevalence with World Bank health expenditure and life
//! expectancy.

use std::path::Path;

use cardio_impute::FillInterpolateImputer;
use cardio_ingest::select_renamed;
use cardio_model::{COUNTRY, COUNTRY_CODE, Metric, SourceId, YEAR};
use cardio_standards::ExclusionScope;
use cardio_transform::{
    SourceFrame, SourceFrameMeta, assert_unique_keys, assign_country_codes, drop_excluded,
    drop_years, fill_from_lookup, keep_registry_codes, left_join, parse_float_columns,
    parse_int_column,
};
use polars::prelude::DataFrame;
use tracing::info;

use crate::error::{AtPath, InDataset, Result};
use crate::gho::{self, indicator_frame, keep_both_sexes};
use crate::input::SourceInput;
use crate::steps::{finish, impute, resolve_countries, tally};
use crate::{CleanContext, SourceCleaner};

pub const DATASET: &str = "overweight_health";

/// Carried to the merge as a KNN feature; not part of the analytic table.
pub const OVERWEIGHT_PREVALENCE: &str = "Overweight_Prevalence";

/// Years the world-health export covers too sparsely to keep.
pub const DROPPED_YEARS: [i64; 3] = [1999, 2022, 2023];

const SUPPLEMENTAL_LIFE_EXPECTANCY: &str = "Imputed_Life_Expectancy";

const KEYS: [&str; 2] = [COUNTRY_CODE, YEAR];
const JOIN_KEYS: [&str; 3] = [COUNTRY_CODE, COUNTRY, YEAR];

#[derive(Debug, Clone)]
pub struct OverweightHealthCleaner {
    pub overweight: SourceInput,
    pub world_health: SourceInput,
    pub life_expectancy: SourceInput,
}

impl OverweightHealthCleaner {
    pub fn new(
        overweight: SourceInput,
        world_health: SourceInput,
        life_expectancy: SourceInput,
    ) -> Self {
        Self {
            overweight,
            world_health,
            life_expectancy,
        }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(
            SourceInput::default_in(SourceId::Overweight, data_dir),
            SourceInput::default_in(SourceId::WorldHealth, data_dir),
            SourceInput::default_in(SourceId::LifeExpectancy, data_dir),
        )
    }

    pub fn clean_frames(
        &self,
        ctx: &CleanContext<'_>,
        overweight: &DataFrame,
        world_health: &DataFrame,
        life_expectancy: &DataFrame,
    ) -> Result<SourceFrame> {
        let mut meta = SourceFrameMeta::default();
        let overweight = overweight_frame(ctx, overweight, &self.overweight.path, &mut meta)?;
        let world_health = world_health_frame(ctx, world_health, &self.world_health.path, &mut meta)?;
        let supplemental =
            life_expectancy_frame(life_expectancy, &self.life_expectancy.path, &mut meta)?;

        // Overweight coverage defines the rows.
        let mut data = left_join(&overweight, &world_health, &JOIN_KEYS).in_dataset(DATASET)?;
        let life = Metric::LifeExpectancy.column();
        let filled = fill_from_lookup(
            &mut data,
            &supplemental,
            &KEYS,
            SUPPLEMENTAL_LIFE_EXPECTANCY,
            life,
        )
        .in_dataset(DATASET)?;
        info!(dataset = DATASET, filled, "life expectancy filled from WHO estimates");

        let carry = FillInterpolateImputer::default().grouped(&[COUNTRY_CODE]);
        for column in [Metric::HealthExpenditure.column(), life] {
            data = impute(&data, &carry, column, DATASET)?;
        }

        finish(
            DATASET,
            data,
            &KEYS,
            &[&self.overweight, &self.world_health, &self.life_expectancy],
            meta,
        )
    }
}

impl SourceCleaner for OverweightHealthCleaner {
    fn name(&self) -> &'static str {
        DATASET
    }

    fn inputs(&self) -> Vec<&SourceInput> {
        vec![&self.overweight, &self.world_health, &self.life_expectancy]
    }

    fn clean(&self, ctx: &CleanContext<'_>) -> Result<SourceFrame> {
        let overweight = self.overweight.load()?;
        let world_health = self.world_health.load()?;
        let life_expectancy = self.life_expectancy.load()?;
        self.clean_frames(ctx, &overweight, &world_health, &life_expectancy)
    }
}

fn overweight_frame(
    ctx: &CleanContext<'_>,
    raw: &DataFrame,
    path: &Path,
    meta: &mut SourceFrameMeta,
) -> Result<DataFrame> {
    let (df, other_sexes) = indicator_frame(raw, path, OVERWEIGHT_PREVALENCE)?;
    tally(meta, "sex-specific row", other_sexes);
    let df = resolve_countries(&df, ctx, meta).at(path)?;
    assert_unique_keys(&df, &KEYS, "clean").at(path)?;
    Ok(df)
}

fn world_health_frame(
    ctx: &CleanContext<'_>,
    raw: &DataFrame,
    path: &Path,
    meta: &mut SourceFrameMeta,
) -> Result<DataFrame> {
    let health = Metric::HealthExpenditure.column();
    let life = Metric::LifeExpectancy.column();
    let mut df = select_renamed(
        raw,
        &[
            ("country", COUNTRY),
            ("country_code", COUNTRY_CODE),
            ("year", YEAR),
            ("health_exp", health),
            ("life_expect", life),
        ],
        path,
    )?;
    parse_int_column(&mut df, YEAR).at(path)?;
    parse_float_columns(&mut df, &[health, life]).at(path)?;

    let (df, sparse_years) = drop_years(&df, YEAR, &DROPPED_YEARS).at(path)?;
    tally(meta, "sparse year", sparse_years);
    let (df, territories) = drop_excluded(
        &df,
        COUNTRY,
        &ctx.standards.exclusions,
        ExclusionScope::WorldHealth,
    )
    .at(path)?;
    tally(meta, "territory", territories);
    let (df, unlisted) = keep_registry_codes(&df, COUNTRY_CODE, &ctx.standards.resolver).at(path)?;
    tally(meta, "non-registry code", unlisted);
    // Codes are all known here; this only canonicalizes the names.
    let (df, _) = assign_country_codes(&df, &ctx.standards.resolver).at(path)?;
    assert_unique_keys(&df, &KEYS, "clean").at(path)?;
    Ok(df)
}

fn life_expectancy_frame(
    raw: &DataFrame,
    path: &Path,
    meta: &mut SourceFrameMeta,
) -> Result<DataFrame> {
    let (raw, other_sexes) = keep_both_sexes(raw, path)?;
    tally(meta, "sex-specific row", other_sexes);
    let mut df = select_renamed(
        &raw,
        &[
            (gho::SPATIAL_CODE, COUNTRY_CODE),
            (gho::PERIOD, YEAR),
            (gho::FACT_VALUE, SUPPLEMENTAL_LIFE_EXPECTANCY),
        ],
        path,
    )?;
    parse_int_column(&mut df, YEAR).at(path)?;
    parse_float_columns(&mut df, &[SUPPLEMENTAL_LIFE_EXPECTANCY]).at(path)?;
    Ok(df)
}
