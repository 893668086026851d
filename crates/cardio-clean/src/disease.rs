//! GBD cardiovascular incidence, mortality and prevalence rates.

use std::path::Path;

use cardio_impute::{PolynomialImputer, PolynomialMode};
use cardio_ingest::{has_column, select_renamed};
use cardio_model::{AGE_GROUP, COUNTRY, COUNTRY_CODE, GENDER, Metric, SourceId, YEAR};
use cardio_transform::{
    SourceFrame, SourceFrameMeta, assert_unique_keys, keep_equal, outer_join, parse_float_columns,
    parse_gender_column, parse_int_column,
};
use polars::prelude::DataFrame;

use crate::error::{AtPath, InDataset, Result};
use crate::input::SourceInput;
use crate::steps::{finish, impute, resolve_countries, tally};
use crate::{CleanContext, SourceCleaner};

pub const DATASET: &str = "disease_metrics";

/// GBD exports carry several measures per file; only rates are kept.
pub const METRIC_COLUMN: &str = "metric_name";
pub const RATE_METRIC: &str = "Rate";

const SOURCE_KEYS: [&str; 4] = [COUNTRY, YEAR, GENDER, AGE_GROUP];
const KEYS: [&str; 4] = [COUNTRY_CODE, YEAR, GENDER, AGE_GROUP];

#[derive(Debug, Clone)]
pub struct DiseaseMetricsCleaner {
    pub incidence: SourceInput,
    pub mortality: SourceInput,
    pub prevalence: SourceInput,
}

impl DiseaseMetricsCleaner {
    pub fn new(incidence: SourceInput, mortality: SourceInput, prevalence: SourceInput) -> Self {
        Self {
            incidence,
            mortality,
            prevalence,
        }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(
            SourceInput::default_in(SourceId::Incidence, data_dir),
            SourceInput::default_in(SourceId::Mortality, data_dir),
            SourceInput::default_in(SourceId::Prevalence, data_dir),
        )
    }

    pub fn clean_frames(
        &self,
        ctx: &CleanContext<'_>,
        incidence: &DataFrame,
        mortality: &DataFrame,
        prevalence: &DataFrame,
    ) -> Result<SourceFrame> {
        let mut meta = SourceFrameMeta::default();
        let incidence = rate_frame(
            incidence,
            &self.incidence.path,
            Metric::IncidenceRate.column(),
            &mut meta,
        )?;
        let mortality = rate_frame(
            mortality,
            &self.mortality.path,
            Metric::MortalityRate.column(),
            &mut meta,
        )?;
        let prevalence = rate_frame(
            prevalence,
            &self.prevalence.path,
            Metric::PrevalenceRate.column(),
            &mut meta,
        )?;

        let joined = outer_join(&incidence, &mortality, &SOURCE_KEYS).in_dataset(DATASET)?;
        let mut data = outer_join(&joined, &prevalence, &SOURCE_KEYS).in_dataset(DATASET)?;

        // Rates trend against Year over the whole table.
        let trend = PolynomialImputer::default()
            .with_mode(PolynomialMode::FillGaps)
            .with_min_value(0.0);
        for rate in [
            Metric::IncidenceRate,
            Metric::PrevalenceRate,
            Metric::MortalityRate,
        ] {
            data = impute(&data, &trend, rate.column(), DATASET)?;
        }

        // Aggregates such as "Global" are only dropped here; the trend fit
        // above sees them like the source does.
        let data = resolve_countries(&data, ctx, &mut meta).in_dataset(DATASET)?;

        finish(
            DATASET,
            data,
            &KEYS,
            &[&self.incidence, &self.mortality, &self.prevalence],
            meta,
        )
    }
}

impl SourceCleaner for DiseaseMetricsCleaner {
    fn name(&self) -> &'static str {
        DATASET
    }

    fn inputs(&self) -> Vec<&SourceInput> {
        vec![&self.incidence, &self.mortality, &self.prevalence]
    }

    fn clean(&self, ctx: &CleanContext<'_>) -> Result<SourceFrame> {
        let incidence = self.incidence.load()?;
        let mortality = self.mortality.load()?;
        let prevalence = self.prevalence.load()?;
        self.clean_frames(ctx, &incidence, &mortality, &prevalence)
    }
}

fn rate_frame(
    raw: &DataFrame,
    path: &Path,
    rate_column: &str,
    meta: &mut SourceFrameMeta,
) -> Result<DataFrame> {
    let (raw, other_metrics) = if has_column(raw, METRIC_COLUMN) {
        keep_equal(raw, METRIC_COLUMN, RATE_METRIC).at(path)?
    } else {
        (raw.clone(), 0)
    };
    tally(meta, "non-rate measure", other_metrics);

    let mut df = select_renamed(
        &raw,
        &[
            ("location_name", COUNTRY),
            ("sex_name", GENDER),
            ("age_name", AGE_GROUP),
            ("year", YEAR),
            ("val", rate_column),
        ],
        path,
    )?;
    parse_int_column(&mut df, YEAR).at(path)?;
    parse_float_columns(&mut df, &[rate_column]).at(path)?;
    parse_gender_column(&mut df, GENDER).at(path)?;
    assert_unique_keys(&df, &SOURCE_KEYS, "clean").at(path)?;
    Ok(df)
}
