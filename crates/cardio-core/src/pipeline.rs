//! Batch pipeline: clean, merge, impute, sanity, project, persist.
//!
//! Every stage runs to completion before the next starts and any failure
//! aborts the run. Nothing is written until the table is complete.

use std::time::Instant;

use cardio_clean::{
    ActivityObesityGdpCleaner, CleanContext, DiabetesAlcoholCleaner, DiseaseMetricsCleaner,
    OverweightHealthCleaner, SourceCleaner,
};
use cardio_common::column_names;
use cardio_impute::ImputeOutcome;
use cardio_model::{ANALYTIC_COLUMNS, Metric, REGION, SourceId};
use cardio_standards::StandardsRegistry;
use cardio_transform::{SourceFrame, TransformError, add_region_column, mask_negative};
use chrono::Utc;
use polars::prelude::DataFrame;
use tracing::{info, info_span, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result, Stage};
use crate::merge::merge_frames;
use crate::persist::{stage_json, stage_snapshot};
use crate::report::{RunReport, SourceReport};

/// Order in which configured strategies run after the merge. Each imputed
/// column is a feature for the ones after it.
pub const IMPUTATION_ORDER: [Metric; 10] = [
    Metric::AlcoholValue,
    Metric::IncidenceRate,
    Metric::PrevalenceRate,
    Metric::MortalityRate,
    Metric::DiabetesPrevalenceRate,
    Metric::ActivityPrevalenceRate,
    Metric::ObesityPrevalenceRate,
    Metric::Gdp,
    Metric::HealthExpenditure,
    Metric::LifeExpectancy,
];

/// The analytic table and what it took to build it.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: DataFrame,
    pub report: RunReport,
}

pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    standards: &'a StandardsRegistry,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PipelineConfig, standards: &'a StandardsRegistry) -> Self {
        Self { config, standards }
    }

    pub fn config(&self) -> &PipelineConfig {
        self.config
    }

    /// The cleaners in merge order.
    pub fn cleaners(&self) -> Vec<Box<dyn SourceCleaner>> {
        let input = |id| self.config.source_input(id);
        vec![
            Box::new(DiseaseMetricsCleaner::new(
                input(SourceId::Incidence),
                input(SourceId::Mortality),
                input(SourceId::Prevalence),
            )),
            Box::new(DiabetesAlcoholCleaner::new(
                input(SourceId::Diabetes),
                input(SourceId::Alcohol),
            )),
            Box::new(ActivityObesityGdpCleaner::new(
                input(SourceId::Activity),
                input(SourceId::Obesity),
                input(SourceId::Gdp),
            )),
            Box::new(OverweightHealthCleaner::new(
                input(SourceId::Overweight),
                input(SourceId::WorldHealth),
                input(SourceId::LifeExpectancy),
            )),
        ]
    }

    pub fn clean(&self) -> Result<Vec<SourceFrame>> {
        let span = info_span!("clean", data_dir = %self.config.data_dir.display());
        let start = Instant::now();
        let frames = span.in_scope(|| {
            let ctx = CleanContext::new(self.standards)
                .with_placeholder_years(self.config.placeholder_years.to_range());
            self.cleaners()
                .iter()
                .map(|cleaner| {
                    cleaner.clean(&ctx).map_err(|source| PipelineError::Clean {
                        dataset: cleaner.name(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>>>()
        })?;
        info!(
            sources = frames.len(),
            rows = frames.iter().map(SourceFrame::record_count).sum::<usize>(),
            duration_ms = start.elapsed().as_millis(),
            "clean complete"
        );
        Ok(frames)
    }

    /// Merges cleaned frames and derives the analytic table.
    pub fn build(&self, sources: &[SourceFrame]) -> Result<PipelineOutput> {
        let mut report = RunReport::new(Utc::now());
        report.sources = sources.iter().map(SourceReport::from_frame).collect();

        let start = Instant::now();
        let merged = info_span!("merge").in_scope(|| merge_frames(sources))?;
        report.merged_rows = merged.height();
        info!(
            rows = merged.height(),
            duration_ms = start.elapsed().as_millis(),
            "merge complete"
        );

        let start = Instant::now();
        let (mut table, outcomes) = info_span!("impute").in_scope(|| self.impute(merged))?;
        info!(
            columns = outcomes.len(),
            filled = outcomes.iter().map(|o| o.filled).sum::<usize>(),
            duration_ms = start.elapsed().as_millis(),
            "impute complete"
        );
        report.imputation = outcomes;

        report.masked_negative_gdp = mask_negative(&mut table, Metric::Gdp.column())
            .map_err(PipelineError::transform(Stage::Sanity))?;
        if report.masked_negative_gdp > 0 {
            info!(
                rows = report.masked_negative_gdp,
                "negative GDP values set to missing"
            );
        }

        let (table, dropped) = self.project(&table)?;
        report.dropped_columns = dropped;
        report.output_rows = table.height();
        Ok(PipelineOutput { table, report })
    }

    pub fn run(&self) -> Result<PipelineOutput> {
        let sources = self.clean()?;
        self.build(&sources)
    }

    /// Runs the pipeline and writes the snapshot, plus the run report when
    /// configured. Both files are staged before either is committed, and the
    /// report is committed first, so a failed write leaves the previous
    /// snapshot in place.
    pub fn run_and_persist(&self) -> Result<PipelineOutput> {
        let mut output = self.run()?;
        let start = Instant::now();
        info_span!("persist", output = %self.config.output.display()).in_scope(|| {
            let snapshot = stage_snapshot(&mut output.table, &self.config.output)?;
            output.report.output = Some(self.config.output.clone());
            let report = if self.config.write_run_report {
                Some(stage_json(&output.report, &self.config.report_path())?)
            } else {
                None
            };
            if let Some(report) = report {
                report.commit()?;
            }
            snapshot.commit()
        })?;
        info!(
            path = %self.config.output.display(),
            rows = output.table.height(),
            duration_ms = start.elapsed().as_millis(),
            "persist complete"
        );
        Ok(output)
    }

    fn impute(&self, mut df: DataFrame) -> Result<(DataFrame, Vec<ImputeOutcome>)> {
        let mut outcomes = Vec::new();
        for metric in IMPUTATION_ORDER {
            let Some(strategy) = self.config.imputation.get(&metric) else {
                continue;
            };
            let column = metric.column();
            let (imputed, outcome) = strategy
                .imputer()
                .impute(&df, column)
                .map_err(|source| PipelineError::Impute {
                    column: column.to_string(),
                    source,
                })?;
            if outcome.is_skipped() {
                warn!(column, strategy = outcome.strategy, "column left unimputed");
            } else {
                info!(
                    column,
                    strategy = outcome.strategy,
                    filled = outcome.filled,
                    overwritten = outcome.overwritten,
                    remaining = outcome.remaining_missing,
                    "column imputed"
                );
            }
            df = imputed;
            outcomes.push(outcome);
        }
        Ok((df, outcomes))
    }

    /// Selects the snapshot columns in their stable order. Obsolete columns
    /// are left out even when they are analytic columns.
    fn project(&self, df: &DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let obsolete = &self.config.obsolete_columns;
        let mut columns: Vec<&str> = ANALYTIC_COLUMNS
            .into_iter()
            .filter(|column| !obsolete.iter().any(|o| o == column))
            .collect();

        let mut df = df.clone();
        if self.config.include_region {
            add_region_column(&mut df, &self.standards.classifier)
                .map_err(PipelineError::transform(Stage::Project))?;
            columns.push(REGION);
        }
        for column in &columns {
            if df.column(column).is_err() {
                return Err(PipelineError::Transform {
                    stage: Stage::Project,
                    source: TransformError::MissingColumn {
                        column: (*column).to_string(),
                    },
                });
            }
        }

        let dropped: Vec<String> = column_names(&df)
            .into_iter()
            .filter(|name| !columns.contains(&name.as_str()))
            .collect();
        let projected = df
            .select(columns.iter().copied())
            .map_err(|e| PipelineError::Transform {
                stage: Stage::Project,
                source: e.into(),
            })?;
        if !dropped.is_empty() {
            info!(columns = %dropped.join(", "), "columns dropped from snapshot");
        }
        Ok((projected, dropped))
    }
}
