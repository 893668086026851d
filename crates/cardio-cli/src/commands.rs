use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use cardio_core::{Pipeline, PipelineConfig, PipelineOutput};
use cardio_model::{Metric, Region};
use cardio_query::{AnalyticService, AnalyticTable, QueryError, QueryFilter};
use cardio_standards::{DoctorReport, StandardsRegistry};

use crate::cli::{QueryArgs, RunArgs};

/// A finished `cardio run`.
pub struct RunOutcome {
    pub output: PipelineOutput,
    /// Set when the snapshot was written.
    pub snapshot: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub duration_ms: u128,
}

pub struct Resolution {
    pub name: String,
    pub code: Option<String>,
    pub display_name: Option<String>,
}

pub enum QueryOutcome {
    Rows(DataFrame),
    NoData,
}

fn load_standards() -> Result<StandardsRegistry> {
    let (registry, _) = StandardsRegistry::load_default().context("load standards")?;
    Ok(registry)
}

fn load_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config = config.with_data_dir(dir.clone());
    }
    if let Some(output) = &args.output {
        config = config.with_output(output.clone());
    }
    config.validate().context("validate config")?;
    Ok(config)
}

pub fn run_pipeline(args: &RunArgs) -> Result<RunOutcome> {
    let config = load_config(args)?;
    let standards = load_standards()?;
    let span = info_span!("run", dry_run = args.dry_run);
    let _guard = span.enter();
    let start = Instant::now();

    let pipeline = Pipeline::new(&config, &standards);
    let output = if args.dry_run {
        pipeline.run()
    } else {
        pipeline.run_and_persist()
    }
    .context("pipeline failed")?;

    let snapshot = output.report.output.clone();
    let report = (snapshot.is_some() && config.write_run_report).then(|| config.report_path());
    let duration_ms = start.elapsed().as_millis();
    info!(
        rows = output.table.height(),
        duration_ms, "run complete"
    );
    Ok(RunOutcome {
        output,
        snapshot,
        report,
        duration_ms,
    })
}

pub fn run_resolve(names: &[String]) -> Result<Vec<Resolution>> {
    let standards = load_standards()?;
    let resolver = &standards.resolver;
    Ok(names
        .iter()
        .map(|name| {
            let code = resolver.resolve(name).map(str::to_string);
            let display_name = code
                .as_deref()
                .and_then(|code| resolver.display_name(code))
                .map(str::to_string);
            Resolution {
                name: name.clone(),
                code,
                display_name,
            }
        })
        .collect())
}

pub fn run_region(codes: &[String]) -> Result<Vec<(String, Region)>> {
    let standards = load_standards()?;
    Ok(codes
        .iter()
        .map(|code| (code.clone(), standards.classifier.region_of(code)))
        .collect())
}

pub fn run_standards() -> Result<String> {
    let (registry, summary) = StandardsRegistry::load_default().context("verify standards")?;
    let report = DoctorReport::from_verify_summary(&summary, registry.files);
    serde_json::to_string_pretty(&report).context("serialize doctor report")
}

pub fn run_query(args: &QueryArgs) -> Result<QueryOutcome> {
    let standards = load_standards()?;
    let table = AnalyticTable::load(&args.snapshot, &standards.classifier)
        .with_context(|| format!("load snapshot {}", args.snapshot.display()))?;
    let service = AnalyticService::uncached(table);

    let metrics: Vec<Metric> = if args.metrics.is_empty() {
        Metric::ALL.to_vec()
    } else {
        args.metrics.clone()
    };
    match service.mean_by(query_filter(args), &args.group_by, &metrics) {
        Ok(frame) => Ok(QueryOutcome::Rows(frame.as_ref().clone())),
        Err(QueryError::NoData) => Ok(QueryOutcome::NoData),
        Err(error) => Err(error).context("query failed"),
    }
}

fn query_filter(args: &QueryArgs) -> QueryFilter {
    let mut filter = QueryFilter::new();
    if let Some(year) = args.year {
        filter = filter.year(year);
    } else if args.from.is_some() || args.to.is_some() {
        filter = filter.years(
            args.from.unwrap_or(i64::MIN),
            args.to.unwrap_or(i64::MAX),
        );
    }
    for country in &args.countries {
        filter = filter.country(country.as_str());
    }
    for region in &args.regions {
        filter = filter.region(*region);
    }
    for age_group in &args.age_groups {
        filter = filter.age_group(age_group.as_str());
    }
    for gender in &args.genders {
        filter = filter.gender(*gender);
    }
    filter
}
