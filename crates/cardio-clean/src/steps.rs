//! Steps shared by the cleaners.

use cardio_impute::Imputer;
use cardio_model::COUNTRY;
use cardio_standards::ExclusionScope;
use cardio_transform::{
    SourceFrame, SourceFrameMeta, TransformError, assert_unique_keys, assign_country_codes,
    drop_excluded,
};
use polars::prelude::DataFrame;
use tracing::info;

use crate::CleanContext;
use crate::error::{CleanError, InDataset, Result};
use crate::input::SourceInput;

pub(crate) fn tally(meta: &mut SourceFrameMeta, reason: &str, count: usize) {
    if count > 0 {
        *meta.dropped_rows.entry(reason.to_string()).or_default() += count;
    }
}

/// Drops aggregate entities, then assigns codes and canonical names.
pub(crate) fn resolve_countries(
    df: &DataFrame,
    ctx: &CleanContext<'_>,
    meta: &mut SourceFrameMeta,
) -> std::result::Result<DataFrame, TransformError> {
    let (df, aggregates) = drop_excluded(
        df,
        COUNTRY,
        &ctx.standards.exclusions,
        ExclusionScope::Aggregate,
    )?;
    tally(meta, "aggregate entity", aggregates);
    let (df, stats) = assign_country_codes(&df, &ctx.standards.resolver)?;
    tally(meta, "unresolved country", stats.unresolved);
    Ok(df)
}

/// Runs `imputer` on `column` and returns the new frame.
pub(crate) fn impute(
    df: &DataFrame,
    imputer: &dyn Imputer,
    column: &str,
    dataset: &'static str,
) -> Result<DataFrame> {
    let (out, outcome) = imputer
        .impute(df, column)
        .map_err(|source| CleanError::Impute {
            dataset,
            column: column.to_string(),
            source,
        })?;
    info!(
        dataset,
        column,
        strategy = outcome.strategy,
        filled = outcome.filled,
        overwritten = outcome.overwritten,
        "column imputed"
    );
    Ok(out)
}

/// Imputes each of `columns` from the same starting frame, so no column's
/// estimates feed another's.
pub(crate) fn impute_jointly(
    df: &DataFrame,
    imputer: &dyn Imputer,
    columns: &[&str],
    dataset: &'static str,
) -> Result<DataFrame> {
    let mut out = df.clone();
    for column in columns {
        let imputed = impute(df, imputer, column, dataset)?;
        let values = imputed
            .column(column)
            .map_err(TransformError::from)
            .in_dataset(dataset)?
            .clone();
        out.with_column(values)
            .map_err(TransformError::from)
            .in_dataset(dataset)?;
    }
    Ok(out)
}

/// Asserts key uniqueness and wraps the frame with its provenance.
pub(crate) fn finish(
    dataset: &'static str,
    data: DataFrame,
    key_columns: &[&str],
    inputs: &[&SourceInput],
    meta: SourceFrameMeta,
) -> Result<SourceFrame> {
    assert_unique_keys(&data, key_columns, dataset).in_dataset(dataset)?;
    let mut frame = SourceFrame::new(dataset, data, key_columns);
    frame.meta = Some(SourceFrameMeta {
        source_files: inputs.iter().map(|input| input.path.clone()).collect(),
        ..meta
    });
    info!(
        dataset,
        rows = frame.record_count(),
        dropped = frame.dropped_rows(),
        "dataset cleaned"
    );
    Ok(frame)
}
