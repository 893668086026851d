//! The analytic table as the dashboard sees it.

use std::path::Path;

use cardio_ingest::{ReadOptions, read_table, require_columns};
use cardio_model::{ANALYTIC_COLUMNS, Metric, YEAR};
use cardio_standards::RegionClassifier;
use cardio_transform::{add_region_column, parse_float_columns, parse_int_column};
use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{QueryError, Result};
use crate::filter::{Dimension, QueryFilter, QueryKey};

/// Immutable analytic snapshot with the derived `Region` column.
#[derive(Debug, Clone)]
pub struct AnalyticTable {
    data: DataFrame,
}

impl AnalyticTable {
    /// Loads a persisted snapshot. A `Region` column already present is
    /// recomputed.
    pub fn load(path: &Path, classifier: &RegionClassifier) -> Result<Self> {
        let raw = read_table(path, &ReadOptions::default()).map_err(|source| QueryError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        require_columns(&raw, &ANALYTIC_COLUMNS, path).map_err(|source| QueryError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let mut data = raw.select(ANALYTIC_COLUMNS)?;
        parse_int_column(&mut data, YEAR)?;
        let metrics: Vec<&str> = Metric::ALL.into_iter().map(Metric::column).collect();
        parse_float_columns(&mut data, &metrics)?;
        let table = Self::from_frame(data, classifier)?;
        info!(path = %path.display(), rows = table.height(), "analytic table loaded");
        Ok(table)
    }

    /// Wraps an already typed frame, deriving `Region`.
    pub fn from_frame(mut data: DataFrame, classifier: &RegionClassifier) -> Result<Self> {
        add_region_column(&mut data, classifier)?;
        Ok(Self { data })
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    /// Rows matching `filter`, or [`QueryError::NoData`].
    pub fn filter(&self, filter: &QueryFilter) -> Result<DataFrame> {
        let rows = match filter.predicate() {
            Some(predicate) => self.data.clone().lazy().filter(predicate).collect()?,
            None => self.data.clone(),
        };
        if rows.height() == 0 {
            return Err(QueryError::NoData);
        }
        Ok(rows)
    }

    /// Mean of each metric per group, sorted by the group columns. Missing
    /// values are ignored; a group with none known gets a null mean. With
    /// no dimensions the result is a single row over every matching row.
    pub fn mean_by(&self, key: &QueryKey) -> Result<DataFrame> {
        let rows = self.filter(&key.filter)?;
        let means: Vec<Expr> = key
            .metrics
            .iter()
            .map(|metric| col(metric.column()).mean())
            .collect();
        let dims: Vec<&str> = key.group_by.iter().map(|dim| dim.column()).collect();

        let out = if dims.is_empty() {
            rows.lazy().select(means).collect()?
        } else {
            let keys: Vec<Expr> = dims.iter().map(|d| col(*d)).collect();
            rows.lazy()
                .group_by(keys)
                .agg(means)
                .sort(dims.clone(), SortMultipleOptions::default().with_nulls_last(true))
                .collect()?
        };
        debug!(
            groups = out.height(),
            dimensions = ?key.group_by,
            metrics = key.metrics.len(),
            "grouped means computed"
        );
        Ok(out)
    }

    /// Distinct values of `dim`, sorted, nulls excluded.
    pub fn distinct(&self, dim: Dimension) -> Result<Vec<String>> {
        let mut values: Vec<String> = cardio_common::text_values(&self.data, dim.column())?
            .into_iter()
            .flatten()
            .collect();
        values.sort();
        values.dedup();
        Ok(values)
    }
}
