use std::sync::Arc;

use cardio_model::Metric;
use polars::prelude::DataFrame;
use tracing::debug;

use crate::cache::{NoCache, QueryCache};
use crate::error::Result;
use crate::filter::{Dimension, QueryFilter, QueryKey};
use crate::table::AnalyticTable;

/// Shared entry point for dashboard requests.
///
/// Cheap to clone; clones share the table and the cache.
#[derive(Clone)]
pub struct AnalyticService {
    table: Arc<AnalyticTable>,
    cache: Arc<dyn QueryCache>,
}

impl AnalyticService {
    pub fn new(table: AnalyticTable, cache: Arc<dyn QueryCache>) -> Self {
        Self {
            table: Arc::new(table),
            cache,
        }
    }

    pub fn uncached(table: AnalyticTable) -> Self {
        Self::new(table, Arc::new(NoCache))
    }

    pub fn table(&self) -> &AnalyticTable {
        &self.table
    }

    pub fn cache(&self) -> &dyn QueryCache {
        self.cache.as_ref()
    }

    /// Rows matching `filter`. Not cached.
    pub fn rows(&self, filter: &QueryFilter) -> Result<DataFrame> {
        self.table.filter(filter)
    }

    /// Grouped means, served from the cache when the same key was seen
    /// before. Empty results are not cached.
    pub fn mean_by(
        &self,
        filter: QueryFilter,
        group_by: &[Dimension],
        metrics: &[Metric],
    ) -> Result<Arc<DataFrame>> {
        self.mean_for(QueryKey::new(filter, group_by, metrics))
    }

    pub fn mean_for(&self, key: QueryKey) -> Result<Arc<DataFrame>> {
        if let Some(hit) = self.cache.get(&key) {
            debug!(?key, "query cache hit");
            return Ok(hit);
        }
        let result = Arc::new(self.table.mean_by(&key)?);
        self.cache.insert(key, Arc::clone(&result));
        Ok(result)
    }
}
