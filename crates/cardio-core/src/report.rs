//! JSON run report written next to the analytic snapshot.

use std::collections::BTreeMap;
use std::path::PathBuf;

use cardio_impute::ImputeOutcome;
use cardio_transform::SourceFrame;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const REPORT_SCHEMA: &str = "cardio.run-report";
pub const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub dataset: String,
    pub rows: usize,
    pub source_files: Vec<PathBuf>,
    pub dropped_rows: BTreeMap<String, usize>,
}

impl SourceReport {
    pub fn from_frame(frame: &SourceFrame) -> Self {
        Self {
            dataset: frame.name.clone(),
            rows: frame.record_count(),
            source_files: frame.source_files().to_vec(),
            dropped_rows: frame
                .meta
                .as_ref()
                .map(|meta| meta.dropped_rows.clone())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub schema: &'static str,
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub sources: Vec<SourceReport>,
    pub merged_rows: usize,
    pub imputation: Vec<ImputeOutcome>,
    pub masked_negative_gdp: usize,
    pub dropped_columns: Vec<String>,
    pub output_rows: usize,
    /// Snapshot path; unset until the snapshot is written.
    pub output: Option<PathBuf>,
}

impl RunReport {
    pub fn new(generated_at: DateTime<Utc>) -> Self {
        Self {
            schema: REPORT_SCHEMA,
            schema_version: REPORT_SCHEMA_VERSION,
            generated_at,
            sources: Vec::new(),
            merged_rows: 0,
            imputation: Vec::new(),
            masked_negative_gdp: 0,
            dropped_columns: Vec::new(),
            output_rows: 0,
            output: None,
        }
    }

    /// Cells still missing after imputation, summed over every metric.
    pub fn remaining_missing(&self) -> usize {
        self.imputation.iter().map(|o| o.remaining_missing).sum()
    }

    /// Metrics an imputer left untouched for lack of data.
    pub fn skipped_columns(&self) -> Vec<&str> {
        self.imputation
            .iter()
            .filter(|o| o.is_skipped())
            .map(|o| o.column.as_str())
            .collect()
    }
}
