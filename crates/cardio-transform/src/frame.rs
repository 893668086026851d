//! Cleaned source frames.
//!
//! A [`SourceFrame`] is what a cleaner hands to the merger: the data in the
//! common schema, the columns that identify a row, and where it came from.

use std::collections::BTreeMap;
use std::path::PathBuf;

use polars::prelude::DataFrame;

/// Provenance of a cleaned frame.
#[derive(Debug, Clone, Default)]
pub struct SourceFrameMeta {
    /// Raw files that contributed rows.
    pub source_files: Vec<PathBuf>,
    /// Rows removed during cleaning, by reason.
    pub dropped_rows: BTreeMap<String, usize>,
}

/// A cleaned dataset in the common schema.
#[derive(Debug, Clone)]
pub struct SourceFrame {
    /// Dataset family name (e.g. "disease_metrics").
    pub name: String,
    pub data: DataFrame,
    /// Columns whose values are unique per row.
    pub key_columns: Vec<String>,
    pub meta: Option<SourceFrameMeta>,
}

impl SourceFrame {
    pub fn new(name: impl Into<String>, data: DataFrame, key_columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            data,
            key_columns: key_columns.iter().map(|c| (*c).to_string()).collect(),
            meta: None,
        }
    }

    pub fn record_count(&self) -> usize {
        self.data.height()
    }

    pub fn source_files(&self) -> &[PathBuf] {
        self.meta
            .as_ref()
            .map(|m| m.source_files.as_slice())
            .unwrap_or(&[])
    }

    pub fn add_source_file(&mut self, path: PathBuf) {
        let meta = self.meta.get_or_insert_with(SourceFrameMeta::default);
        meta.source_files.push(path);
    }

    /// Adds to the dropped-row count for `reason`. Zero counts are not recorded.
    pub fn record_dropped(&mut self, reason: &str, count: usize) {
        if count == 0 {
            return;
        }
        let meta = self.meta.get_or_insert_with(SourceFrameMeta::default);
        *meta.dropped_rows.entry(reason.to_string()).or_default() += count;
    }

    pub fn dropped_rows(&self) -> usize {
        self.meta
            .as_ref()
            .map(|m| m.dropped_rows.values().sum())
            .unwrap_or(0)
    }

    pub fn key_refs(&self) -> Vec<&str> {
        self.key_columns.iter().map(String::as_str).collect()
    }
}
