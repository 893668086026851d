//! K-nearest-neighbour imputation.
//!
//! Distances use the nan-euclidean metric: squared differences over the
//! coordinates present in both rows, scaled up by
//! `total_coordinates / present_coordinates`. Donors are rows with a known
//! target; a row with no donor at a finite distance takes the donor mean.
//! Only missing target cells change.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use cardio_common::{ColumnData, set_column, text_values};
use cardio_model::is_identifier;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Imputer;
use crate::error::{ImputeError, Result};
use crate::groups::{require_column, target_values};
use crate::outcome::ImputeOutcome;
use crate::scaler::StandardScaler;

/// Distance paired with a donor row, ordered so the heap top is the
/// farthest donor (ties broken towards the higher row index).
#[derive(Debug, Clone, Copy)]
struct Neighbor(f64, usize);

impl PartialEq for Neighbor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0).then(self.1.cmp(&other.1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnImputer {
    pub k: usize,
    /// Scale features to zero mean and unit variance before measuring
    /// distance.
    pub standardize: bool,
    /// Numeric feature columns. `None` selects every numeric column that is
    /// not an identifier or the target.
    pub features: Option<Vec<String>>,
    /// Text columns encoded as first-appearance ordinals and added to the
    /// features.
    pub ordinal_features: Vec<String>,
}

impl Default for KnnImputer {
    fn default() -> Self {
        Self {
            k: 5,
            standardize: false,
            features: None,
            ordinal_features: Vec::new(),
        }
    }
}

impl KnnImputer {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }

    pub fn standardized(mut self) -> Self {
        self.standardize = true;
        self
    }

    pub fn with_features(mut self, columns: &[&str]) -> Self {
        self.features = Some(columns.iter().map(|c| (*c).to_string()).collect());
        self
    }

    pub fn with_ordinal_features(mut self, columns: &[&str]) -> Self {
        self.ordinal_features = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    fn feature_matrix(&self, df: &DataFrame, target: &str) -> Result<Vec<Vec<Option<f64>>>> {
        let mut matrix = Vec::new();
        match &self.features {
            Some(columns) => {
                for column in columns.iter().filter(|c| c.as_str() != target) {
                    matrix.push(target_values(df, column)?);
                }
            }
            None => {
                for column in df.get_columns() {
                    let name = column.name().as_str();
                    if name == target || is_identifier(name) || self.ordinal_features.iter().any(|c| c == name) {
                        continue;
                    }
                    match ColumnData::from_column(column)? {
                        ColumnData::Float(values) => matrix.push(values),
                        ColumnData::Int(values) => {
                            matrix.push(values.into_iter().map(|v| v.map(|x| x as f64)).collect());
                        }
                        ColumnData::Text(_) => {}
                    }
                }
            }
        }
        for column in &self.ordinal_features {
            require_column(df, column)?;
            matrix.push(ordinal_codes(&text_values(df, column)?));
        }
        Ok(matrix)
    }
}

impl Imputer for KnnImputer {
    fn name(&self) -> &'static str {
        "knn"
    }

    fn impute(&self, df: &DataFrame, target: &str) -> Result<(DataFrame, ImputeOutcome)> {
        if self.k == 0 {
            return Err(ImputeError::InvalidParameter {
                imputer: "knn",
                message: "k must be at least 1".to_string(),
            });
        }
        let mut values = target_values(df, target)?;
        let mut outcome = ImputeOutcome::new(target, self.name());

        let receivers: Vec<usize> = (0..values.len()).filter(|&i| values[i].is_none()).collect();
        let donors: Vec<usize> = (0..values.len()).filter(|&i| values[i].is_some()).collect();
        if receivers.is_empty() {
            return Ok((df.clone(), outcome));
        }
        if donors.is_empty() {
            outcome.skipped_groups = 1;
            outcome.remaining_missing = receivers.len();
            warn!(column = target, "knn imputation skipped: target has no known values");
            return Ok((df.clone(), outcome));
        }

        let mut features = self.feature_matrix(df, target)?;
        if self.standardize {
            StandardScaler::fit(&features).transform(&mut features);
        }
        let total_coordinates = (features.len() + 1) as f64;
        let donor_mean = donors.iter().filter_map(|&i| values[i]).sum::<f64>() / donors.len() as f64;

        let mut from_mean = 0;
        let mut updates = Vec::with_capacity(receivers.len());
        for &row in &receivers {
            let neighbors = nearest(&features, row, &donors, self.k, total_coordinates);
            let estimate = if neighbors.is_empty() {
                from_mean += 1;
                donor_mean
            } else {
                neighbors.iter().filter_map(|&i| values[i]).sum::<f64>() / neighbors.len() as f64
            };
            updates.push((row, estimate));
        }
        for (row, estimate) in updates {
            values[row] = Some(estimate);
        }
        outcome.filled = receivers.len();

        debug!(
            column = target,
            filled = outcome.filled,
            from_mean,
            features = features.len(),
            "knn imputation"
        );
        let mut out = df.clone();
        set_column(&mut out, target, ColumnData::Float(values))?;
        Ok((out, outcome))
    }
}

/// Up to `k` donors at finite distance from `row`, nearest first.
fn nearest(
    features: &[Vec<Option<f64>>],
    row: usize,
    donors: &[usize],
    k: usize,
    total_coordinates: f64,
) -> Vec<usize> {
    let mut heap: BinaryHeap<Neighbor> = BinaryHeap::with_capacity(k + 1);
    for &donor in donors {
        let Some(distance) = nan_euclidean(features, row, donor, total_coordinates) else {
            continue;
        };
        let candidate = Neighbor(distance, donor);
        if heap.len() < k {
            heap.push(candidate);
        } else if heap.peek().is_some_and(|farthest| candidate < *farthest) {
            heap.pop();
            heap.push(candidate);
        }
    }
    heap.into_sorted_vec().into_iter().map(|n| n.1).collect()
}

fn nan_euclidean(features: &[Vec<Option<f64>>], a: usize, b: usize, total: f64) -> Option<f64> {
    let mut present = 0usize;
    let mut sum = 0.0;
    for column in features {
        if let (Some(x), Some(y)) = (column[a], column[b]) {
            present += 1;
            sum += (x - y).powi(2);
        }
    }
    (present > 0).then(|| (total / present as f64 * sum).sqrt())
}

fn ordinal_codes(values: &[Option<String>]) -> Vec<Option<f64>> {
    let mut codes: HashMap<&str, usize> = HashMap::new();
    values
        .iter()
        .map(|value| {
            value.as_deref().map(|v| {
                let next = codes.len();
                *codes.entry(v).or_insert(next) as f64
            })
        })
        .collect()
}
