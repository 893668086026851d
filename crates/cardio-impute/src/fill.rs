//! Forward/backward fill with linear interpolation.

use cardio_common::{ColumnData, set_column};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Imputer;
use crate::error::Result;
use crate::groups::{group_rows, target_values, years};
use crate::outcome::ImputeOutcome;

/// Fills each group's series in year order. Gaps before the first and after
/// the last known year take the nearest known value; gaps between two known
/// years are interpolated linearly by year, or carried forward when
/// `interpolate` is off. Groups with no known value are left missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillInterpolateImputer {
    pub group_by: Vec<String>,
    pub interpolate: bool,
}

impl Default for FillInterpolateImputer {
    fn default() -> Self {
        Self {
            group_by: Vec::new(),
            interpolate: true,
        }
    }
}

impl FillInterpolateImputer {
    pub fn grouped(mut self, columns: &[&str]) -> Self {
        self.group_by = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }
}

impl Imputer for FillInterpolateImputer {
    fn name(&self) -> &'static str {
        "fill_interpolate"
    }

    fn impute(&self, df: &DataFrame, target: &str) -> Result<(DataFrame, ImputeOutcome)> {
        let mut values = target_values(df, target)?;
        let years = years(df)?;
        let missing_before = values.iter().filter(|v| v.is_none()).count();
        let mut outcome = ImputeOutcome::new(target, self.name());

        for mut rows in group_rows(df, &self.group_by)? {
            rows.sort_by(|&a, &b| match (years[a], years[b]) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
            if !fill_series(&mut values, &years, &rows, self.interpolate) {
                outcome.skipped_groups += 1;
            }
        }

        outcome.remaining_missing = values.iter().filter(|v| v.is_none()).count();
        outcome.filled = missing_before - outcome.remaining_missing;
        debug!(
            column = target,
            filled = outcome.filled,
            remaining = outcome.remaining_missing,
            skipped_groups = outcome.skipped_groups,
            "fill and interpolate"
        );

        let mut out = df.clone();
        if outcome.filled > 0 {
            set_column(&mut out, target, ColumnData::Float(values))?;
        }
        Ok((out, outcome))
    }
}

/// Fills one group whose `rows` are in year order. Returns `false` when the
/// group has no known value to fill from.
fn fill_series(
    values: &mut [Option<f64>],
    years: &[Option<f64>],
    rows: &[usize],
    interpolate: bool,
) -> bool {
    let known: Vec<usize> = (0..rows.len())
        .filter(|&pos| values[rows[pos]].is_some())
        .collect();
    let (Some(&first), Some(&last)) = (known.first(), known.last()) else {
        return false;
    };

    let head = values[rows[first]];
    for &idx in &rows[..first] {
        values[idx] = head;
    }
    let tail = values[rows[last]];
    for &idx in &rows[last + 1..] {
        values[idx] = tail;
    }

    for pair in known.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let (Some(from), Some(to)) = (values[rows[start]], values[rows[end]]) else {
            continue;
        };
        for pos in start + 1..end {
            values[rows[pos]] = Some(if interpolate {
                let t = fraction(years, rows, start, pos, end);
                from + (to - from) * t
            } else {
                from
            });
        }
    }
    true
}

/// Where `pos` sits between `start` and `end`, measured in years when all
/// three are known and by row position otherwise.
fn fraction(years: &[Option<f64>], rows: &[usize], start: usize, pos: usize, end: usize) -> f64 {
    if let (Some(a), Some(x), Some(b)) = (years[rows[start]], years[rows[pos]], years[rows[end]])
        && b > a
    {
        return (x - a) / (b - a);
    }
    (pos - start) as f64 / (end - start) as f64
}
