//! Polynomial time-trend imputation.
//!
//! Fits `value ~ poly(Year)` by least squares over the known points of each
//! group. Years are mapped onto `[-1, 1]` across the known range before
//! fitting, which keeps the normal equations well conditioned for calendar
//! years.

use cardio_common::{ColumnData, set_column};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Imputer;
use crate::error::{ImputeError, Result};
use crate::groups::{group_rows, target_values, years};
use crate::outcome::ImputeOutcome;

/// Which cells receive fitted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolynomialMode {
    /// Every row with a year takes the fitted value, known cells included.
    #[default]
    Overwrite,
    /// Only missing cells are filled.
    FillGaps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolynomialImputer {
    pub degree: usize,
    /// Columns defining independent series; empty fits one global curve.
    pub group_by: Vec<String>,
    pub mode: PolynomialMode,
    /// Lower bound applied to fitted values.
    pub min_value: Option<f64>,
}

impl Default for PolynomialImputer {
    fn default() -> Self {
        Self {
            degree: 2,
            group_by: Vec::new(),
            mode: PolynomialMode::Overwrite,
            min_value: None,
        }
    }
}

impl PolynomialImputer {
    pub fn grouped(mut self, columns: &[&str]) -> Self {
        self.group_by = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    pub fn with_mode(mut self, mode: PolynomialMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_min_value(mut self, min_value: f64) -> Self {
        self.min_value = Some(min_value);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.degree > 8 {
            return Err(ImputeError::InvalidParameter {
                imputer: "polynomial",
                message: format!("degree {} is above the supported maximum of 8", self.degree),
            });
        }
        Ok(())
    }
}

impl Imputer for PolynomialImputer {
    fn name(&self) -> &'static str {
        "polynomial"
    }

    fn impute(&self, df: &DataFrame, target: &str) -> Result<(DataFrame, ImputeOutcome)> {
        self.validate()?;
        let original = target_values(df, target)?;
        let years = years(df)?;
        let mut values = original.clone();
        let mut outcome = ImputeOutcome::new(target, self.name());

        for rows in group_rows(df, &self.group_by)? {
            let known: Vec<(f64, f64)> = rows
                .iter()
                .filter_map(|&idx| Some((years[idx]?, original[idx]?)))
                .collect();
            let Some(fit) = TrendFit::fit(&known, self.degree) else {
                outcome.skipped_groups += 1;
                continue;
            };
            for &idx in &rows {
                let Some(year) = years[idx] else { continue };
                if self.mode == PolynomialMode::FillGaps && original[idx].is_some() {
                    continue;
                }
                let mut fitted = fit.evaluate(year);
                if let Some(min) = self.min_value {
                    fitted = fitted.max(min);
                }
                if !fitted.is_finite() {
                    continue;
                }
                match original[idx] {
                    Some(_) => outcome.overwritten += 1,
                    None => outcome.filled += 1,
                }
                values[idx] = Some(fitted);
            }
        }

        outcome.remaining_missing = values.iter().filter(|v| v.is_none()).count();
        if outcome.is_skipped() {
            warn!(column = target, groups = outcome.skipped_groups, "polynomial fit skipped: fewer than 2 known points");
            return Ok((df.clone(), outcome));
        }
        if outcome.skipped_groups > 0 {
            debug!(column = target, groups = outcome.skipped_groups, "polynomial fit skipped for some groups");
        }

        let mut out = df.clone();
        if outcome.filled + outcome.overwritten > 0 {
            set_column(&mut out, target, ColumnData::Float(values))?;
        }
        Ok((out, outcome))
    }
}

/// A fitted polynomial over a normalized year domain.
#[derive(Debug, Clone)]
struct TrendFit {
    coefficients: Vec<f64>,
    offset: f64,
    half_width: f64,
}

impl TrendFit {
    /// Fits `points` with degree `min(degree, distinct_x - 1)`. Needs at
    /// least two points.
    fn fit(points: &[(f64, f64)], degree: usize) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let mut distinct: Vec<f64> = points.iter().map(|(x, _)| *x).collect();
        distinct.sort_by(f64::total_cmp);
        distinct.dedup();
        let degree = degree.min(distinct.len().saturating_sub(1));

        let (min, max) = (distinct[0], distinct[distinct.len() - 1]);
        let offset = (min + max) / 2.0;
        let half_width = if max > min { (max - min) / 2.0 } else { 1.0 };

        let size = degree + 1;
        let mut normal = vec![vec![0.0; size]; size];
        let mut rhs = vec![0.0; size];
        for (x, y) in points {
            let powers = powers((x - offset) / half_width, size);
            for row in 0..size {
                rhs[row] += powers[row] * y;
                for col in 0..size {
                    normal[row][col] += powers[row] * powers[col];
                }
            }
        }
        let coefficients = solve(normal, rhs)?;
        Some(Self {
            coefficients,
            offset,
            half_width,
        })
    }

    fn evaluate(&self, x: f64) -> f64 {
        let t = (x - self.offset) / self.half_width;
        self.coefficients.iter().rev().fold(0.0, |acc, c| acc * t + c)
    }
}

fn powers(t: f64, count: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(count);
    let mut current = 1.0;
    for _ in 0..count {
        out.push(current);
        current *= t;
    }
    out
}

/// Gaussian elimination with partial pivoting. `None` when singular.
fn solve(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Option<Vec<f64>> {
    let n = rhs.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&a, &b| matrix[a][col].abs().total_cmp(&matrix[b][col].abs()))?;
        if matrix[pivot][col].abs() < 1e-12 {
            return None;
        }
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);
        for row in col + 1..n {
            let factor = matrix[row][col] / matrix[col][col];
            for k in col..n {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }
    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| matrix[row][k] * solution[k]).sum();
        solution[row] = (rhs[row] - tail) / matrix[row][row];
    }
    Some(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardio_common::float_values;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn exact_quadratic_is_recovered() {
        let points: Vec<(f64, f64)> = (1990..=2000)
            .map(|y| {
                let x = f64::from(y);
                (x, 3.0 + 0.5 * (x - 1995.0) - 0.25 * (x - 1995.0).powi(2))
            })
            .collect();
        let fit = TrendFit::fit(&points, 2).unwrap();
        assert!(close(fit.evaluate(1995.0), 3.0));
        assert!(close(fit.evaluate(2002.0), 3.0 + 3.5 - 0.25 * 49.0));
    }

    #[test]
    fn two_points_fit_a_line() {
        let fit = TrendFit::fit(&[(2001.0, 50000.0), (2003.0, 54000.0)], 2).unwrap();
        assert!(close(fit.evaluate(2000.0), 48000.0));
        assert!(close(fit.evaluate(2002.0), 52000.0));
    }

    #[test]
    fn single_point_does_not_fit() {
        assert!(TrendFit::fit(&[(2001.0, 50000.0)], 2).is_none());
        assert!(TrendFit::fit(&[], 2).is_none());
    }

    #[test]
    fn overwrite_mode_replaces_known_values() {
        let df = df! {
            "Year" => [2000i64, 2001, 2002, 2003, 2004],
            "GDP" => [Some(1.0), Some(3.0), None, Some(4.0), Some(2.0)],
        }
        .unwrap();
        let (out, outcome) = PolynomialImputer::default().impute(&df, "GDP").unwrap();
        assert_eq!(outcome.filled, 1);
        assert_eq!(outcome.overwritten, 4);
        assert_eq!(outcome.remaining_missing, 0);
        let values = float_values(&out, "GDP").unwrap();
        assert!(values.iter().all(Option::is_some));
        assert!(!close(values[0].unwrap(), 1.0));
    }

    #[test]
    fn fill_gaps_mode_keeps_known_values_and_clamps() {
        let df = df! {
            "Year" => [2000i64, 2001, 2002, 2010],
            "IncidenceRate" => [Some(3.0), Some(2.0), Some(1.0), None],
        }
        .unwrap();
        let imputer = PolynomialImputer::default()
            .with_mode(PolynomialMode::FillGaps)
            .with_min_value(0.0);
        let (out, outcome) = imputer.impute(&df, "IncidenceRate").unwrap();
        assert_eq!(outcome.overwritten, 0);
        assert_eq!(
            float_values(&out, "IncidenceRate").unwrap(),
            vec![Some(3.0), Some(2.0), Some(1.0), Some(0.0)]
        );
    }

    #[test]
    fn groups_fit_independently() {
        let df = df! {
            "Country_Code" => ["USA", "USA", "USA", "FRA", "FRA"],
            "Year" => [2000i64, 2001, 2002, 2000, 2001],
            "GDP" => [Some(10.0), Some(20.0), None, Some(5.0), None],
        }
        .unwrap();
        let imputer = PolynomialImputer::default()
            .grouped(&["Country_Code"])
            .with_mode(PolynomialMode::FillGaps);
        let (out, outcome) = imputer.impute(&df, "GDP").unwrap();
        assert_eq!(outcome.filled, 1);
        assert_eq!(outcome.skipped_groups, 1);
        let values = float_values(&out, "GDP").unwrap();
        assert!(close(values[2].unwrap(), 30.0));
        assert_eq!(values[4], None);
    }
}
