//! Missing-value imputers.
//!
//! Every strategy implements [`Imputer`]: it takes a frame and a target
//! column and returns a new frame in which only the target column differs,
//! plus an [`ImputeOutcome`] describing what changed.
//!
//! - [`PolynomialImputer`]: least-squares polynomial of the target against
//!   `Year`, per group or globally
//! - [`KnnImputer`]: mean of the k nearest rows under nan-euclidean distance
//! - [`FillInterpolateImputer`]: per-group series in year order, edges
//!   carried from the nearest known year and interior gaps interpolated

pub mod error;
pub mod fill;
pub mod groups;
pub mod knn;
pub mod outcome;
pub mod polynomial;
pub mod scaler;
pub mod strategy;

use polars::prelude::DataFrame;

pub use error::{ImputeError, Result};
pub use fill::FillInterpolateImputer;
pub use knn::KnnImputer;
pub use outcome::ImputeOutcome;
pub use polynomial::{PolynomialImputer, PolynomialMode};
pub use scaler::StandardScaler;
pub use strategy::ImputeStrategy;

/// A strategy for filling one numeric column.
pub trait Imputer: Send + Sync {
    /// Short strategy name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Returns `df` with `target` imputed. All other columns and the row
    /// order are unchanged.
    fn impute(&self, df: &DataFrame, target: &str) -> Result<(DataFrame, ImputeOutcome)>;
}
