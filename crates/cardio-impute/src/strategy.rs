//! Configurable imputation strategies.

use serde::{Deserialize, Serialize};

use crate::{FillInterpolateImputer, Imputer, KnnImputer, PolynomialImputer};

/// A strategy as written in pipeline configuration:
///
/// ```toml
/// GDP = { strategy = "knn", k = 5 }
/// Life_Expectancy = { strategy = "fill_interpolate", group_by = ["Country_Code"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ImputeStrategy {
    Knn(KnnImputer),
    Polynomial(PolynomialImputer),
    FillInterpolate(FillInterpolateImputer),
}

impl Default for ImputeStrategy {
    fn default() -> Self {
        Self::Knn(KnnImputer::default())
    }
}

impl ImputeStrategy {
    pub fn imputer(&self) -> &dyn Imputer {
        match self {
            Self::Knn(imputer) => imputer,
            Self::Polynomial(imputer) => imputer,
            Self::FillInterpolate(imputer) => imputer,
        }
    }
}
