use cardio_transform::TransformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImputeError {
    #[error("column '{column}' not found")]
    MissingColumn { column: String },

    #[error("invalid {imputer} parameter: {message}")]
    InvalidParameter {
        imputer: &'static str,
        message: String,
    },

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for ImputeError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImputeError>;
