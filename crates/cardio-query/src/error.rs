use std::path::PathBuf;

use cardio_ingest::IngestError;
use cardio_transform::TransformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    /// The filter matched no rows. Callers render a placeholder.
    #[error("no data available")]
    NoData,

    #[error("failed to load analytic table {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: IngestError,
    },

    #[error("invalid analytic table: {0}")]
    Transform(#[from] TransformError),

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for QueryError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

impl QueryError {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
