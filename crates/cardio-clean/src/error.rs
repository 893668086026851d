use std::path::{Path, PathBuf};

use cardio_impute::ImputeError;
use cardio_ingest::IngestError;
use cardio_transform::TransformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CleanError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// A step on a single source file failed.
    #[error("{}: {source}", path.display())]
    Transform {
        path: PathBuf,
        #[source]
        source: TransformError,
    },

    /// A step after the dataset's sources were combined failed.
    #[error("{dataset}: {source}")]
    Combine {
        dataset: &'static str,
        #[source]
        source: TransformError,
    },

    #[error("{dataset}: imputation of {column} failed: {source}")]
    Impute {
        dataset: &'static str,
        column: String,
        #[source]
        source: ImputeError,
    },
}

impl CleanError {
    /// The raw file at fault, when the failure is tied to one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Ingest(err) => err.path(),
            Self::Transform { path, .. } => Some(path),
            Self::Combine { .. } | Self::Impute { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CleanError>;

/// Attaches the source file to a transform failure.
pub(crate) trait AtPath<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> AtPath<T> for std::result::Result<T, TransformError> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|source| CleanError::Transform {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Attaches the dataset name to a failure after sources were combined.
pub(crate) trait InDataset<T> {
    fn in_dataset(self, dataset: &'static str) -> Result<T>;
}

impl<T> InDataset<T> for std::result::Result<T, TransformError> {
    fn in_dataset(self, dataset: &'static str) -> Result<T> {
        self.map_err(|source| CleanError::Combine { dataset, source })
    }
}
