use std::io;
use std::path::{Path, PathBuf};

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("source file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot open {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Only `.csv`, `.xlsx` and `.xls` are read.
    #[error("{path}: '.{extension}' is neither csv nor a spreadsheet")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("{path}: malformed csv")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("{path}: unreadable workbook ({message})")]
    Workbook { path: PathBuf, message: String },

    #[error("{path}: expected a header on row {row}")]
    NoHeader { path: PathBuf, row: usize },

    #[error("{path} has no '{column}' column")]
    MissingColumn { column: String, path: PathBuf },

    #[error(transparent)]
    Frame(#[from] PolarsError),
}

impl IngestError {
    /// The source file the error refers to.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::FileNotFound { path }
            | Self::FileRead { path, .. }
            | Self::UnsupportedFormat { path, .. }
            | Self::CsvParse { path, .. }
            | Self::Workbook { path, .. }
            | Self::NoHeader { path, .. }
            | Self::MissingColumn { path, .. } => Some(path),
            Self::Frame(_) => None,
        }
    }

    pub(crate) fn open(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound { path },
            _ => Self::FileRead { path, source },
        }
    }

    pub(crate) fn csv(path: &Path, source: PolarsError) -> Self {
        Self::CsvParse {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
