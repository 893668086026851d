#![deny(unsafe_code)]

use std::path::PathBuf;

use crate::manifest::TableRole;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("manifest schema {schema} v{version} is not supported")]
    UnsupportedSchema { schema: String, version: u32 },

    #[error("manifest lists no table for role {role}")]
    MissingRole { role: TableRole },

    #[error("manifest lists more than one table for role {role}")]
    DuplicateRole { role: TableRole },

    /// Bad `path` or `sha256` field on a manifest entry.
    #[error("manifest entry {entry}: {message}")]
    InvalidEntry { entry: String, message: String },

    #[error("table listed in manifest is absent: {path}")]
    MissingFile { path: PathBuf },

    #[error("{path} is not listed in the manifest")]
    UnexpectedFile { path: PathBuf },

    #[error("checksum of {path} is {actual}, manifest pins {expected}")]
    Sha256Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("bad table {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("name '{name}' maps to both {first} and {second}")]
    AmbiguousName {
        name: String,
        first: String,
        second: String,
    },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Csv {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_entry(entry: &str, message: impl Into<String>) -> Self {
        Self::InvalidEntry {
            entry: entry.to_string(),
            message: message.into(),
        }
    }
}
