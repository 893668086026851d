use std::fmt;
use std::path::{Path, PathBuf};

use cardio_clean::CleanError;
use cardio_impute::ImputeError;
use cardio_transform::TransformError;
use thiserror::Error;

/// Pipeline stages, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Clean,
    Merge,
    Impute,
    Sanity,
    Project,
    Persist,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Clean => "clean",
            Stage::Merge => "merge",
            Stage::Impute => "impute",
            Stage::Sanity => "sanity",
            Stage::Project => "project",
            Stage::Persist => "persist",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    #[error("clean stage failed for {dataset}: {source}")]
    Clean {
        dataset: &'static str,
        #[source]
        source: CleanError,
    },

    #[error("{stage} stage failed: {source}")]
    Transform {
        stage: Stage,
        #[source]
        source: TransformError,
    },

    #[error("impute stage failed for {column}: {source}")]
    Impute {
        column: String,
        #[source]
        source: ImputeError,
    },

    #[error("persist stage failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("persist stage failed for {}: {message}", path.display())]
    Write { path: PathBuf, message: String },
}

impl PipelineError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn transform(stage: Stage) -> impl FnOnce(TransformError) -> Self {
        move |source| Self::Transform { stage, source }
    }

    /// The stage that failed; `None` for configuration errors.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::ConfigRead { .. } | Self::ConfigParse { .. } | Self::InvalidConfig { .. } => None,
            Self::Clean { .. } => Some(Stage::Clean),
            Self::Transform { stage, .. } => Some(*stage),
            Self::Impute { .. } => Some(Stage::Impute),
            Self::Io { .. } | Self::Write { .. } => Some(Stage::Persist),
        }
    }

    /// The file at fault, when one is known.
    pub fn file(&self) -> Option<&Path> {
        match self {
            Self::ConfigRead { path, .. }
            | Self::ConfigParse { path, .. }
            | Self::Io { path, .. }
            | Self::Write { path, .. } => Some(path),
            Self::Clean { source, .. } => source.path(),
            Self::InvalidConfig { .. } | Self::Transform { .. } | Self::Impute { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
