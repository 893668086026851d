//! Analytic dataset pipeline.
//!
//! [`Pipeline::run_and_persist`] cleans the configured raw sources, merges
//! them with outer joins, imputes each metric with its configured strategy,
//! masks negative GDP, projects the stable snapshot schema and writes it
//! atomically together with a JSON [`RunReport`].

pub mod config;
pub mod error;
pub mod merge;
pub mod persist;
pub mod pipeline;
pub mod report;

pub use config::{PipelineConfig, SourceSpec, SourcesConfig, YearRange};
pub use error::{PipelineError, Result, Stage};
pub use merge::{country_year_coverage, merge_frames, shared_keys};
pub use pipeline::{IMPUTATION_ORDER, Pipeline, PipelineOutput};
pub use report::{RunReport, SourceReport};
