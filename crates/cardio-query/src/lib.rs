//! Read-only queries over the analytic snapshot.
//!
//! The dashboard loads the snapshot once as an [`AnalyticTable`] (deriving
//! `Region` per row), then filters by year, country, region, age group and
//! gender and averages metrics per group. [`AnalyticService`] memoizes
//! grouped results in an injected [`QueryCache`] keyed by every request
//! parameter. A filter matching nothing is [`QueryError::NoData`], shown to
//! users as "no data available".

pub mod cache;
pub mod error;
pub mod filter;
pub mod service;
pub mod table;

pub use cache::{LruTtlCache, NoCache, QueryCache};
pub use error::{QueryError, Result};
pub use filter::{Dimension, QueryFilter, QueryKey};
pub use service::AnalyticService;
pub use table::AnalyticTable;
