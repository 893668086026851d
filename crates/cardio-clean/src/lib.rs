//! Source cleaners.
//!
//! Each cleaner owns one family of raw files, brings them into the common
//! schema (`Country`, `Country_Code`, `Year`, optional `Gender` and
//! `Age_Group`, metric columns), and hands the merger a [`SourceFrame`]
//! whose key columns are unique.
//!
//! Cleaners split loading from cleaning: [`SourceCleaner::clean`] reads the
//! configured files, and each cleaner's `clean_frames` works on frames
//! already in memory.

pub mod activity;
pub mod diabetes_alcohol;
pub mod disease;
pub mod error;
pub mod gho;
pub mod input;
pub mod overweight_health;
mod steps;

use std::ops::RangeInclusive;

use cardio_standards::StandardsRegistry;
use cardio_transform::SourceFrame;

pub use activity::ActivityObesityGdpCleaner;
pub use diabetes_alcohol::DiabetesAlcoholCleaner;
pub use disease::DiseaseMetricsCleaner;
pub use error::{CleanError, Result};
pub use input::SourceInput;
pub use overweight_health::OverweightHealthCleaner;

/// Lookup tables and settings shared by the cleaners.
#[derive(Debug, Clone)]
pub struct CleanContext<'a> {
    pub standards: &'a StandardsRegistry,
    /// Years synthesized for series that start later.
    pub placeholder_years: RangeInclusive<i64>,
}

impl<'a> CleanContext<'a> {
    pub fn new(standards: &'a StandardsRegistry) -> Self {
        Self {
            standards,
            placeholder_years: 1960..=1989,
        }
    }

    pub fn with_placeholder_years(mut self, years: RangeInclusive<i64>) -> Self {
        self.placeholder_years = years;
        self
    }
}

/// One dataset family.
pub trait SourceCleaner {
    /// Dataset name used in logs, reports and errors.
    fn name(&self) -> &'static str;

    fn inputs(&self) -> Vec<&SourceInput>;

    /// Loads every input and cleans the result.
    fn clean(&self, ctx: &CleanContext<'_>) -> Result<SourceFrame>;
}
