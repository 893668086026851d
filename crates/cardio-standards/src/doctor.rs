#![deny(unsafe_code)]

use serde::Serialize;

use crate::manifest::{ManifestFile, Pins};
use crate::registry::VerifySummary;

pub const DOCTOR_SCHEMA: &str = "cardio.standards-doctor";

/// What `cardio standards` prints: the pinned tables and how many rows each
/// contributed.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub schema: &'static str,
    pub schema_version: u32,
    pub pins: Pins,
    pub files: Vec<ManifestFile>,
    pub counts: DoctorCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorCounts {
    pub files: usize,
    pub countries: usize,
    pub name_overrides: usize,
    pub region_overrides: usize,
    pub aggregates: usize,
    pub territories: usize,
    pub regional_fallbacks: usize,
}

impl From<&VerifySummary> for DoctorCounts {
    fn from(summary: &VerifySummary) -> Self {
        Self {
            files: summary.file_count,
            countries: summary.country_count,
            name_overrides: summary.name_override_count,
            region_overrides: summary.region_override_count,
            aggregates: summary.aggregate_count,
            territories: summary.territory_count,
            regional_fallbacks: summary.regional_fallback_count,
        }
    }
}

impl DoctorReport {
    pub fn from_verify_summary(summary: &VerifySummary, files: Vec<ManifestFile>) -> Self {
        Self {
            schema: DOCTOR_SCHEMA,
            schema_version: 1,
            pins: summary.manifest_pins.clone(),
            files,
            counts: DoctorCounts::from(summary),
        }
    }
}
