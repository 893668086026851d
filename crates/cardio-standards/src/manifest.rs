#![deny(unsafe_code)]

//! `standards/manifest.toml`: pinned lookup tables and their checksums.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const MANIFEST_SCHEMA: &str = "cardio.standards-manifest";
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub manifest: ManifestHeader,
    #[serde(default)]
    pub notes: Option<ManifestNotes>,
    pub pins: Pins,
    pub files: Vec<ManifestFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestHeader {
    pub schema: String,
    pub schema_version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestNotes {
    pub summary: Option<String>,
}

/// Versions of the upstream registry and of the hand-maintained tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pins {
    pub iso3166: String,
    pub overrides: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestFile {
    pub path: String,
    pub sha256: String,
    pub kind: FileKind,
    pub role: TableRole,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Csv,
    Toml,
}

/// What a listed table is used for. Every role must appear exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRole {
    Countries,
    CountryOverrides,
    RegionOverrides,
    ExcludedEntities,
    RegionalFallbacks,
}

impl TableRole {
    pub const ALL: [TableRole; 5] = [
        TableRole::Countries,
        TableRole::CountryOverrides,
        TableRole::RegionOverrides,
        TableRole::ExcludedEntities,
        TableRole::RegionalFallbacks,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TableRole::Countries => "countries",
            TableRole::CountryOverrides => "country_overrides",
            TableRole::RegionOverrides => "region_overrides",
            TableRole::ExcludedEntities => "excluded_entities",
            TableRole::RegionalFallbacks => "regional_fallbacks",
        }
    }
}

impl fmt::Display for TableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Manifest {
    pub fn is_supported(&self) -> bool {
        self.manifest.schema == MANIFEST_SCHEMA
            && self.manifest.schema_version == MANIFEST_SCHEMA_VERSION
    }
}
