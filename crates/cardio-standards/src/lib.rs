#![deny(unsafe_code)]

pub mod doctor;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod paths;
pub mod region;
pub mod registry;
pub mod resolver;
pub mod tables;

pub use crate::doctor::DoctorReport;
pub use crate::error::StandardsError;
pub use crate::manifest::{FileKind, Manifest, ManifestFile, TableRole};
pub use crate::paths::{STANDARDS_ENV_VAR, standards_root};
pub use crate::region::RegionClassifier;
pub use crate::registry::{StandardsRegistry, VerifySummary};
pub use crate::resolver::CountryCodeResolver;
pub use crate::tables::{ExclusionList, ExclusionScope, RegionalFallbacks};
