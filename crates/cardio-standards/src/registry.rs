#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::error::StandardsError;
use crate::hash::sha256_file;
use crate::manifest::{FileKind, Manifest, ManifestFile, Pins, TableRole};
use crate::paths::standards_root;
use crate::region::RegionClassifier;
use crate::resolver::CountryCodeResolver;
use crate::tables::{
    ExclusionList, ExclusionScope, RegionalFallbacks, parse_countries_csv,
    parse_excluded_entities_csv, parse_name_overrides_csv, parse_region_overrides_csv,
    parse_regional_fallbacks_csv,
};

pub const MANIFEST_FILE: &str = "manifest.toml";

#[derive(Debug, Clone, serde::Serialize)]
pub struct VerifySummary {
    pub standards_dir: PathBuf,
    pub manifest_pins: Pins,
    pub file_count: usize,
    pub country_count: usize,
    pub name_override_count: usize,
    pub region_override_count: usize,
    pub aggregate_count: usize,
    pub territory_count: usize,
    pub regional_fallback_count: usize,
}

/// Checksum-verified lookup tables.
#[derive(Debug, Clone)]
pub struct StandardsRegistry {
    pub manifest: Manifest,
    /// Manifest entries ordered by path.
    pub files: Vec<ManifestFile>,
    pub resolver: CountryCodeResolver,
    pub classifier: RegionClassifier,
    pub exclusions: ExclusionList,
    pub fallbacks: RegionalFallbacks,
}

impl StandardsRegistry {
    /// Loads from [`standards_root`].
    pub fn load_default() -> Result<(Self, VerifySummary), StandardsError> {
        Self::verify_and_load(&standards_root())
    }

    /// Reads the manifest, checks every listed table against its pinned
    /// checksum, rejects files the manifest does not list, then parses the
    /// tables.
    pub fn verify_and_load(standards_dir: &Path) -> Result<(Self, VerifySummary), StandardsError> {
        let manifest = read_manifest(&standards_dir.join(MANIFEST_FILE))?;
        if !manifest.is_supported() {
            return Err(StandardsError::UnsupportedSchema {
                schema: manifest.manifest.schema.clone(),
                version: manifest.manifest.schema_version,
            });
        }

        let tables = TablePaths::index(&manifest, standards_dir)?;
        tables.reject_unlisted(standards_dir)?;

        let mut files = manifest.files.clone();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        for file in &files {
            verify_checksum(standards_dir, file)?;
        }

        let resolver = CountryCodeResolver::new(
            parse_countries_csv(tables.path(TableRole::Countries)?)?,
            parse_name_overrides_csv(tables.path(TableRole::CountryOverrides)?)?,
        )?;
        let classifier = RegionClassifier::new(
            parse_region_overrides_csv(tables.path(TableRole::RegionOverrides)?)?,
            resolver.clone(),
        );
        let exclusions = parse_excluded_entities_csv(tables.path(TableRole::ExcludedEntities)?)?;
        let fallbacks = parse_regional_fallbacks_csv(tables.path(TableRole::RegionalFallbacks)?)?;

        let summary = VerifySummary {
            standards_dir: standards_dir.to_path_buf(),
            manifest_pins: manifest.pins.clone(),
            file_count: files.len(),
            country_count: resolver.country_count(),
            name_override_count: resolver.override_count(),
            region_override_count: classifier.override_count(),
            aggregate_count: exclusions.count(ExclusionScope::Aggregate),
            territory_count: exclusions.count(ExclusionScope::WorldHealth),
            regional_fallback_count: fallbacks.len(),
        };
        info!(
            standards_dir = %standards_dir.display(),
            countries = summary.country_count,
            overrides = summary.name_override_count,
            "standards verified"
        );

        let registry = Self {
            manifest,
            files,
            resolver,
            classifier,
            exclusions,
            fallbacks,
        };
        Ok((registry, summary))
    }
}

fn read_manifest(path: &Path) -> Result<Manifest, StandardsError> {
    let text = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
    toml::from_str(&text).map_err(|source| StandardsError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Where each role's table lives, plus every path the manifest lists.
struct TablePaths {
    by_role: BTreeMap<TableRole, PathBuf>,
    listed: BTreeSet<PathBuf>,
}

impl TablePaths {
    fn index(manifest: &Manifest, standards_dir: &Path) -> Result<Self, StandardsError> {
        let mut by_role = BTreeMap::new();
        let mut listed = BTreeSet::new();
        for file in &manifest.files {
            if !is_sha256_hex(&file.sha256) {
                return Err(StandardsError::invalid_entry(
                    &file.path,
                    "sha256 must be 64 hex digits",
                ));
            }
            if file.kind != FileKind::Csv {
                return Err(StandardsError::invalid_entry(
                    &file.path,
                    format!("{} tables are read as csv", file.role),
                ));
            }
            let relative = relative_table_path(&file.path)?;
            if by_role
                .insert(file.role, standards_dir.join(&relative))
                .is_some()
            {
                return Err(StandardsError::DuplicateRole { role: file.role });
            }
            listed.insert(relative);
        }
        if let Some(role) = TableRole::ALL
            .into_iter()
            .find(|role| !by_role.contains_key(role))
        {
            return Err(StandardsError::MissingRole { role });
        }
        Ok(Self { by_role, listed })
    }

    fn path(&self, role: TableRole) -> Result<&Path, StandardsError> {
        self.by_role
            .get(&role)
            .map(PathBuf::as_path)
            .ok_or(StandardsError::MissingRole { role })
    }

    fn reject_unlisted(&self, standards_dir: &Path) -> Result<(), StandardsError> {
        let mut present = BTreeSet::new();
        collect_files(standards_dir, Path::new(""), &mut present)?;
        present.remove(Path::new(MANIFEST_FILE));
        match present.difference(&self.listed).next() {
            Some(extra) => Err(StandardsError::UnexpectedFile {
                path: standards_dir.join(extra),
            }),
            None => Ok(()),
        }
    }
}

fn verify_checksum(standards_dir: &Path, file: &ManifestFile) -> Result<(), StandardsError> {
    let path = standards_dir.join(&file.path);
    let actual = sha256_file(&path)?;
    if !actual.eq_ignore_ascii_case(&file.sha256) {
        return Err(StandardsError::Sha256Mismatch {
            path,
            expected: file.sha256.to_ascii_lowercase(),
            actual,
        });
    }
    debug!(path = %file.path, role = %file.role, "checksum ok");
    Ok(())
}

fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Normalizes a manifest path, refusing anything that could leave the
/// standards directory.
fn relative_table_path(raw: &str) -> Result<PathBuf, StandardsError> {
    if raw.contains('\\') {
        return Err(StandardsError::invalid_entry(raw, "use '/' as the separator"));
    }
    let mut clean = PathBuf::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(StandardsError::invalid_entry(
                    raw,
                    "path escapes the standards directory",
                ));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(StandardsError::invalid_entry(raw, "path must be relative"));
            }
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(StandardsError::invalid_entry(raw, "path is empty"));
    }
    Ok(clean)
}

/// Adds every regular file below `root/relative` to `out`, keyed by its path
/// relative to `root`.
fn collect_files(
    root: &Path,
    relative: &Path,
    out: &mut BTreeSet<PathBuf>,
) -> Result<(), StandardsError> {
    let dir = root.join(relative);
    let entries = std::fs::read_dir(&dir).map_err(|e| StandardsError::io(&dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| StandardsError::io(&dir, e))?;
        let child = relative.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| StandardsError::io(entry.path(), e))?;
        if file_type.is_dir() {
            collect_files(root, &child, out)?;
        } else if file_type.is_file() {
            out.insert(child);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_paths_stay_inside_the_standards_directory() {
        assert!(relative_table_path("../secrets.csv").is_err());
        assert!(relative_table_path("/etc/passwd").is_err());
        assert!(relative_table_path("iso3166\\countries.csv").is_err());
        assert!(relative_table_path("./").is_err());
        assert_eq!(
            relative_table_path("./entities/./excluded_entities.csv").unwrap(),
            PathBuf::from("entities/excluded_entities.csv")
        );
    }

    #[test]
    fn checksums_must_be_full_length_hex() {
        assert!(!is_sha256_hex("abc"));
        assert!(!is_sha256_hex(&"g".repeat(64)));
        assert!(is_sha256_hex(&"A1".repeat(32)));
    }

    #[test]
    fn unlisted_files_are_found_in_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("a/b/extra.csv"), "x\n").unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "").unwrap();

        let tables = TablePaths {
            by_role: BTreeMap::new(),
            listed: BTreeSet::new(),
        };
        let err = tables.reject_unlisted(dir.path()).unwrap_err();
        assert!(
            matches!(err, StandardsError::UnexpectedFile { ref path } if path.ends_with("a/b/extra.csv"))
        );
    }
}
