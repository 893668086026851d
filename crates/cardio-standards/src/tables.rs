#![deny(unsafe_code)]

//! Parsers for the CSV tables listed in the standards manifest.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use cardio_common::{lookup_key, normalize_whitespace};
use cardio_model::Region;
use csv::StringRecord;
use serde::Serialize;

use crate::error::StandardsError;

/// One row of the ISO 3166-1 registry.
#[derive(Debug, Clone, Serialize)]
pub struct CountryRecord {
    pub alpha2: String,
    pub alpha3: String,
    pub name: String,
    pub common_name: Option<String>,
    /// Two-letter continent code; blank for codes with no continent.
    pub continent: Option<String>,
}

impl CountryRecord {
    /// Short name used for display: the common name when the registry has one.
    pub fn display_name(&self) -> &str {
        self.common_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NameOverride {
    pub name: String,
    pub alpha3: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionOverride {
    pub code: String,
    pub region: Region,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionScope {
    /// Regions, income groups and the world total. Dropped from every source.
    Aggregate,
    /// Territories the world health source reports without usable coverage.
    WorldHealth,
}

impl ExclusionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionScope::Aggregate => "aggregate",
            ExclusionScope::WorldHealth => "world_health",
        }
    }
}

impl fmt::Display for ExclusionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExclusionScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aggregate" => Ok(ExclusionScope::Aggregate),
            "world_health" => Ok(ExclusionScope::WorldHealth),
            _ => Err(format!("Unknown exclusion scope: {s}")),
        }
    }
}

/// Entity names that are not countries, matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    entries: BTreeMap<String, BTreeSet<ExclusionScope>>,
}

impl ExclusionList {
    pub fn new(entities: impl IntoIterator<Item = (String, ExclusionScope)>) -> Self {
        let mut entries: BTreeMap<String, BTreeSet<ExclusionScope>> = BTreeMap::new();
        for (name, scope) in entities {
            entries.entry(lookup_key(&name)).or_default().insert(scope);
        }
        Self { entries }
    }

    pub fn is_excluded(&self, name: &str, scope: ExclusionScope) -> bool {
        self.entries
            .get(&lookup_key(name))
            .is_some_and(|scopes| scopes.contains(&scope))
    }

    pub fn count(&self, scope: ExclusionScope) -> usize {
        self.entries
            .values()
            .filter(|scopes| scopes.contains(&scope))
            .count()
    }
}

/// Country location → regional aggregate location whose values fill the
/// country's gaps.
#[derive(Debug, Clone, Default)]
pub struct RegionalFallbacks {
    by_location: BTreeMap<String, String>,
}

impl RegionalFallbacks {
    pub fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            by_location: pairs
                .into_iter()
                .map(|(location, region)| (normalize_whitespace(&location), region))
                .collect(),
        }
    }

    pub fn region_for(&self, location: &str) -> Option<&str> {
        self.by_location
            .get(&normalize_whitespace(location))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_location
            .iter()
            .map(|(location, region)| (location.as_str(), region.as_str()))
    }

    pub fn len(&self) -> usize {
        self.by_location.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_location.is_empty()
    }
}

struct Table {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl Table {
    fn read(path: &Path) -> Result<Self, StandardsError> {
        let bytes = std::fs::read(path).map_err(|e| StandardsError::io(path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes.as_slice());
        let headers = reader
            .headers()
            .map_err(|e| StandardsError::csv(path, e.to_string()))?
            .iter()
            .map(|h| h.trim().trim_matches('\u{feff}'))
            .collect();
        let mut rows = Vec::new();
        for row in reader.records() {
            rows.push(row.map_err(|e| StandardsError::csv(path, e.to_string()))?);
        }
        Ok(Self { headers, rows })
    }

    fn get(&self, row: &StringRecord, name: &str) -> Option<String> {
        self.headers
            .iter()
            .position(|h| h == name)
            .and_then(|i| row.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn require(
        &self,
        path: &Path,
        line: usize,
        row: &StringRecord,
        name: &str,
    ) -> Result<String, StandardsError> {
        self.get(row, name)
            .ok_or_else(|| StandardsError::csv(path, format!("row {line}: missing {name}")))
    }
}

pub fn parse_countries_csv(path: &Path) -> Result<Vec<CountryRecord>, StandardsError> {
    let table = Table::read(path)?;
    let mut results = Vec::with_capacity(table.rows.len());
    for (idx, row) in table.rows.iter().enumerate() {
        let line = idx + 2;
        let alpha2 = table.require(path, line, row, "alpha2")?.to_ascii_uppercase();
        let alpha3 = table.require(path, line, row, "alpha3")?.to_ascii_uppercase();
        if alpha2.len() != 2 || alpha3.len() != 3 {
            return Err(StandardsError::csv(
                path,
                format!("row {line}: malformed codes {alpha2}/{alpha3}"),
            ));
        }
        results.push(CountryRecord {
            alpha2,
            alpha3,
            name: table.require(path, line, row, "name")?,
            common_name: table.get(row, "common_name"),
            continent: table.get(row, "continent").map(|c| c.to_ascii_uppercase()),
        });
    }
    results.sort_by(|a, b| a.alpha3.cmp(&b.alpha3));
    Ok(results)
}

pub fn parse_name_overrides_csv(path: &Path) -> Result<Vec<NameOverride>, StandardsError> {
    let table = Table::read(path)?;
    table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            Ok(NameOverride {
                name: table.require(path, idx + 2, row, "name")?,
                alpha3: table
                    .require(path, idx + 2, row, "alpha3")?
                    .to_ascii_uppercase(),
                notes: table.get(row, "notes"),
            })
        })
        .collect()
}

pub fn parse_region_overrides_csv(path: &Path) -> Result<Vec<RegionOverride>, StandardsError> {
    let table = Table::read(path)?;
    table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let line = idx + 2;
            let region_text = table.require(path, line, row, "region")?;
            let region = region_text
                .parse::<Region>()
                .map_err(|message| StandardsError::csv(path, format!("row {line}: {message}")))?;
            Ok(RegionOverride {
                code: table.require(path, line, row, "code")?.to_ascii_uppercase(),
                region,
            })
        })
        .collect()
}

pub fn parse_excluded_entities_csv(path: &Path) -> Result<ExclusionList, StandardsError> {
    let table = Table::read(path)?;
    let mut entities = Vec::with_capacity(table.rows.len());
    for (idx, row) in table.rows.iter().enumerate() {
        let line = idx + 2;
        let scope = table
            .require(path, line, row, "scope")?
            .parse::<ExclusionScope>()
            .map_err(|message| StandardsError::csv(path, format!("row {line}: {message}")))?;
        entities.push((table.require(path, line, row, "name")?, scope));
    }
    Ok(ExclusionList::new(entities))
}

pub fn parse_regional_fallbacks_csv(path: &Path) -> Result<RegionalFallbacks, StandardsError> {
    let table = Table::read(path)?;
    let mut pairs = Vec::with_capacity(table.rows.len());
    for (idx, row) in table.rows.iter().enumerate() {
        let line = idx + 2;
        pairs.push((
            table.require(path, line, row, "location")?,
            table.require(path, line, row, "region_location")?,
        ));
    }
    Ok(RegionalFallbacks::new(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn countries_keep_blank_continents_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "countries.csv",
            "alpha2,alpha3,name,common_name,continent\n\
             tl,tls,Timor-Leste,,\n\
             BO,BOL,\"Bolivia, Plurinational State of\",Bolivia,sa\n",
        );
        let rows = parse_countries_csv(&path).unwrap();
        assert_eq!(rows[0].alpha3, "BOL");
        assert_eq!(rows[0].display_name(), "Bolivia");
        assert_eq!(rows[0].continent.as_deref(), Some("SA"));
        assert_eq!(rows[1].alpha2, "TL");
        assert_eq!(rows[1].continent, None);
    }

    #[test]
    fn malformed_code_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "countries.csv",
            "alpha2,alpha3,name,common_name,continent\nUSA,US,United States,,NA\n",
        );
        let err = parse_countries_csv(&path).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn unknown_region_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "regions.csv", "code,region\nXKX,Atlantis\n");
        assert!(parse_region_overrides_csv(&path).is_err());
    }

    #[test]
    fn exclusions_are_scoped_and_case_insensitive() {
        let list = ExclusionList::new([
            ("World".to_string(), ExclusionScope::Aggregate),
            ("Somalia".to_string(), ExclusionScope::WorldHealth),
        ]);
        assert!(list.is_excluded(" world ", ExclusionScope::Aggregate));
        assert!(!list.is_excluded("World", ExclusionScope::WorldHealth));
        assert!(list.is_excluded("SOMALIA", ExclusionScope::WorldHealth));
        assert!(!list.is_excluded("Somalia", ExclusionScope::Aggregate));
        assert_eq!(list.count(ExclusionScope::Aggregate), 1);
    }

    #[test]
    fn fallbacks_match_on_normalized_location() {
        let fallbacks = RegionalFallbacks::new([("South  Sudan".to_string(), "Africa".to_string())]);
        assert_eq!(fallbacks.region_for("South Sudan"), Some("Africa"));
        assert_eq!(fallbacks.region_for("Sudan"), None);
    }
}
