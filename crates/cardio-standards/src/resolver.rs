#![deny(unsafe_code)]

//! Country name → ISO 3166-1 alpha-3 resolution.
//!
//! Lookup order: manual overrides, then registry alpha-3, alpha-2, short name
//! and common name. Matching is case- and whitespace-insensitive. An
//! unresolvable name yields `None`; callers drop the row.

use std::collections::BTreeMap;

use cardio_common::{lookup_key, title_case};
use tracing::debug;

use crate::error::StandardsError;
use crate::tables::{CountryRecord, NameOverride};

#[derive(Debug, Clone, Default)]
pub struct CountryCodeResolver {
    overrides: BTreeMap<String, String>,
    by_alpha3: BTreeMap<String, CountryRecord>,
    alpha2_to_alpha3: BTreeMap<String, String>,
    by_name: BTreeMap<String, String>,
    /// Display names for override codes absent from the registry (e.g. XKX).
    extra_display: BTreeMap<String, String>,
}

impl CountryCodeResolver {
    /// Builds the resolver.
    ///
    /// Fails when two registry rows share a name, when an override name maps
    /// to two codes, or when an override shadows a registry name with a
    /// different code. These checks keep `resolve(display_name(c)) == c` for
    /// every code.
    pub fn new(
        countries: Vec<CountryRecord>,
        overrides: Vec<NameOverride>,
    ) -> Result<Self, StandardsError> {
        let mut by_name: BTreeMap<String, String> = BTreeMap::new();
        let mut alpha2_to_alpha3 = BTreeMap::new();
        let mut by_alpha3 = BTreeMap::new();
        for record in countries {
            let mut names = vec![record.name.clone()];
            names.extend(record.common_name.clone());
            for name in names {
                insert_unique(&mut by_name, lookup_key(&name), &record.alpha3, &name)?;
            }
            alpha2_to_alpha3.insert(record.alpha2.clone(), record.alpha3.clone());
            by_alpha3.insert(record.alpha3.clone(), record);
        }

        let mut override_map: BTreeMap<String, String> = BTreeMap::new();
        let mut extra_display: BTreeMap<String, String> = BTreeMap::new();
        for entry in overrides {
            let key = lookup_key(&entry.name);
            if let Some(existing) = by_name.get(&key)
                && existing != &entry.alpha3
            {
                return Err(StandardsError::AmbiguousName {
                    name: entry.name,
                    first: existing.clone(),
                    second: entry.alpha3,
                });
            }
            insert_unique(&mut override_map, key, &entry.alpha3, &entry.name)?;
            if !by_alpha3.contains_key(&entry.alpha3) {
                extra_display
                    .entry(entry.alpha3.clone())
                    .or_insert_with(|| title_case(&entry.name));
            }
        }

        Ok(Self {
            overrides: override_map,
            by_alpha3,
            alpha2_to_alpha3,
            by_name,
            extra_display,
        })
    }

    /// Resolves a free-text country name to its alpha-3 code.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        let normalized = title_case(name);
        if normalized.is_empty() {
            return None;
        }
        let key = lookup_key(&normalized);
        if let Some(code) = self.overrides.get(&key) {
            return Some(code.as_str());
        }
        let upper = normalized.to_ascii_uppercase();
        if let Some(record) = self.by_alpha3.get(&upper) {
            return Some(record.alpha3.as_str());
        }
        if let Some(code) = self.alpha2_to_alpha3.get(&upper) {
            return Some(code.as_str());
        }
        let resolved = self.by_name.get(&key).map(String::as_str);
        if resolved.is_none() {
            debug!(name = %normalized, "country name not resolved");
        }
        resolved
    }

    /// Canonical display name for a code: the registry's common name, else
    /// its short name, else the first override naming the code.
    pub fn display_name(&self, code: &str) -> Option<&str> {
        let code = code.trim().to_ascii_uppercase();
        self.by_alpha3
            .get(&code)
            .map(CountryRecord::display_name)
            .or_else(|| self.extra_display.get(&code).map(String::as_str))
    }

    pub fn alpha3_to_alpha2(&self, code: &str) -> Option<&str> {
        self.by_alpha3
            .get(&code.trim().to_ascii_uppercase())
            .map(|record| record.alpha2.as_str())
    }

    /// Continent code recorded for an alpha-2 code.
    pub fn continent_of_alpha2(&self, alpha2: &str) -> Option<&str> {
        let alpha3 = self.alpha2_to_alpha3.get(&alpha2.trim().to_ascii_uppercase())?;
        self.by_alpha3.get(alpha3)?.continent.as_deref()
    }

    /// True for codes in the ISO registry (override-only codes excluded).
    pub fn is_registry_code(&self, code: &str) -> bool {
        self.by_alpha3.contains_key(&code.trim().to_ascii_uppercase())
    }

    pub fn country_count(&self) -> usize {
        self.by_alpha3.len()
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.by_alpha3
            .keys()
            .chain(self.extra_display.keys())
            .map(String::as_str)
    }
}

fn insert_unique(
    map: &mut BTreeMap<String, String>,
    key: String,
    code: &str,
    name: &str,
) -> Result<(), StandardsError> {
    match map.get(&key) {
        Some(existing) if existing != code => Err(StandardsError::AmbiguousName {
            name: name.to_string(),
            first: existing.clone(),
            second: code.to_string(),
        }),
        Some(_) => Ok(()),
        None => {
            map.insert(key, code.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(alpha2: &str, alpha3: &str, name: &str, common: Option<&str>) -> CountryRecord {
        CountryRecord {
            alpha2: alpha2.to_string(),
            alpha3: alpha3.to_string(),
            name: name.to_string(),
            common_name: common.map(str::to_string),
            continent: Some("AS".to_string()),
        }
    }

    fn name_override(name: &str, alpha3: &str) -> NameOverride {
        NameOverride {
            name: name.to_string(),
            alpha3: alpha3.to_string(),
            notes: None,
        }
    }

    fn resolver() -> CountryCodeResolver {
        CountryCodeResolver::new(
            vec![
                record("KR", "KOR", "Korea, Republic of", Some("South Korea")),
                record("US", "USA", "United States", None),
            ],
            vec![
                name_override("Korea, Rep.", "KOR"),
                name_override("Kosovo", "XKX"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn overrides_take_precedence() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("korea, rep."), Some("KOR"));
        assert_eq!(resolver.resolve("  KOSOVO "), Some("XKX"));
    }

    #[test]
    fn registry_matches_names_and_codes() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("united   states"), Some("USA"));
        assert_eq!(resolver.resolve("South Korea"), Some("KOR"));
        assert_eq!(resolver.resolve("usa"), Some("USA"));
        assert_eq!(resolver.resolve("kr"), Some("KOR"));
    }

    #[test]
    fn unknown_and_blank_names_yield_none() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("Atlantis"), None);
        assert_eq!(resolver.resolve("   "), None);
    }

    #[test]
    fn display_names_cover_override_only_codes() {
        let resolver = resolver();
        assert_eq!(resolver.display_name("kor"), Some("South Korea"));
        assert_eq!(resolver.display_name("XKX"), Some("Kosovo"));
        assert_eq!(resolver.display_name("ZZZ"), None);
    }

    #[test]
    fn override_shadowing_a_registry_name_is_rejected() {
        let err = CountryCodeResolver::new(
            vec![record("US", "USA", "United States", None)],
            vec![name_override("united states", "GBR")],
        )
        .unwrap_err();
        assert!(matches!(err, StandardsError::AmbiguousName { .. }));
    }
}
