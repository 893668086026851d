#![deny(unsafe_code)]

use std::collections::BTreeMap;

use cardio_model::Region;

use crate::resolver::CountryCodeResolver;
use crate::tables::RegionOverride;

/// Maps country codes to continents.
///
/// Pure and total: every input, including empty or malformed codes, maps to
/// a [`Region`], with [`Region::Unknown`] as the fallback.
#[derive(Debug, Clone)]
pub struct RegionClassifier {
    overrides: BTreeMap<String, Region>,
    resolver: CountryCodeResolver,
}

impl RegionClassifier {
    pub fn new(overrides: Vec<RegionOverride>, resolver: CountryCodeResolver) -> Self {
        Self {
            overrides: overrides
                .into_iter()
                .map(|entry| (entry.code, entry.region))
                .collect(),
            resolver,
        }
    }

    pub fn region_of(&self, code: &str) -> Region {
        let code = code.trim().to_ascii_uppercase();
        if let Some(region) = self.overrides.get(&code) {
            return *region;
        }
        let alpha2 = match code.len() {
            3 => self.resolver.alpha3_to_alpha2(&code),
            2 => Some(code.as_str()),
            _ => None,
        };
        alpha2
            .and_then(|alpha2| self.resolver.continent_of_alpha2(alpha2))
            .map_or(Region::Unknown, Region::from_continent_code)
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}
