use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sex stratum of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Both,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Both => "Both",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    /// Accepts the labels used by the raw sources: `Male`/`Female`/`Both`,
    /// `Men`/`Women`, and the numeric codes `0`/`1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MALE" | "MEN" | "M" | "0" => Ok(Gender::Male),
            "FEMALE" | "WOMEN" | "F" | "1" => Ok(Gender::Female),
            "BOTH" | "BOTH SEXES" | "SEX_BTSX" => Ok(Gender::Both),
            _ => Err(format!("Unknown gender: {s}")),
        }
    }
}

/// Continent-level grouping derived from a country code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    Africa,
    Asia,
    Europe,
    #[serde(rename = "North America")]
    NorthAmerica,
    #[serde(rename = "South America")]
    SouthAmerica,
    Oceania,
    /// Sentinel for codes without a continent, so grouped aggregations keep
    /// every row.
    #[serde(rename = "Unknown Region")]
    Unknown,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::Africa,
        Region::Asia,
        Region::Europe,
        Region::NorthAmerica,
        Region::SouthAmerica,
        Region::Oceania,
        Region::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Africa => "Africa",
            Region::Asia => "Asia",
            Region::Europe => "Europe",
            Region::NorthAmerica => "North America",
            Region::SouthAmerica => "South America",
            Region::Oceania => "Oceania",
            Region::Unknown => "Unknown Region",
        }
    }

    /// Maps a two-letter continent code (`AF`, `AS`, `EU`, `NA`, `SA`, `OC`).
    /// Anything else, Antarctica included, is `Unknown`.
    pub fn from_continent_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "AF" => Region::Africa,
            "AS" => Region::Asia,
            "EU" => Region::Europe,
            "NA" => Region::NorthAmerica,
            "SA" => Region::SouthAmerica,
            "OC" => Region::Oceania,
            _ => Region::Unknown,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Region::ALL
            .into_iter()
            .find(|region| region.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown region: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_accepts_source_labels() {
        assert_eq!("Men".parse::<Gender>(), Ok(Gender::Male));
        assert_eq!("women".parse::<Gender>(), Ok(Gender::Female));
        assert_eq!("1".parse::<Gender>(), Ok(Gender::Female));
        assert_eq!("Both".parse::<Gender>(), Ok(Gender::Both));
        assert!("x".parse::<Gender>().is_err());
    }

    #[test]
    fn continent_codes_map_to_regions() {
        assert_eq!(Region::from_continent_code("na"), Region::NorthAmerica);
        assert_eq!(Region::from_continent_code("AN"), Region::Unknown);
        assert_eq!(Region::from_continent_code(""), Region::Unknown);
    }

    #[test]
    fn region_round_trips_through_display() {
        for region in Region::ALL {
            assert_eq!(region.to_string().parse::<Region>(), Ok(region));
        }
    }
}
