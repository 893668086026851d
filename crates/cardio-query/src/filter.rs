//! Filters, grouping dimensions and the cache key they form.

use std::fmt;
use std::str::FromStr;

use cardio_model::{AGE_GROUP, COUNTRY, COUNTRY_CODE, GENDER, Gender, Metric, REGION, Region, YEAR};
use polars::prelude::{Expr, col, lit};
use serde::{Deserialize, Serialize};

/// A column the table can be filtered or grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Year,
    Country,
    CountryCode,
    Region,
    AgeGroup,
    Gender,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Year,
        Dimension::Country,
        Dimension::CountryCode,
        Dimension::Region,
        Dimension::AgeGroup,
        Dimension::Gender,
    ];

    pub const fn column(self) -> &'static str {
        match self {
            Dimension::Year => YEAR,
            Dimension::Country => COUNTRY,
            Dimension::CountryCode => COUNTRY_CODE,
            Dimension::Region => REGION,
            Dimension::AgeGroup => AGE_GROUP,
            Dimension::Gender => GENDER,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Dimension {
    type Err = String;

    /// Accepts the column name in any case, with underscores, hyphens or
    /// neither (`country_code`, `country-code`, `CountryCode`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.trim().chars().filter(|c| !matches!(c, '_' | '-')).collect();
        Dimension::ALL
            .into_iter()
            .find(|dim| dim.column().replace('_', "").eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("Unknown dimension: {s}"))
    }
}

/// Row filter over the analytic table. Empty lists match everything.
///
/// Lists are kept sorted and deduplicated so that two filters selecting the
/// same rows compare equal as cache keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Inclusive `(first, last)` year range.
    pub years: Option<(i64, i64)>,
    /// Matches either the display name or the alpha-3 code.
    pub countries: Vec<String>,
    pub regions: Vec<Region>,
    pub age_groups: Vec<String>,
    pub genders: Vec<Gender>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn year(self, year: i64) -> Self {
        self.years(year, year)
    }

    pub fn years(mut self, first: i64, last: i64) -> Self {
        self.years = Some((first.min(last), first.max(last)));
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        insert_sorted(&mut self.countries, country.into().trim().to_string());
        self
    }

    pub fn region(mut self, region: Region) -> Self {
        insert_sorted(&mut self.regions, region);
        self
    }

    pub fn age_group(mut self, age_group: impl Into<String>) -> Self {
        insert_sorted(&mut self.age_groups, age_group.into().trim().to_string());
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        insert_sorted(&mut self.genders, gender);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_none()
            && self.countries.is_empty()
            && self.regions.is_empty()
            && self.age_groups.is_empty()
            && self.genders.is_empty()
    }

    /// The predicate as a polars expression; `None` when nothing is filtered.
    pub(crate) fn predicate(&self) -> Option<Expr> {
        let mut parts = Vec::new();
        if let Some((first, last)) = self.years {
            parts.push(col(YEAR).gt_eq(lit(first)).and(col(YEAR).lt_eq(lit(last))));
        }
        if !self.countries.is_empty() {
            let names = any_equal(COUNTRY, self.countries.iter().map(String::as_str));
            let codes = any_equal(
                COUNTRY_CODE,
                self.countries.iter().map(String::as_str),
            );
            parts.extend(names.zip(codes).map(|(n, c)| n.or(c)));
        }
        parts.extend(any_equal(REGION, self.regions.iter().map(Region::as_str)));
        parts.extend(any_equal(AGE_GROUP, self.age_groups.iter().map(String::as_str)));
        parts.extend(any_equal(GENDER, self.genders.iter().map(Gender::as_str)));
        parts.into_iter().reduce(Expr::and)
    }
}

fn insert_sorted<T: Ord>(values: &mut Vec<T>, value: T) {
    if let Err(idx) = values.binary_search(&value) {
        values.insert(idx, value);
    }
}

fn any_equal<'a>(column: &str, values: impl Iterator<Item = &'a str>) -> Option<Expr> {
    values.map(|v| col(column).eq(lit(v))).reduce(Expr::or)
}

/// A grouped-mean request. Every parameter is part of the key, so equal
/// keys always produce equal results over the same table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey {
    pub filter: QueryFilter,
    pub group_by: Vec<Dimension>,
    pub metrics: Vec<Metric>,
}

impl QueryKey {
    /// Duplicate dimensions and metrics are dropped; first occurrence wins.
    pub fn new(filter: QueryFilter, group_by: &[Dimension], metrics: &[Metric]) -> Self {
        let mut dims = Vec::with_capacity(group_by.len());
        for dim in group_by {
            if !dims.contains(dim) {
                dims.push(*dim);
            }
        }
        let mut wanted = Vec::with_capacity(metrics.len());
        for metric in metrics {
            if !wanted.contains(metric) {
                wanted.push(*metric);
            }
        }
        Self {
            filter,
            group_by: dims,
            metrics: wanted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_selections_build_equal_keys() {
        let a = QueryFilter::new()
            .country("Chile")
            .country("Peru")
            .gender(Gender::Female)
            .years(2010, 2000);
        let b = QueryFilter::new()
            .country(" Peru ")
            .years(2000, 2010)
            .gender(Gender::Female)
            .country("Chile")
            .country("Chile");
        assert_eq!(a, b);
        assert_eq!(
            QueryKey::new(a, &[Dimension::Region, Dimension::Region], &[Metric::Gdp]),
            QueryKey::new(b, &[Dimension::Region], &[Metric::Gdp, Metric::Gdp]),
        );
    }

    #[test]
    fn dimensions_parse_from_column_names() {
        assert_eq!("Country_Code".parse::<Dimension>(), Ok(Dimension::CountryCode));
        assert_eq!("agegroup".parse::<Dimension>(), Ok(Dimension::AgeGroup));
        assert_eq!("region".parse::<Dimension>(), Ok(Dimension::Region));
        assert_eq!("age-group".parse::<Dimension>(), Ok(Dimension::AgeGroup));
        assert!("continent".parse::<Dimension>().is_err());
    }

    #[test]
    fn empty_filter_has_no_predicate() {
        assert!(QueryFilter::new().is_empty());
        assert!(QueryFilter::new().predicate().is_none());
        assert!(QueryFilter::new().year(2000).predicate().is_some());
    }
}
