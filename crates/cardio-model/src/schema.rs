//! Column names of the analytic table and the intermediate frames.

use crate::metric::Metric;

pub const COUNTRY: &str = "Country";
pub const COUNTRY_CODE: &str = "Country_Code";
pub const YEAR: &str = "Year";
pub const GENDER: &str = "Gender";
pub const AGE_GROUP: &str = "Age_Group";

/// Derived at load time by the query layer; only persisted on request.
pub const REGION: &str = "Region";

/// Columns that identify a row and never act as imputation features.
pub const IDENTIFIER_COLUMNS: [&str; 4] = [COUNTRY, COUNTRY_CODE, AGE_GROUP, GENDER];

/// Stable column order of the persisted snapshot.
pub const ANALYTIC_COLUMNS: [&str; 15] = [
    COUNTRY,
    COUNTRY_CODE,
    YEAR,
    GENDER,
    AGE_GROUP,
    Metric::MortalityRate.column(),
    Metric::IncidenceRate.column(),
    Metric::PrevalenceRate.column(),
    Metric::AlcoholValue.column(),
    Metric::DiabetesPrevalenceRate.column(),
    Metric::ActivityPrevalenceRate.column(),
    Metric::ObesityPrevalenceRate.column(),
    Metric::Gdp.column(),
    Metric::HealthExpenditure.column(),
    Metric::LifeExpectancy.column(),
];

/// Returns true for the columns that identify a row.
pub fn is_identifier(column: &str) -> bool {
    IDENTIFIER_COLUMNS.contains(&column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_is_not_an_identifier() {
        assert!(is_identifier(COUNTRY_CODE));
        assert!(!is_identifier(YEAR));
    }
}
