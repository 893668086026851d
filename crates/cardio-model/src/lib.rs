pub mod enums;
pub mod metric;
pub mod schema;
pub mod source;

pub use enums::{Gender, Region};
pub use metric::Metric;
pub use schema::{
    AGE_GROUP, ANALYTIC_COLUMNS, COUNTRY, COUNTRY_CODE, GENDER, IDENTIFIER_COLUMNS, REGION, YEAR,
    is_identifier,
};
pub use source::SourceId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analytic_columns_start_with_identifiers() {
        assert_eq!(&ANALYTIC_COLUMNS[..5], &IDENTIFIER_COLUMNS_WITH_YEAR);
        assert_eq!(ANALYTIC_COLUMNS.len(), 5 + Metric::ALL.len());
    }

    const IDENTIFIER_COLUMNS_WITH_YEAR: [&str; 5] = [COUNTRY, COUNTRY_CODE, YEAR, GENDER, AGE_GROUP];

    #[test]
    fn metric_serializes_as_column_name() {
        let json = serde_json::to_string(&Metric::Gdp).unwrap();
        assert_eq!(json, "\"GDP\"");
        let round: Metric = serde_json::from_str("\"Life_Expectancy\"").unwrap();
        assert_eq!(round, Metric::LifeExpectancy);
    }
}
