use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The ten numeric observations carried by every analytic row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "MortalityRate")]
    MortalityRate,
    #[serde(rename = "IncidenceRate")]
    IncidenceRate,
    #[serde(rename = "PrevalenceRate")]
    PrevalenceRate,
    #[serde(rename = "Alcohol_Value")]
    AlcoholValue,
    #[serde(rename = "Diabetes_Prevalence_Rate")]
    DiabetesPrevalenceRate,
    #[serde(rename = "Activity_Prevalence_Rate")]
    ActivityPrevalenceRate,
    #[serde(rename = "Obesity_Prevalence_Rate")]
    ObesityPrevalenceRate,
    #[serde(rename = "GDP")]
    Gdp,
    #[serde(rename = "Health_Expenditure")]
    HealthExpenditure,
    #[serde(rename = "Life_Expectancy")]
    LifeExpectancy,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::MortalityRate,
        Metric::IncidenceRate,
        Metric::PrevalenceRate,
        Metric::AlcoholValue,
        Metric::DiabetesPrevalenceRate,
        Metric::ActivityPrevalenceRate,
        Metric::ObesityPrevalenceRate,
        Metric::Gdp,
        Metric::HealthExpenditure,
        Metric::LifeExpectancy,
    ];

    /// Column name in the analytic table.
    pub const fn column(self) -> &'static str {
        match self {
            Metric::MortalityRate => "MortalityRate",
            Metric::IncidenceRate => "IncidenceRate",
            Metric::PrevalenceRate => "PrevalenceRate",
            Metric::AlcoholValue => "Alcohol_Value",
            Metric::DiabetesPrevalenceRate => "Diabetes_Prevalence_Rate",
            Metric::ActivityPrevalenceRate => "Activity_Prevalence_Rate",
            Metric::ObesityPrevalenceRate => "Obesity_Prevalence_Rate",
            Metric::Gdp => "GDP",
            Metric::HealthExpenditure => "Health_Expenditure",
            Metric::LifeExpectancy => "Life_Expectancy",
        }
    }

    /// Disease rates are keyed by age group and gender as well as country-year.
    pub fn is_disease_rate(self) -> bool {
        matches!(
            self,
            Metric::MortalityRate | Metric::IncidenceRate | Metric::PrevalenceRate
        )
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = String;

    /// Accepts the column name in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Metric::ALL
            .into_iter()
            .find(|metric| metric.column().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown metric: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_column_names_case_insensitively() {
        assert_eq!("gdp".parse::<Metric>(), Ok(Metric::Gdp));
        assert_eq!(
            "alcohol_value".parse::<Metric>(),
            Ok(Metric::AlcoholValue)
        );
        assert!("BMI".parse::<Metric>().is_err());
    }

    #[test]
    fn only_gbd_metrics_are_disease_rates() {
        let rates: Vec<_> = Metric::ALL
            .into_iter()
            .filter(|m| m.is_disease_rate())
            .collect();
        assert_eq!(rates.len(), 3);
    }
}
