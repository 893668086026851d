use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw input files consumed by the cleaners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Incidence,
    Mortality,
    Prevalence,
    Diabetes,
    Alcohol,
    Overweight,
    WorldHealth,
    LifeExpectancy,
    Activity,
    Obesity,
    Gdp,
}

impl SourceId {
    pub const ALL: [SourceId; 11] = [
        SourceId::Incidence,
        SourceId::Mortality,
        SourceId::Prevalence,
        SourceId::Diabetes,
        SourceId::Alcohol,
        SourceId::Overweight,
        SourceId::WorldHealth,
        SourceId::LifeExpectancy,
        SourceId::Activity,
        SourceId::Obesity,
        SourceId::Gdp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Incidence => "incidence",
            SourceId::Mortality => "mortality",
            SourceId::Prevalence => "prevalence",
            SourceId::Diabetes => "diabetes",
            SourceId::Alcohol => "alcohol",
            SourceId::Overweight => "overweight",
            SourceId::WorldHealth => "world_health",
            SourceId::LifeExpectancy => "life_expectancy",
            SourceId::Activity => "activity",
            SourceId::Obesity => "obesity",
            SourceId::Gdp => "gdp",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
