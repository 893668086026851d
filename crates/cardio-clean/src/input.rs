use std::path::{Path, PathBuf};

use cardio_ingest::{ReadOptions, read_table};
use cardio_model::SourceId;
use polars::prelude::DataFrame;

use crate::error::Result;
use crate::gho;

/// A raw file and how to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInput {
    pub id: SourceId,
    pub path: PathBuf,
    pub options: ReadOptions,
}

impl SourceInput {
    pub fn new(id: SourceId, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
            options: ReadOptions::default(),
        }
    }

    /// `id`'s conventional file under `data_dir`, read with its default
    /// header row.
    pub fn default_in(id: SourceId, data_dir: &Path) -> Self {
        Self::new(id, data_dir.join(default_file_name(id))).with_header_row(default_header_row(id))
    }

    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.options.header_row = header_row;
        self
    }

    pub fn load(&self) -> Result<DataFrame> {
        Ok(read_table(&self.path, &self.options)?)
    }
}

/// File name each source is published under.
pub fn default_file_name(id: SourceId) -> &'static str {
    match id {
        SourceId::Incidence => "GBD_INCIDENCE.csv",
        SourceId::Mortality => "GBD_MORTALITY-DEATHS.csv",
        SourceId::Prevalence => "GBD_PREVALENCE.csv",
        SourceId::Diabetes => "diabetes_data.csv",
        SourceId::Alcohol => "alcohol_consumption.xlsx",
        SourceId::Overweight => "overweight.xlsx",
        SourceId::WorldHealth => "world_health_data.csv",
        SourceId::LifeExpectancy => "life_expectancy.csv",
        SourceId::Activity => "insufficient_physical_activity_data.xlsx",
        SourceId::Obesity => "obesity_data.xlsx",
        SourceId::Gdp => "gdp-per-capita-worldbank.csv",
    }
}

/// GHO sheet exports put their header below two banner rows.
pub fn default_header_row(id: SourceId) -> usize {
    match id {
        SourceId::Overweight | SourceId::Activity | SourceId::Obesity => gho::HEADER_ROW,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_place_each_source_under_the_data_dir() {
        let input = SourceInput::default_in(SourceId::Obesity, Path::new("data"));
        assert_eq!(input.path, PathBuf::from("data/obesity_data.xlsx"));
        assert_eq!(input.options.header_row, gho::HEADER_ROW);

        let gdp = SourceInput::default_in(SourceId::Gdp, Path::new("data"));
        assert_eq!(gdp.options.header_row, 0);
    }
}
