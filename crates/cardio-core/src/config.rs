//! Pipeline configuration.
//!
//! Every field has a default matching the conventional project layout, so
//! an empty TOML file is a valid configuration:
//!
//! ```toml
//! data_dir = "data"
//! output = "datasets/cleaned_final_data.csv"
//!
//! [sources.overweight]
//! path = "overweight.xlsx"
//! header_row = 2
//!
//! [imputation]
//! GDP = { strategy = "knn", k = 5 }
//! Life_Expectancy = { strategy = "fill_interpolate", group_by = ["Country_Code"] }
//! ```

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use cardio_clean::SourceInput;
use cardio_clean::input::{default_file_name, default_header_row};
use cardio_impute::ImputeStrategy;
use cardio_ingest::ReadOptions;
use cardio_model::{Metric, SourceId};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// One raw file, relative to `data_dir` unless absolute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSpec {
    pub path: PathBuf,
    /// Zero-based row holding the column names.
    pub header_row: usize,
    pub sheet: Option<String>,
}

impl SourceSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    /// The file name and header row the cleaners expect for `id`.
    pub fn default_for(id: SourceId) -> Self {
        Self::new(default_file_name(id)).with_header_row(default_header_row(id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub incidence: SourceSpec,
    pub mortality: SourceSpec,
    pub prevalence: SourceSpec,
    pub diabetes: SourceSpec,
    pub alcohol: SourceSpec,
    pub overweight: SourceSpec,
    pub world_health: SourceSpec,
    pub life_expectancy: SourceSpec,
    pub activity: SourceSpec,
    pub obesity: SourceSpec,
    pub gdp: SourceSpec,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            incidence: SourceSpec::default_for(SourceId::Incidence),
            mortality: SourceSpec::default_for(SourceId::Mortality),
            prevalence: SourceSpec::default_for(SourceId::Prevalence),
            diabetes: SourceSpec::default_for(SourceId::Diabetes),
            alcohol: SourceSpec::default_for(SourceId::Alcohol),
            overweight: SourceSpec::default_for(SourceId::Overweight),
            world_health: SourceSpec::default_for(SourceId::WorldHealth),
            life_expectancy: SourceSpec::default_for(SourceId::LifeExpectancy),
            activity: SourceSpec::default_for(SourceId::Activity),
            obesity: SourceSpec::default_for(SourceId::Obesity),
            gdp: SourceSpec::default_for(SourceId::Gdp),
        }
    }
}

impl SourcesConfig {
    pub fn get(&self, id: SourceId) -> &SourceSpec {
        match id {
            SourceId::Incidence => &self.incidence,
            SourceId::Mortality => &self.mortality,
            SourceId::Prevalence => &self.prevalence,
            SourceId::Diabetes => &self.diabetes,
            SourceId::Alcohol => &self.alcohol,
            SourceId::Overweight => &self.overweight,
            SourceId::WorldHealth => &self.world_health,
            SourceId::LifeExpectancy => &self.life_expectancy,
            SourceId::Activity => &self.activity,
            SourceId::Obesity => &self.obesity,
            SourceId::Gdp => &self.gdp,
        }
    }
}

/// Inclusive year span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub first: i64,
    pub last: i64,
}

impl YearRange {
    pub fn to_range(self) -> RangeInclusive<i64> {
        self.first..=self.last
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub sources: SourcesConfig,
    /// Analytic snapshot path.
    pub output: PathBuf,
    /// Write a JSON run report next to the snapshot.
    pub write_run_report: bool,
    /// Persist the derived `Region` column as well.
    pub include_region: bool,
    /// Years synthesized for the diabetes series.
    pub placeholder_years: YearRange,
    /// Strategy per metric for the post-merge imputation.
    pub imputation: BTreeMap<Metric, ImputeStrategy>,
    /// Columns removed before projection when present.
    pub obsolete_columns: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            sources: SourcesConfig::default(),
            output: PathBuf::from("datasets/cleaned_final_data.csv"),
            write_run_report: true,
            include_region: false,
            placeholder_years: YearRange {
                first: 1960,
                last: 1989,
            },
            imputation: Metric::ALL
                .into_iter()
                .map(|metric| (metric, ImputeStrategy::default()))
                .collect(),
            obsolete_columns: vec!["BMI".to_string()],
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Parses and validates; `path` is only used in errors.
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|source| PipelineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.placeholder_years.first > self.placeholder_years.last {
            return Err(PipelineError::InvalidConfig {
                message: format!(
                    "placeholder_years.first ({}) is after placeholder_years.last ({})",
                    self.placeholder_years.first, self.placeholder_years.last
                ),
            });
        }
        if self.output.file_name().is_none() {
            return Err(PipelineError::InvalidConfig {
                message: format!("output {} has no file name", self.output.display()),
            });
        }
        for id in SourceId::ALL {
            if self.sources.get(id).path.as_os_str().is_empty() {
                return Err(PipelineError::InvalidConfig {
                    message: format!("sources.{id} has no path"),
                });
            }
        }
        Ok(())
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn source_path(&self, id: SourceId) -> PathBuf {
        self.data_dir.join(&self.sources.get(id).path)
    }

    pub fn source_input(&self, id: SourceId) -> SourceInput {
        let source = self.sources.get(id);
        SourceInput {
            id,
            path: self.source_path(id),
            options: ReadOptions {
                header_row: source.header_row,
                sheet: source.sheet.clone(),
            },
        }
    }

    /// `cleaned_final_data.csv` reports to `cleaned_final_data.report.json`.
    pub fn report_path(&self) -> PathBuf {
        self.output.with_extension("report.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardio_impute::{FillInterpolateImputer, KnnImputer};

    #[test]
    fn empty_config_uses_project_layout() {
        let config = PipelineConfig::from_toml_str("", Path::new("cardio.toml")).unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(
            config.source_path(SourceId::Incidence),
            PathBuf::from("data/GBD_INCIDENCE.csv")
        );
        assert_eq!(config.sources.overweight.header_row, 2);
        assert_eq!(config.sources.alcohol.header_row, 0);
        assert_eq!(config.imputation.len(), 10);
        assert_eq!(config.placeholder_years.to_range(), 1960..=1989);
    }

    #[test]
    fn default_sources_match_what_the_cleaners_expect() {
        let config = PipelineConfig::default();
        for id in SourceId::ALL {
            assert_eq!(
                config.source_input(id),
                SourceInput::default_in(id, &config.data_dir),
                "{id}"
            );
        }
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            data_dir = "/srv/raw"
            include_region = true

            [sources.gdp]
            path = "gdp.csv"

            [imputation]
            Alcohol_Value = { strategy = "knn", k = 3, standardize = true }
            Life_Expectancy = { strategy = "fill_interpolate", group_by = ["Country_Code"] }
            "#,
            Path::new("cardio.toml"),
        )
        .unwrap();

        assert!(config.include_region);
        assert_eq!(config.source_path(SourceId::Gdp), PathBuf::from("/srv/raw/gdp.csv"));
        assert_eq!(config.sources.gdp.header_row, 0);
        assert_eq!(config.sources.incidence, SourcesConfig::default().incidence);
        assert_eq!(config.imputation.len(), 2);
        assert_eq!(
            config.imputation[&Metric::AlcoholValue],
            ImputeStrategy::Knn(KnnImputer::new(3).standardized())
        );
        assert_eq!(
            config.imputation[&Metric::LifeExpectancy],
            ImputeStrategy::FillInterpolate(FillInterpolateImputer::default().grouped(&["Country_Code"]))
        );
    }

    #[test]
    fn absolute_source_paths_ignore_data_dir() {
        let mut config = PipelineConfig::default();
        config.sources.alcohol = SourceSpec::new("/mnt/who/alcohol.xlsx");
        let input = config.source_input(SourceId::Alcohol);
        assert_eq!(input.path, PathBuf::from("/mnt/who/alcohol.xlsx"));
        assert_eq!(input.id, SourceId::Alcohol);
    }

    #[test]
    fn rejects_unknown_metric_and_inverted_years() {
        let err = PipelineConfig::from_toml_str(
            "[imputation]\nBMI = { strategy = \"knn\" }\n",
            Path::new("cardio.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::ConfigParse { .. }));

        let err = PipelineConfig::from_toml_str(
            "placeholder_years = { first = 1990, last = 1960 }\n",
            Path::new("cardio.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig { .. }));
        assert_eq!(err.stage(), None);
    }

    #[test]
    fn report_sits_next_to_snapshot() {
        let config = PipelineConfig::default().with_output("out/final.csv");
        assert_eq!(config.report_path(), PathBuf::from("out/final.report.json"));
    }
}
