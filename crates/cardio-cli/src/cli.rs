//! Command-line arguments for `cardio`.

use std::path::PathBuf;

use cardio_cli::logging::LogFormat;
use cardio_model::{Gender, Metric, Region};
use cardio_query::Dimension;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "cardio",
    version,
    about = "Build and query the cardiovascular risk-factor dataset",
    long_about = "Clean, merge and gap-fill public heart-disease, risk-factor and \
                  economic indicators into one country-year table.\n\n\
                  Lookup tables are read from CARDIO_STANDARDS_DIR, or the \
                  workspace standards/ directory when unset."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Append logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full pipeline and write the analytic snapshot.
    Run(RunArgs),

    /// Resolve country names to alpha-3 codes.
    Resolve {
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,
    },

    /// Classify alpha-3 codes into regions.
    Region {
        #[arg(value_name = "CODE", required = true)]
        codes: Vec<String>,
    },

    /// Verify the lookup tables and print their coverage as JSON.
    Standards,

    /// Average metrics over a written snapshot.
    Query(QueryArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Pipeline configuration (TOML). Defaults apply when omitted.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the raw source files.
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Snapshot path.
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Run every stage but write nothing.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct QueryArgs {
    /// Snapshot written by `cardio run`.
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Single year.
    #[arg(long = "year", conflicts_with_all = ["from", "to"])]
    pub year: Option<i64>,

    /// First year of a range.
    #[arg(long = "from")]
    pub from: Option<i64>,

    /// Last year of a range.
    #[arg(long = "to")]
    pub to: Option<i64>,

    /// Country name or alpha-3 code (repeatable).
    #[arg(long = "country", value_name = "COUNTRY")]
    pub countries: Vec<String>,

    /// Region (repeatable), e.g. "Europe" or "North America".
    #[arg(long = "region", value_name = "REGION")]
    pub regions: Vec<Region>,

    /// Age group label (repeatable).
    #[arg(long = "age-group", value_name = "AGE_GROUP")]
    pub age_groups: Vec<String>,

    /// Male, Female or Both (repeatable).
    #[arg(long = "gender", value_name = "GENDER")]
    pub genders: Vec<Gender>,

    /// Grouping dimension (repeatable): year, country, country-code,
    /// region, age-group, gender.
    #[arg(long = "group-by", value_name = "DIMENSION")]
    pub group_by: Vec<Dimension>,

    /// Metric column to average (repeatable). All metrics when omitted.
    #[arg(long = "metric", value_name = "METRIC")]
    pub metrics: Vec<Metric>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
