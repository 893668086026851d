//! `cardio` command-line entry point.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Result;
use cardio_cli::logging::{LogConfig, init_logging};
use clap::{ColorChoice, Parser};

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command};
use crate::commands::{
    QueryOutcome, run_pipeline, run_query, run_region, run_resolve, run_standards,
};
use crate::summary::{print_frame, print_regions, print_resolutions, print_run_summary};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&log_config(&cli)) {
        eprintln!("error: cannot set up logging: {error}");
        return ExitCode::FAILURE;
    }
    match dispatch(&cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: &Command) -> Result<()> {
    match command {
        Command::Run(args) => print_run_summary(&run_pipeline(args)?),
        Command::Resolve { names } => print_resolutions(&run_resolve(names)?),
        Command::Region { codes } => print_regions(&run_region(codes)?),
        Command::Standards => println!("{}", run_standards()?),
        Command::Query(args) => match run_query(args)? {
            QueryOutcome::Rows(frame) => print_frame(&frame)?,
            QueryOutcome::NoData => println!("no data available"),
        },
    }
    Ok(())
}

/// `--log-level` beats `-v/-q`; `RUST_LOG` applies only when neither is given.
fn log_config(cli: &Cli) -> LogConfig {
    let explicit = cli.verbosity.is_present() || cli.log_level.is_some();
    let ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig {
        level_filter: cli
            .log_level
            .map_or_else(|| cli.verbosity.tracing_level_filter(), Into::into),
        use_env_filter: !explicit,
        with_ansi: ansi,
        format: cli.log_format.into(),
        log_file: cli.log_file.clone(),
        ..LogConfig::default()
    }
}
