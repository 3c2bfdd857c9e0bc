use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::ScenarioConfig;

#[derive(Parser, Debug)]
#[command(
    name = "fleet-sim",
    about = "Monte Carlo estimate of district vehicle shortages",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    /// Log filter used when RUST_LOG is unset (e.g. info, fleet_sim=debug)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every configured trial and print aggregate statistics
    Run(RunArgs),
    /// Run a single trial and print its per-district tallies
    Trial(ScenarioArgs),
    /// Print the resolved scenario without simulating
    ShowConfig(ScenarioArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    /// Scenario file (.toml or .json)
    #[arg(long)]
    pub config: PathBuf,
    /// First simulated day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,
    /// Last simulated day, inclusive (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, value_enum, default_value = "human")]
    pub format: FormatArg,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,
    #[arg(long)]
    pub iterations: Option<usize>,
    /// Spread trials across threads
    #[arg(long)]
    pub parallel: bool,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Human,
    Json,
}

pub fn parse_args() -> Result<Cli> {
    Cli::try_parse().map_err(|err| Error::Cli(err.to_string()))
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidDate(input.to_string()))
}

pub fn load_config(path: &Path) -> Result<ScenarioConfig> {
    let contents = fs::read_to_string(path).map_err(|err| {
        Error::ConfigIo(format!(
            "failed to read config '{}': {}",
            path.display(),
            err
        ))
    })?;
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or("");

    match ext {
        "toml" => toml::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse TOML: {}", err))),
        "json" => serde_json::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse JSON: {}", err))),
        "" => Err(Error::UnsupportedConfigFormat("unknown".to_string())),
        _ => Err(Error::UnsupportedConfigFormat(ext.to_string())),
    }
}

/// Loads the scenario file and applies command-line overrides.
pub fn build_scenario(args: &ScenarioArgs) -> Result<ScenarioConfig> {
    let mut scenario = load_config(&args.config)?;
    apply_overrides(&mut scenario, args);
    Ok(scenario)
}

pub fn build_run_scenario(args: &RunArgs) -> Result<ScenarioConfig> {
    let mut scenario = build_scenario(&args.scenario)?;
    if let Some(iterations) = args.iterations {
        scenario.simulation.iterations = iterations;
    }
    if args.parallel {
        scenario.simulation.parallel = true;
    }
    if scenario.simulation.iterations == 0 {
        return Err(Error::IterationsZero);
    }
    Ok(scenario)
}

fn apply_overrides(scenario: &mut ScenarioConfig, args: &ScenarioArgs) {
    if let Some(start) = args.start {
        scenario.simulation.start = start;
    }
    if let Some(end) = args.end {
        scenario.simulation.end = end;
    }
    if args.seed.is_some() {
        scenario.simulation.seed = args.seed;
    }
}
