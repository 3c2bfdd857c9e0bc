use fleet_sim::config::{self, Command, FormatArg};
use fleet_sim::engine;
use fleet_sim::error::Result;
use fleet_sim::output::{describe_scenario, Formatter, HumanFormatter, JsonFormatter};
use fleet_sim::telemetry;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = config::parse_args()?;
    telemetry::init(&cli.log_level)?;

    match cli.command {
        Command::Run(args) => {
            let scenario = config::build_run_scenario(&args)?;
            let report = engine::run_scenario(&scenario)?;
            let formatter = formatter_for(&args.scenario.format);
            print!("{}", formatter.write_report(&report)?);
        }
        Command::Trial(args) => {
            let scenario = config::build_scenario(&args)?;
            let report = engine::run_scenario_trial(&scenario)?;
            let formatter = formatter_for(&args.format);
            print!("{}", formatter.write_trial(&report)?);
        }
        Command::ShowConfig(args) => {
            let scenario = config::build_scenario(&args)?;
            print!("{}", describe_scenario(&scenario));
        }
    }

    Ok(())
}

fn formatter_for(format: &FormatArg) -> Box<dyn Formatter> {
    match format {
        FormatArg::Human => Box::new(HumanFormatter),
        FormatArg::Json => Box::new(JsonFormatter),
    }
}
