use crate::engine::simulated_days;
use crate::error::{Error, Result};
use crate::models::ScenarioConfig;
use crate::state::{RunMetadata, SimulationReport, TrialReport};

pub trait Formatter {
    fn write_report(&self, report: &SimulationReport) -> Result<String>;
    fn write_trial(&self, report: &TrialReport) -> Result<String>;
}

pub struct HumanFormatter;

pub struct JsonFormatter;

impl Formatter for HumanFormatter {
    fn write_report(&self, report: &SimulationReport) -> Result<String> {
        let mut out = String::new();
        write_metadata(&mut out, &report.metadata);
        push_line(
            &mut out,
            format!(
                "Average availability: {:.2}%",
                report.result.average_availability * 100.0
            ),
        );
        push_line(&mut out, "Districts:");
        for (district, result) in &report.result.district_results {
            push_line(
                &mut out,
                format!(
                    "{}: {} days short (sd {:.2}), {} moves (sd {:.2})",
                    district,
                    result.days_short,
                    result.days_short_std_dev,
                    result.total_moves,
                    result.total_moves_std_dev
                ),
            );
        }
        Ok(out)
    }

    fn write_trial(&self, report: &TrialReport) -> Result<String> {
        let mut out = String::new();
        write_metadata(&mut out, &report.metadata);
        push_line(
            &mut out,
            format!(
                "Average days available: {:.2}",
                report.average_days_available
            ),
        );
        push_line(&mut out, "Districts:");
        for (district, result) in &report.district_results {
            push_line(
                &mut out,
                format!(
                    "{}: {} days short, {} moves",
                    district, result.days_with_shortages, result.total_moves
                ),
            );
        }
        Ok(out)
    }
}

impl Formatter for JsonFormatter {
    fn write_report(&self, report: &SimulationReport) -> Result<String> {
        to_json(report)
    }

    fn write_trial(&self, report: &TrialReport) -> Result<String> {
        to_json(report)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value)
        .map_err(|err| Error::Output(format!("failed to serialize JSON: {}", err)))?;
    out.push('\n');
    Ok(out)
}

fn push_line(out: &mut String, line: impl AsRef<str>) {
    out.push_str(line.as_ref());
    out.push('\n');
}

fn write_metadata(out: &mut String, metadata: &RunMetadata) {
    push_line(out, "Metadata:");
    push_line(
        out,
        format!(
            "period: {}..{} ({} days)",
            metadata.start,
            metadata.end,
            simulated_days(metadata.start, metadata.end)
        ),
    );
    push_line(out, format!("iterations: {}", metadata.iterations));
    push_line(out, format!("seed: {}", metadata.seed));
    push_line(out, format!("vehicles: {}", metadata.vehicles));
    push_line(out, format!("districts: {}", metadata.districts));
    if metadata.parallel {
        push_line(out, "parallel: true");
    }
}

/// Renders a scenario as loaded, after command-line overrides.
pub fn describe_scenario(scenario: &ScenarioConfig) -> String {
    let sim = &scenario.simulation;
    let mut out = String::new();
    push_line(&mut out, format!("Period: {}..{}", sim.start, sim.end));
    push_line(&mut out, format!("Iterations: {}", sim.iterations));
    match sim.seed {
        Some(seed) => push_line(&mut out, format!("Seed: {}", seed)),
        None => push_line(&mut out, "Seed: random"),
    }
    push_line(
        &mut out,
        format!(
            "Model: breakdown probability {}, repair {}-{} days",
            scenario.model.breakdown_probability,
            scenario.model.min_repair_days,
            scenario.model.max_repair_days
        ),
    );
    push_line(&mut out, "Vehicles:");
    for vehicle in &scenario.vehicles {
        push_line(
            &mut out,
            format!("- {} (district {})", vehicle.name, vehicle.district_id),
        );
    }
    push_line(&mut out, "Requirements:");
    for entry in &scenario.requirements {
        push_line(
            &mut out,
            format!(
                "- district {} on {}: {} vehicles",
                entry.district_id, entry.date, entry.vehicles
            ),
        );
    }
    for weekly in &scenario.weekly_requirements {
        push_line(
            &mut out,
            format!(
                "- district {} every {}: {} vehicles",
                weekly.district_id, weekly.weekday, weekly.vehicles
            ),
        );
    }
    out
}
