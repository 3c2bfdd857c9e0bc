use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::DistrictId;

/// One district's tally for a single trial.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IterationResult {
    pub days_with_shortages: u32,
    pub total_moves: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DistrictSimulationResult {
    pub days_short: u32,
    pub days_short_std_dev: f64,
    pub total_moves: u32,
    pub total_moves_std_dev: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationResult {
    pub district_results: BTreeMap<DistrictId, DistrictSimulationResult>,
    /// Fraction of days the average vehicle was available, in `[0, 1]`.
    pub average_availability: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunMetadata {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub iterations: usize,
    pub seed: u64,
    pub vehicles: usize,
    pub districts: usize,
    pub parallel: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct SimulationReport {
    pub metadata: RunMetadata,
    pub result: SimulationResult,
}

#[derive(Clone, Debug, Serialize)]
pub struct TrialReport {
    pub metadata: RunMetadata,
    pub district_results: BTreeMap<DistrictId, IterationResult>,
    pub average_days_available: f64,
}
