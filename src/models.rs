use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub type DistrictId = u32;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ScenarioConfig {
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub model: AvailabilityParams,
    #[serde(default)]
    pub vehicles: Vec<VehicleConfig>,
    #[serde(default)]
    pub districts: Vec<DistrictConfig>,
    #[serde(default)]
    pub requirements: Vec<RequirementEntry>,
    #[serde(default)]
    pub weekly_requirements: Vec<WeeklyRequirement>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SimulationConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub parallel: bool,
}

/// Parameters of the breakdown/repair process shared by every vehicle in a
/// scenario.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AvailabilityParams {
    /// Daily probability that an available vehicle breaks down.
    #[serde(default = "default_breakdown_probability")]
    pub breakdown_probability: f64,
    #[serde(default = "default_min_repair_days")]
    pub min_repair_days: u32,
    #[serde(default = "default_max_repair_days")]
    pub max_repair_days: u32,
}

impl Default for AvailabilityParams {
    fn default() -> Self {
        Self {
            breakdown_probability: default_breakdown_probability(),
            min_repair_days: default_min_repair_days(),
            max_repair_days: default_max_repair_days(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VehicleConfig {
    pub name: String,
    pub district_id: DistrictId,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DistrictConfig {
    pub district_id: DistrictId,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RequirementEntry {
    pub district_id: DistrictId,
    pub date: NaiveDate,
    pub vehicles: u32,
}

/// A requirement repeated on every matching weekday of the simulated range.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WeeklyRequirement {
    pub district_id: DistrictId,
    pub weekday: Weekday,
    pub vehicles: u32,
}

fn default_iterations() -> usize {
    1_000
}

fn default_breakdown_probability() -> f64 {
    0.01
}

fn default_min_repair_days() -> u32 {
    3
}

fn default_max_repair_days() -> u32 {
    14
}
