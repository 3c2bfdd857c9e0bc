mod breakdown;

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::models::{AvailabilityParams, DistrictId, VehicleConfig};

pub use breakdown::BreakdownRepairModel;

/// Day-by-day availability of a single vehicle, as seen by the engine.
pub trait AvailabilityModel {
    fn district_id(&self) -> DistrictId;
    fn is_available(&self) -> bool;
    /// Days the vehicle ended available since the last `reset`.
    fn days_available(&self) -> u32;
    /// Return to a fresh starting state before a trial.
    fn reset(&mut self);
    /// Advance one simulated day.
    fn update(&mut self);
    /// Replace the random stream. Deterministic models can ignore this.
    fn reseed(&mut self, _seed: u64) {}
}

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Derives an independent seed for `stream` (a vehicle index or trial index)
/// from `base`. Uses the splitmix64 finalizer so neighbouring streams land
/// far apart.
pub fn stream_seed(base: u64, stream: u64) -> u64 {
    let mut z = base ^ stream.wrapping_add(1).wrapping_mul(MIXING_CONSTANT);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

pub fn validate_params(params: &AvailabilityParams) -> Result<()> {
    let p = params.breakdown_probability;
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::InvalidBreakdownProbability(p));
    }
    if params.min_repair_days == 0 {
        return Err(Error::InvalidRepairDays(params.min_repair_days));
    }
    if params.min_repair_days > params.max_repair_days {
        return Err(Error::InvalidRepairRange {
            min: params.min_repair_days,
            max: params.max_repair_days,
        });
    }
    Ok(())
}

/// Builds one model per configured vehicle, each with its own generator
/// seeded from `seed` and the vehicle's position in the list.
pub fn build_fleet(
    vehicles: &[VehicleConfig],
    params: &AvailabilityParams,
    seed: u64,
) -> Result<Vec<BreakdownRepairModel>> {
    validate_params(params)?;

    let mut names = HashSet::new();
    let mut fleet = Vec::with_capacity(vehicles.len());
    for (idx, vehicle) in vehicles.iter().enumerate() {
        let name = vehicle.name.trim();
        if name.is_empty() {
            return Err(Error::EmptyVehicleName);
        }
        if !names.insert(name.to_string()) {
            return Err(Error::DuplicateVehicleName(name.to_string()));
        }
        fleet.push(BreakdownRepairModel::new(
            vehicle.district_id,
            params.clone(),
            stream_seed(seed, idx as u64),
        ));
    }

    Ok(fleet)
}
