use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

use crate::availability::{build_fleet, AvailabilityModel, BreakdownRepairModel};
#[cfg(feature = "parallel")]
use crate::availability::stream_seed;
use crate::error::{Error, Result};
use crate::models::{DistrictId, ScenarioConfig};
use crate::requirements::DistrictRequirements;
use crate::state::{
    DistrictSimulationResult, IterationResult, RunMetadata, SimulationReport, SimulationResult,
    TrialReport,
};
use crate::stats::{mean, population_std_dev, round_count};

/// Divisor for turning average days available into a fraction of a year.
pub const DAYS_PER_YEAR: i64 = 365;

/// Runs repeated trials of a fleet against district requirements.
///
/// The vehicle models are owned by the simulation and reused between trials;
/// every trial starts by resetting them.
pub struct FleetSimulation<M> {
    vehicles: Vec<M>,
    requirements: DistrictRequirements,
}

impl<M: AvailabilityModel> FleetSimulation<M> {
    pub fn new(vehicles: Vec<M>, requirements: DistrictRequirements) -> Self {
        Self {
            vehicles,
            requirements,
        }
    }

    pub fn vehicles(&self) -> &[M] {
        &self.vehicles
    }

    /// Simulates `start..=end` once from the vehicles' current state.
    ///
    /// Callers starting a fresh trial reset the vehicles first. An empty
    /// range (`end < start`) yields zeroed results for every district.
    pub fn run_single_iteration(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BTreeMap<DistrictId, IterationResult> {
        run_trial(&mut self.vehicles, &self.requirements, start, end)
    }

    pub fn run_simulation(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        iterations: usize,
    ) -> Result<SimulationResult> {
        if iterations == 0 {
            return Err(Error::IterationsZero);
        }
        info!(
            %start,
            %end,
            iterations,
            vehicles = self.vehicles.len(),
            districts = self.requirements.len(),
            "running fleet simulation"
        );

        let mut tally = TrialTally::new(&self.requirements, iterations);
        for trial in 0..iterations {
            for vehicle in &mut self.vehicles {
                vehicle.reset();
            }
            let districts = run_trial(&mut self.vehicles, &self.requirements, start, end);
            let days_available = average_days_available(&self.vehicles);
            debug!(trial, days_available, "trial complete");
            tally.record(districts, days_available);
        }

        Ok(tally.finish(simulated_days(start, end)))
    }
}

#[cfg(feature = "parallel")]
impl<M: AvailabilityModel + Clone + Send + Sync> FleetSimulation<M> {
    /// Runs the trials on the rayon pool.
    ///
    /// Each worker clones the fleet once. Before trial `t` every vehicle `v`
    /// is reseeded with `stream_seed(stream_seed(seed, t), v)`, so the result
    /// depends on `seed` only, never on the number of threads.
    pub fn run_simulation_parallel(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        iterations: usize,
        seed: u64,
    ) -> Result<SimulationResult> {
        use rayon::prelude::*;

        if iterations == 0 {
            return Err(Error::IterationsZero);
        }
        info!(
            %start,
            %end,
            iterations,
            seed,
            vehicles = self.vehicles.len(),
            districts = self.requirements.len(),
            threads = rayon::current_num_threads(),
            "running fleet simulation in parallel"
        );

        let outcomes: Vec<(BTreeMap<DistrictId, IterationResult>, f64)> = (0..iterations)
            .into_par_iter()
            .map_init(
                || self.vehicles.clone(),
                |fleet, trial| {
                    let trial_seed = stream_seed(seed, trial as u64);
                    for (idx, vehicle) in fleet.iter_mut().enumerate() {
                        vehicle.reseed(stream_seed(trial_seed, idx as u64));
                        vehicle.reset();
                    }
                    let districts = run_trial(fleet, &self.requirements, start, end);
                    (districts, average_days_available(fleet))
                },
            )
            .collect();

        let mut tally = TrialTally::new(&self.requirements, iterations);
        for (districts, days_available) in outcomes {
            tally.record(districts, days_available);
        }

        Ok(tally.finish(simulated_days(start, end)))
    }
}

/// Per-district samples collected across trials.
struct TrialTally {
    days_short: BTreeMap<DistrictId, Vec<u32>>,
    moves: BTreeMap<DistrictId, Vec<u32>>,
    days_available: Vec<f64>,
}

impl TrialTally {
    fn new(requirements: &DistrictRequirements, iterations: usize) -> Self {
        let samples = || {
            requirements
                .districts()
                .map(|district| (district, Vec::with_capacity(iterations)))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            days_short: samples(),
            moves: samples(),
            days_available: Vec::with_capacity(iterations),
        }
    }

    fn record(&mut self, districts: BTreeMap<DistrictId, IterationResult>, days_available: f64) {
        for (district, result) in districts {
            self.days_short
                .entry(district)
                .or_default()
                .push(result.days_with_shortages);
            self.moves
                .entry(district)
                .or_default()
                .push(result.total_moves);
        }
        self.days_available.push(days_available);
    }

    fn finish(self, simulated_days: i64) -> SimulationResult {
        let Self {
            days_short,
            moves,
            days_available,
        } = self;

        let district_results = days_short
            .into_iter()
            .map(|(district, days)| {
                let district_moves = moves.get(&district).map(Vec::as_slice).unwrap_or(&[]);
                let result = DistrictSimulationResult {
                    days_short: round_count(mean(&days)),
                    days_short_std_dev: population_std_dev(&days),
                    total_moves: round_count(mean(district_moves)),
                    total_moves_std_dev: population_std_dev(district_moves),
                };
                (district, result)
            })
            .collect();

        let divisor = simulated_days.max(DAYS_PER_YEAR) as f64;
        SimulationResult {
            district_results,
            average_availability: mean(&days_available) / divisor,
        }
    }
}

fn run_trial<M: AvailabilityModel>(
    vehicles: &mut [M],
    requirements: &DistrictRequirements,
    start: NaiveDate,
    end: NaiveDate,
) -> BTreeMap<DistrictId, IterationResult> {
    let mut results: BTreeMap<DistrictId, IterationResult> = requirements
        .districts()
        .map(|district| (district, IterationResult::default()))
        .collect();
    let mut on_road: HashMap<DistrictId, u32> = HashMap::new();

    for date in start.iter_days().take_while(|date| *date <= end) {
        on_road.clear();
        for vehicle in vehicles.iter_mut() {
            vehicle.update();
            if vehicle.is_available() {
                *on_road.entry(vehicle.district_id()).or_default() += 1;
            }
        }

        for (district, result) in results.iter_mut() {
            let required = requirements.required_on(*district, date);
            let available = on_road.get(district).copied().unwrap_or(0);
            if available < required {
                result.days_with_shortages += 1;
                result.total_moves = result.total_moves.saturating_add(required - available);
            }
        }
    }

    results
}

fn average_days_available<M: AvailabilityModel>(vehicles: &[M]) -> f64 {
    let days: Vec<u32> = vehicles.iter().map(|vehicle| vehicle.days_available()).collect();
    mean(&days)
}

pub fn simulated_days(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        0
    } else {
        (end - start).num_days() + 1
    }
}

/// Builds the fleet and requirement table for a scenario and runs every
/// configured trial.
pub fn run_scenario(scenario: &ScenarioConfig) -> Result<SimulationReport> {
    let (mut simulation, metadata) = prepare(scenario)?;
    let (start, end) = (scenario.simulation.start, scenario.simulation.end);

    #[cfg(feature = "parallel")]
    let result = if metadata.parallel {
        simulation.run_simulation_parallel(start, end, metadata.iterations, metadata.seed)?
    } else {
        simulation.run_simulation(start, end, metadata.iterations)?
    };
    #[cfg(not(feature = "parallel"))]
    let result = simulation.run_simulation(start, end, metadata.iterations)?;

    info!(
        average_availability = result.average_availability,
        "fleet simulation finished"
    );
    Ok(SimulationReport { metadata, result })
}

/// Runs a single reset-and-simulate trial for a scenario, for diagnostics.
pub fn run_scenario_trial(scenario: &ScenarioConfig) -> Result<TrialReport> {
    let (mut simulation, mut metadata) = prepare(scenario)?;
    let (start, end) = (scenario.simulation.start, scenario.simulation.end);
    metadata.iterations = 1;
    metadata.parallel = false;

    for vehicle in &mut simulation.vehicles {
        vehicle.reset();
    }
    let district_results = simulation.run_single_iteration(start, end);
    let average_days_available = average_days_available(simulation.vehicles());

    Ok(TrialReport {
        metadata,
        district_results,
        average_days_available,
    })
}

fn prepare(
    scenario: &ScenarioConfig,
) -> Result<(FleetSimulation<BreakdownRepairModel>, RunMetadata)> {
    let sim = &scenario.simulation;
    if sim.end < sim.start {
        warn!(
            start = %sim.start,
            end = %sim.end,
            "end date precedes start date; no days will be simulated"
        );
    }

    let seed = match sim.seed {
        Some(seed) => seed,
        None => {
            let seed = rand::random::<u64>();
            info!(seed, "no seed configured, generated one");
            seed
        }
    };

    let fleet = build_fleet(&scenario.vehicles, &scenario.model, seed)?;
    let requirements = DistrictRequirements::from_scenario(scenario, sim.start, sim.end);
    if requirements.is_empty() {
        warn!("scenario declares no districts; results will be empty");
    }
    let metadata = RunMetadata {
        start: sim.start,
        end: sim.end,
        iterations: sim.iterations,
        seed,
        vehicles: fleet.len(),
        districts: requirements.len(),
        parallel: sim.parallel && cfg!(feature = "parallel"),
    };

    Ok((FleetSimulation::new(fleet, requirements), metadata))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stays in whatever state it was built with; `update` only counts days.
    #[derive(Clone, Debug)]
    struct FixedVehicle {
        district_id: DistrictId,
        available: bool,
        days_available: u32,
    }

    impl FixedVehicle {
        fn new(district_id: DistrictId, available: bool) -> Self {
            Self {
                district_id,
                available,
                days_available: 0,
            }
        }
    }

    impl AvailabilityModel for FixedVehicle {
        fn district_id(&self) -> DistrictId {
            self.district_id
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn days_available(&self) -> u32 {
            self.days_available
        }

        fn reset(&mut self) {
            self.days_available = 0;
        }

        fn update(&mut self) {
            if self.available {
                self.days_available += 1;
            }
        }
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, month, day).unwrap()
    }

    fn requirements(entries: &[(DistrictId, NaiveDate, u32)]) -> DistrictRequirements {
        let mut table = DistrictRequirements::default();
        for (district, date, vehicles) in entries {
            table.set(*district, *date, *vehicles);
        }
        table
    }

    #[test]
    fn always_available_fleet_meets_requirement() {
        let mut sim = FleetSimulation::new(
            vec![FixedVehicle::new(1, true), FixedVehicle::new(1, true)],
            requirements(&[(1, date(1, 1), 2)]),
        );
        let results = sim.run_single_iteration(date(1, 1), date(1, 1));
        assert_eq!(results[&1], IterationResult::default());
    }

    #[test]
    fn shortfall_counts_one_day_and_missing_vehicles() {
        let mut sim = FleetSimulation::new(
            vec![FixedVehicle::new(1, true)],
            requirements(&[(1, date(1, 5), 3)]),
        );
        let results = sim.run_single_iteration(date(1, 1), date(1, 10));
        assert_eq!(
            results[&1],
            IterationResult {
                days_with_shortages: 1,
                total_moves: 2,
            }
        );
    }

    #[test]
    fn reversed_range_yields_zeroed_results() {
        let mut sim = FleetSimulation::new(
            vec![FixedVehicle::new(1, false)],
            requirements(&[(1, date(1, 1), 3), (2, date(1, 2), 1)]),
        );
        let results = sim.run_single_iteration(date(1, 10), date(1, 1));
        assert_eq!(results.len(), 2);
        assert!(results.values().all(|result| *result == IterationResult::default()));
        assert_eq!(sim.vehicles()[0].days_available(), 0);
    }

    #[test]
    fn district_without_vehicles_is_short_every_required_day() {
        let mut sim = FleetSimulation::new(
            vec![FixedVehicle::new(1, true)],
            requirements(&[(2, date(1, 2), 2), (2, date(1, 3), 1)]),
        );
        let results = sim.run_single_iteration(date(1, 1), date(1, 3));
        assert_eq!(
            results[&2],
            IterationResult {
                days_with_shortages: 2,
                total_moves: 3,
            }
        );
        assert!(!results.contains_key(&1));
    }

    #[test]
    fn huge_requirements_saturate_moves() {
        let mut sim: FleetSimulation<FixedVehicle> = FleetSimulation::new(
            Vec::new(),
            requirements(&[(1, date(1, 1), u32::MAX), (1, date(1, 2), u32::MAX)]),
        );
        let results = sim.run_single_iteration(date(1, 1), date(1, 2));
        assert_eq!(
            results[&1],
            IterationResult {
                days_with_shortages: 2,
                total_moves: u32::MAX,
            }
        );

        let result = sim.run_simulation(date(1, 1), date(1, 2), 2).unwrap();
        assert_eq!(result.district_results[&1].total_moves, u32::MAX);
        assert_eq!(result.district_results[&1].total_moves_std_dev, 0.0);
    }

    #[test]
    fn unavailable_vehicles_do_not_count() {
        let mut sim = FleetSimulation::new(
            vec![FixedVehicle::new(1, false), FixedVehicle::new(1, true)],
            requirements(&[(1, date(1, 1), 2)]),
        );
        let results = sim.run_single_iteration(date(1, 1), date(1, 1));
        assert_eq!(results[&1].total_moves, 1);
    }

    #[test]
    fn every_vehicle_advances_once_per_day() {
        let mut sim = FleetSimulation::new(
            vec![FixedVehicle::new(1, true), FixedVehicle::new(7, true)],
            requirements(&[(1, date(1, 1), 1)]),
        );
        sim.run_single_iteration(date(1, 1), date(1, 31));
        assert!(sim.vehicles().iter().all(|vehicle| vehicle.days_available() == 31));
    }

    #[test]
    fn zero_iterations_is_rejected() {
        let mut sim = FleetSimulation::new(
            vec![FixedVehicle::new(1, true)],
            requirements(&[(1, date(1, 1), 1)]),
        );
        let err = sim.run_simulation(date(1, 1), date(1, 2), 0).unwrap_err();
        assert_eq!(err.to_string(), "iterations must be greater than 0");
    }

    #[test]
    fn single_iteration_has_zero_deviation() {
        let mut sim = FleetSimulation::new(
            vec![FixedVehicle::new(1, true)],
            requirements(&[(1, date(1, 5), 3), (1, date(1, 6), 2)]),
        );
        let result = sim.run_simulation(date(1, 1), date(1, 10), 1).unwrap();
        assert_eq!(
            result.district_results[&1],
            DistrictSimulationResult {
                days_short: 2,
                days_short_std_dev: 0.0,
                total_moves: 3,
                total_moves_std_dev: 0.0,
            }
        );
    }

    #[test]
    fn average_availability_is_fraction_of_year() {
        let mut sim = FleetSimulation::new(
            vec![FixedVehicle::new(1, true), FixedVehicle::new(1, false)],
            requirements(&[(1, date(1, 1), 1)]),
        );
        let result = sim.run_simulation(date(1, 1), date(12, 31), 3).unwrap();
        assert_eq!(result.average_availability, 0.5);
    }

    #[test]
    fn long_ranges_stay_within_unit_availability() {
        let mut sim = FleetSimulation::new(
            vec![FixedVehicle::new(1, true)],
            DistrictRequirements::default(),
        );
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let result = sim.run_simulation(date(1, 1), end, 1).unwrap();
        assert_eq!(result.average_availability, 1.0);
    }

    #[test]
    fn empty_fleet_and_requirements_are_valid() {
        let mut sim: FleetSimulation<FixedVehicle> =
            FleetSimulation::new(Vec::new(), DistrictRequirements::default());
        let result = sim.run_simulation(date(1, 1), date(1, 31), 5).unwrap();
        assert!(result.district_results.is_empty());
        assert_eq!(result.average_availability, 0.0);
    }

    #[test]
    fn simulated_days_is_inclusive() {
        assert_eq!(simulated_days(date(1, 1), date(1, 1)), 1);
        assert_eq!(simulated_days(date(1, 1), date(12, 31)), 365);
        assert_eq!(simulated_days(date(1, 2), date(1, 1)), 0);
    }

    #[test]
    fn tally_uses_population_deviation_and_rounds_means() {
        let table = requirements(&[(1, date(1, 1), 1)]);
        let mut tally = TrialTally::new(&table, 2);
        for (days, moves) in [(1, 2), (2, 5)] {
            let mut districts = BTreeMap::new();
            districts.insert(
                1,
                IterationResult {
                    days_with_shortages: days,
                    total_moves: moves,
                },
            );
            tally.record(districts, 0.0);
        }

        let result = tally.finish(1);
        let district = &result.district_results[&1];
        assert_eq!(district.days_short, 2);
        assert_eq!(district.days_short_std_dev, 0.5);
        assert_eq!(district.total_moves, 4);
        assert_eq!(district.total_moves_std_dev, 1.5);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_run_matches_sequential_for_fixed_fleet() {
        let table = requirements(&[(1, date(1, 3), 4), (2, date(1, 4), 1)]);
        let fleet = vec![
            FixedVehicle::new(1, true),
            FixedVehicle::new(1, false),
            FixedVehicle::new(2, true),
        ];
        let mut sequential = FleetSimulation::new(fleet.clone(), table.clone());
        let parallel = FleetSimulation::new(fleet, table);

        let expected = sequential
            .run_simulation(date(1, 1), date(1, 31), 8)
            .unwrap();
        let actual = parallel
            .run_simulation_parallel(date(1, 1), date(1, 31), 8, 3)
            .unwrap();
        assert_eq!(actual, expected);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_zero_iterations_is_rejected() {
        let sim = FleetSimulation::new(
            vec![FixedVehicle::new(1, true)],
            DistrictRequirements::default(),
        );
        assert!(matches!(
            sim.run_simulation_parallel(date(1, 1), date(1, 2), 0, 1),
            Err(Error::IterationsZero)
        ));
    }
}
