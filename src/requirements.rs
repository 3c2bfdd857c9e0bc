use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::models::{DistrictId, ScenarioConfig};

/// Required vehicle counts per district and calendar day.
///
/// A date missing from a district's map requires no vehicles. Districts with
/// an empty map are still simulated and reported.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistrictRequirements {
    districts: BTreeMap<DistrictId, BTreeMap<NaiveDate, u32>>,
}

impl DistrictRequirements {
    pub fn new(districts: BTreeMap<DistrictId, BTreeMap<NaiveDate, u32>>) -> Self {
        Self { districts }
    }

    /// Builds the table for a scenario. Weekly entries are expanded over
    /// `start..=end`; dated entries win over weekly ones for the same day.
    pub fn from_scenario(scenario: &ScenarioConfig, start: NaiveDate, end: NaiveDate) -> Self {
        let mut table = Self::default();

        for district in &scenario.districts {
            table.declare(district.district_id);
        }
        for vehicle in &scenario.vehicles {
            table.declare(vehicle.district_id);
        }

        for weekly in &scenario.weekly_requirements {
            table.declare(weekly.district_id);
            for date in start.iter_days().take_while(|date| *date <= end) {
                if date.weekday() == weekly.weekday {
                    table.set(weekly.district_id, date, weekly.vehicles);
                }
            }
        }

        for entry in &scenario.requirements {
            table.set(entry.district_id, entry.date, entry.vehicles);
        }

        table
    }

    /// Ensures `district` is part of the table, with no requirements yet.
    pub fn declare(&mut self, district: DistrictId) {
        self.districts.entry(district).or_default();
    }

    pub fn set(&mut self, district: DistrictId, date: NaiveDate, vehicles: u32) {
        self.districts
            .entry(district)
            .or_default()
            .insert(date, vehicles);
    }

    pub fn required_on(&self, district: DistrictId, date: NaiveDate) -> u32 {
        self.districts
            .get(&district)
            .and_then(|days| days.get(&date))
            .copied()
            .unwrap_or(0)
    }

    pub fn districts(&self) -> impl Iterator<Item = DistrictId> + '_ {
        self.districts.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.districts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }
}
