use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::availability::AvailabilityModel;
use crate::models::{AvailabilityParams, DistrictId};

/// A vehicle that breaks down with a fixed daily probability and is then off
/// the road for a uniformly drawn number of repair days.
///
/// The generator is owned by the vehicle. `reset` keeps drawing from it, so
/// consecutive trials see different breakdown histories; `reseed` starts a
/// new stream.
#[derive(Clone, Debug)]
pub struct BreakdownRepairModel {
    district_id: DistrictId,
    params: AvailabilityParams,
    rng: StdRng,
    available: bool,
    days_available: u32,
    // `None` when the vehicle never breaks down.
    days_until_breakdown: Option<u32>,
    repair_days_remaining: u32,
}

impl BreakdownRepairModel {
    pub fn new(district_id: DistrictId, params: AvailabilityParams, seed: u64) -> Self {
        let mut model = Self {
            district_id,
            params,
            rng: StdRng::seed_from_u64(seed),
            available: true,
            days_available: 0,
            days_until_breakdown: None,
            repair_days_remaining: 0,
        };
        model.reset();
        model
    }

    /// Whole days of service before the next breakdown, drawn from the
    /// geometric distribution by inverse transform.
    fn sample_days_until_breakdown(&mut self) -> Option<u32> {
        let p = self.params.breakdown_probability;
        if p <= 0.0 {
            return None;
        }
        if p >= 1.0 {
            return Some(0);
        }
        let mut u = 1.0 - self.rng.gen::<f64>();
        if u <= f64::MIN_POSITIVE {
            u = f64::MIN_POSITIVE;
        }
        // ln(1 - p) without cancellation, so tiny probabilities stay tiny.
        let days = (u.ln() / (-p).ln_1p()).floor();
        Some(days as u32)
    }

    fn sample_repair_days(&mut self) -> u32 {
        self.rng
            .gen_range(self.params.min_repair_days..=self.params.max_repair_days)
    }
}

impl AvailabilityModel for BreakdownRepairModel {
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
        self.available = true;
        self.days_available = 0;
        self.repair_days_remaining = 0;
        self.days_until_breakdown = self.sample_days_until_breakdown();
    }

    fn update(&mut self) {
        if self.available {
            match self.days_until_breakdown {
                Some(0) => {
                    // The breakdown day counts as the first repair day.
                    self.available = false;
                    self.repair_days_remaining = self.sample_repair_days().saturating_sub(1);
                }
                Some(days) => self.days_until_breakdown = Some(days - 1),
                None => {}
            }
        } else if self.repair_days_remaining == 0 {
            self.available = true;
            self.days_until_breakdown = self.sample_days_until_breakdown();
        } else {
            self.repair_days_remaining -= 1;
        }

        if self.available {
            self.days_available += 1;
        }
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}
