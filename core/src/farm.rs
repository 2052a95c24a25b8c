//! Farm entity: inventory and live-weight distribution.

use crate::{
    config::FarmRecord,
    rng::SubsystemRng,
    types::{round2, Day, FarmId, GeoPoint},
};
use serde::{Deserialize, Serialize};

/// `last_visit_day` of a farm never visited in this run.
pub const NEVER_VISITED: Day = -999;

#[derive(Debug, Clone, PartialEq)]
pub struct Farm {
    pub id: FarmId,
    pub name: String,
    pub location: GeoPoint,
    inventory: u32,
    mean_weight: f64,
    weight_std_dev: f64,
    pub last_visit_day: Day,
}

/// What a farm can release into a given amount of truck space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Offer {
    pub count: u32,
    pub weights: Vec<f64>,
    pub total_weight: f64,
}

impl Offer {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Day-start view of one farm, as sent to the observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmSnapshot {
    pub id: FarmId,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub inventory: u32,
    pub avg_weight: f64,
    /// Animals currently inside the penalty-free market band.
    pub ready_animals: u32,
}

impl Farm {
    pub fn from_record(record: &FarmRecord, default_std_fraction: f64) -> Self {
        Self {
            id:             record.farm_id.clone(),
            name:           record.name.clone(),
            location:       GeoPoint::new(record.lat, record.lon),
            inventory:      record.total_pigs,
            mean_weight:    record.mean_weight_kg,
            weight_std_dev: record
                .std_weight_kg
                .unwrap_or(record.mean_weight_kg * default_std_fraction),
            last_visit_day: NEVER_VISITED,
        }
    }

    pub fn inventory(&self) -> u32 { self.inventory }
    pub fn mean_weight(&self) -> f64 { self.mean_weight }
    pub fn weight_std_dev(&self) -> f64 { self.weight_std_dev }

    /// One day of growth. Empty farms do not grow.
    pub fn grow(&mut self, increment_kg: f64) {
        if self.inventory > 0 {
            self.mean_weight += increment_kg;
        }
    }

    pub fn is_eligible(&self, day: Day, cooldown_days: Day) -> bool {
        self.inventory > 0 && day - self.last_visit_day >= cooldown_days
    }

    /// How many animals fit into `max_weight_kg`, with sampled weights.
    /// Does not touch the farm; only `rng` advances.
    ///
    /// Sampled weights are not clamped unless `clamp_negative` is set,
    /// so a pathological distribution can yield negative weights.
    pub fn offer(&self, max_weight_kg: f64, rng: &mut SubsystemRng, clamp_negative: bool) -> Offer {
        if self.inventory == 0 || self.mean_weight <= 0.0 {
            return Offer::default();
        }

        let max_count = (max_weight_kg / self.mean_weight).floor();
        if max_count.is_nan() || max_count < 1.0 {
            return Offer::default();
        }

        let count = if max_count >= self.inventory as f64 {
            self.inventory
        } else {
            max_count as u32
        };

        let weights: Vec<f64> = (0..count)
            .map(|_| {
                let w = rng.normal(self.mean_weight, self.weight_std_dev);
                if clamp_negative { w.max(0.0) } else { w }
            })
            .collect();
        let total_weight = weights.iter().sum();

        Offer { count, weights, total_weight }
    }

    /// Release `count` animals.
    ///
    /// # Panics
    /// If `count` exceeds the inventory. Callers pass the count of an
    /// `offer` they just received; anything else is a contract breach.
    pub fn commit(&mut self, count: u32) {
        assert!(
            count <= self.inventory,
            "invariant violated: commit({count}) on farm {} holding {}",
            self.id,
            self.inventory
        );
        self.inventory -= count;
    }

    /// Fraction of the herd whose weight lies in `[low, high]`, under the
    /// farm's normal weight distribution.
    pub fn ready_fraction(&self, low: f64, high: f64) -> f64 {
        if self.weight_std_dev <= 0.0 {
            return if (low..=high).contains(&self.mean_weight) { 1.0 } else { 0.0 };
        }
        let cdf = |x: f64| normal_cdf(x, self.mean_weight, self.weight_std_dev);
        (cdf(high) - cdf(low)).max(0.0)
    }

    pub fn ready_animals(&self, low: f64, high: f64) -> u32 {
        (self.inventory as f64 * self.ready_fraction(low, high)).round() as u32
    }

    pub fn snapshot(&self, target_band: (f64, f64)) -> FarmSnapshot {
        FarmSnapshot {
            id:            self.id.clone(),
            name:          self.name.clone(),
            lat:           self.location.lat,
            lon:           self.location.lon,
            inventory:     self.inventory,
            avg_weight:    round2(self.mean_weight),
            ready_animals: self.ready_animals(target_band.0, target_band.1),
        }
    }
}

fn normal_cdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    0.5 * (1.0 + erf((x - mean) / (std_dev * std::f64::consts::SQRT_2)))
}

/// Abramowitz & Stegun 7.1.26, max error ~1.5e-7.
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x >= 0.0 { 1.0 } else { -1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}
