//! Pricing engine. Converts delivered live weights into revenue.
//!
//! Animals outside the target market weight are paid at a reduced
//! rate. Two near-miss bands cost 15% of the animal's value; anything
//! beyond the hard thresholds costs 20%.

use serde::{Deserialize, Serialize};

pub const NEAR_MISS_RATE: f64 = 0.15;
pub const OUT_OF_RANGE_RATE: f64 = 0.20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltySchedule {
    pub low_band_start:  f64,
    pub low_band_end:    f64,
    pub high_band_start: f64,
    pub high_band_end:   f64,
    pub hard_low:        f64,
    pub hard_high:       f64,
}

impl Default for PenaltySchedule {
    fn default() -> Self {
        Self {
            low_band_start:  100.0,
            low_band_end:    105.0,
            high_band_start: 115.0,
            high_band_end:   120.0,
            hard_low:        100.0,
            hard_high:       120.0,
        }
    }
}

impl PenaltySchedule {
    /// Penalty rate for one animal of weight `w` kg.
    ///
    /// Low band is `[start, end)`, high band is `(start, end]`.
    /// The near-miss bands take precedence over the hard thresholds.
    pub fn rate_for(&self, w: f64) -> f64 {
        let in_low_band = self.low_band_start <= w && w < self.low_band_end;
        let in_high_band = self.high_band_start < w && w <= self.high_band_end;
        if in_low_band || in_high_band {
            NEAR_MISS_RATE
        } else if w < self.hard_low || w > self.hard_high {
            OUT_OF_RANGE_RATE
        } else {
            0.0
        }
    }

    /// The penalty-free target interval `[low_band_end, high_band_start]`.
    pub fn target_band(&self) -> (f64, f64) {
        (self.low_band_end, self.high_band_start)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Net of penalties.
    pub revenue: f64,
    pub penalty_total: f64,
    /// `penalty_total / revenue`, 0 when revenue is 0.
    pub penalty_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingEngine {
    pub price_per_kg: f64,
    pub schedule: PenaltySchedule,
}

impl PricingEngine {
    pub fn new(price_per_kg: f64, schedule: PenaltySchedule) -> Self {
        Self { price_per_kg, schedule }
    }

    pub fn price(&self, weights: &[f64]) -> PriceBreakdown {
        let mut revenue = 0.0;
        let mut penalty_total = 0.0;

        for &w in weights {
            let value = w * self.price_per_kg;
            let penalty = value * self.schedule.rate_for(w);
            revenue += value - penalty;
            penalty_total += penalty;
        }

        let penalty_ratio = if revenue != 0.0 { penalty_total / revenue } else { 0.0 };

        PriceBreakdown { revenue, penalty_total, penalty_ratio }
    }
}
