//! Daily planner. Decides every route of a day before any of it is
//! replayed.
//!
//! DAY PHASES (fixed order, one day at a time):
//!   1. Growing      every farm grows
//!   2. Planning     routes are built until capacity or pool runs out
//!   3. Executing    the frozen plan is replayed to the sink
//!   4. Summarizing  metrics and the daily summary are emitted
//!   5. Done         the clock advances
//!
//! Planning is single-threaded and mutates farms in route order: the
//! first route built takes its animals before the second is considered.

use crate::{
    config::{FacilityConfig, SimTuning},
    farm::Farm,
    fleet::FleetSelector,
    pricing::PricingEngine,
    rng::SubsystemRng,
    route::{Route, RouteBuilder},
    types::{round2, Day},
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPhase {
    Growing,
    Planning,
    Executing,
    Summarizing,
    Done,
}

/// A day's financial log entry. Money figures are rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub day: Day,
    pub pigs_processed: u32,
    pub trucks_used: usize,
    pub net_revenue: f64,
    pub variable_transport_cost: f64,
    pub fixed_cost: f64,
    pub net_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPlan {
    pub day: Day,
    pub routes: Vec<Route>,
    pub summary: DailySummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityMetrics {
    pub pigs_delivered: u32,
    pub live_weight_total: f64,
    pub carcass_weight_total: f64,
    pub avg_live_weight: f64,
    pub avg_carcass_weight: f64,
    pub capacity_utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckMetrics {
    pub truck_id: String,
    pub load_kg: f64,
    pub num_pigs: u32,
    pub avg_live_weight: f64,
    pub farms_visited: usize,
}

impl DailyPlan {
    /// Observer-facing id of the `n`th route of the day (1-based).
    pub fn truck_label(n: usize, route: &Route) -> String {
        format!("T{n}-{}", route.truck.id)
    }

    pub fn pigs_planned(&self) -> u32 {
        self.routes.iter().map(|r| r.pig_count).sum()
    }
}

pub struct DailyPlanner {
    pub facility: FacilityConfig,
    pub fleet: FleetSelector,
    pub pricing: PricingEngine,
    pub tuning: SimTuning,
}

impl DailyPlanner {
    pub fn new(facility: FacilityConfig, fleet: FleetSelector, tuning: SimTuning) -> Self {
        let pricing = PricingEngine::new(tuning.price_per_kg, facility.penalty_schedule());
        Self { facility, fleet, pricing, tuning }
    }

    pub fn grow(&self, farms: &mut [Farm]) {
        for farm in farms.iter_mut() {
            farm.grow(self.tuning.daily_growth_kg);
        }
    }

    /// Indices of farms that may be visited on `day`, heaviest first.
    /// Farms of equal mean weight keep catalog order.
    pub fn eligible_pool(&self, farms: &[Farm], day: Day) -> VecDeque<usize> {
        let mut pool: Vec<usize> = farms
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_eligible(day, self.tuning.revisit_cooldown_days))
            .map(|(i, _)| i)
            .collect();
        pool.sort_by(|&a, &b| farms[b].mean_weight().total_cmp(&farms[a].mean_weight()));
        pool.into()
    }

    /// Build every route for `day`. Farms already grew.
    ///
    /// The last route may push `pigs_processed` past the facility's
    /// daily capacity; the overshoot is kept.
    pub fn plan(&self, farms: &mut [Farm], day: Day, rng: &mut SubsystemRng) -> DailyPlan {
        let capacity = self.facility.daily_capacity_max;
        let builder = RouteBuilder {
            facility: self.facility.location(),
            fleet:    &self.fleet,
            pricing:  &self.pricing,
            tuning:   &self.tuning,
        };

        let mut pool = self.eligible_pool(farms, day);
        log::debug!("day={day} planner: {} eligible farms", pool.len());

        let mut routes = Vec::new();
        let mut pigs_processed: u32 = 0;
        let mut revenue = 0.0;
        let mut variable_cost = 0.0;
        let mut fixed_cost = 0.0;

        while pigs_processed < capacity && !pool.is_empty() {
            let Some(route) = builder.build(farms, &mut pool, day, rng) else {
                break;
            };
            pigs_processed += route.pig_count;
            revenue += route.revenue;
            variable_cost += route.variable_cost;
            fixed_cost += route.truck.weekly_fixed_cost / self.tuning.operating_days_per_week;
            routes.push(route);
        }

        let net_profit = revenue - variable_cost - fixed_cost;
        log::info!(
            "day={day} planner: {} routes, {pigs_processed}/{capacity} pigs, profit {net_profit:.2}",
            routes.len()
        );

        let summary = DailySummary {
            day,
            pigs_processed,
            trucks_used: routes.len(),
            net_revenue: round2(revenue),
            variable_transport_cost: round2(variable_cost),
            fixed_cost: round2(fixed_cost),
            net_profit: round2(net_profit),
        };

        DailyPlan { day, routes, summary }
    }

    pub fn facility_metrics(&self, plan: &DailyPlan) -> FacilityMetrics {
        let delivered = plan.pigs_planned();
        let live: f64 = plan.routes.iter().map(|r| r.payload_kg).sum();
        let carcass = live * self.tuning.carcass_yield;
        let per_pig = |total: f64| if delivered > 0 { total / delivered as f64 } else { 0.0 };

        FacilityMetrics {
            pigs_delivered:       delivered,
            live_weight_total:    round2(live),
            carcass_weight_total: round2(carcass),
            avg_live_weight:      round2(per_pig(live)),
            avg_carcass_weight:   round2(per_pig(carcass)),
            capacity_utilization: round2(delivered as f64 / self.facility.daily_capacity_max as f64),
        }
    }

    pub fn truck_metrics(&self, plan: &DailyPlan) -> Vec<TruckMetrics> {
        plan.routes
            .iter()
            .enumerate()
            .map(|(i, route)| TruckMetrics {
                truck_id:        DailyPlan::truck_label(i + 1, route),
                load_kg:         round2(route.payload_kg),
                num_pigs:        route.pig_count,
                avg_live_weight: round2(route.avg_weight()),
                farms_visited:   route.stops.len(),
            })
            .collect()
    }
}
