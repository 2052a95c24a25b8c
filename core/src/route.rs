//! Route builder. Fills one truck from the day's eligible pool.
//!
//! The pool holds farm indices sorted heaviest mean weight first. Each
//! farm taken from the pool is either visited or skipped for the rest
//! of the day; it is never put back.

use crate::{
    config::SimTuning,
    farm::Farm,
    fleet::{FleetSelector, TruckProfile},
    pricing::PricingEngine,
    rng::SubsystemRng,
    types::{round2, Day, FarmId, GeoPoint},
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One farm visit, frozen at planning time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub farm_id: FarmId,
    pub farm_name: String,
    pub location: GeoPoint,
    pub picked_up: u32,
    pub weights: Vec<f64>,
    pub total_weight: f64,
    pub inventory_after: u32,
    pub avg_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub stops: Vec<RouteStop>,
    pub pig_count: u32,
    pub payload_kg: f64,
    pub truck: TruckProfile,
    pub distance_km: f64,
    pub variable_cost: f64,
    pub revenue: f64,
    pub penalty_total: f64,
    pub penalty_ratio: f64,
}

impl Route {
    pub fn avg_weight(&self) -> f64 {
        if self.pig_count == 0 { 0.0 } else { self.payload_kg / self.pig_count as f64 }
    }
}

/// facility → stops in order → facility.
pub fn route_distance_km(facility: GeoPoint, stops: &[RouteStop]) -> f64 {
    let mut distance = 0.0;
    let mut here = facility;
    for stop in stops {
        distance += here.distance_km(&stop.location);
        here = stop.location;
    }
    if !stops.is_empty() {
        distance += here.distance_km(&facility);
    }
    distance
}

pub struct RouteBuilder<'a> {
    pub facility: GeoPoint,
    pub fleet: &'a FleetSelector,
    pub pricing: &'a PricingEngine,
    pub tuning: &'a SimTuning,
}

impl<'a> RouteBuilder<'a> {
    /// Build one route, consuming farms from `pool`.
    ///
    /// Returns `None` when no stop could be made; the pool has nothing
    /// left that fits and the day's planning is over.
    pub fn build(
        &self,
        farms: &mut [Farm],
        pool: &mut VecDeque<usize>,
        day: Day,
        rng: &mut SubsystemRng,
    ) -> Option<Route> {
        let ceiling = self.tuning.planning_capacity_kg;
        let mut payload_kg = 0.0;
        let mut stops: Vec<RouteStop> = Vec::new();

        while stops.len() < self.tuning.max_stops_per_route && payload_kg < ceiling {
            let Some(index) = pool.pop_front() else { break };
            let farm = &mut farms[index];

            let offer = farm.offer(ceiling - payload_kg, rng, self.tuning.clamp_negative_weights);
            if offer.is_empty() {
                log::debug!("day={day} route: farm {} skipped, nothing fits", farm.id);
                continue;
            }

            farm.commit(offer.count);
            farm.last_visit_day = day;

            let avg_weight = round2(offer.total_weight / offer.count as f64);
            stops.push(RouteStop {
                farm_id:         farm.id.clone(),
                farm_name:       farm.name.clone(),
                location:        farm.location,
                picked_up:       offer.count,
                total_weight:    offer.total_weight,
                inventory_after: farm.inventory(),
                avg_weight,
                weights:         offer.weights,
            });
            payload_kg += offer.total_weight;
        }

        if stops.is_empty() {
            return None;
        }

        let pig_count = stops.iter().map(|s| s.picked_up).sum();
        let distance_km = route_distance_km(self.facility, &stops);
        let truck = self.fleet.select(payload_kg);
        let variable_cost = distance_km * truck.cost_per_km;

        let weights: Vec<f64> = stops.iter().flat_map(|s| s.weights.iter().copied()).collect();
        let price = self.pricing.price(&weights);

        log::debug!(
            "day={day} route: {} stops, {pig_count} pigs, {payload_kg:.0} kg, truck {} ({:.1} km)",
            stops.len(),
            truck.id,
            distance_km
        );

        Some(Route {
            stops,
            pig_count,
            payload_kg,
            truck,
            distance_km,
            variable_cost,
            revenue: price.revenue,
            penalty_total: price.penalty_total,
            penalty_ratio: price.penalty_ratio,
        })
    }
}
