//! The event stream: everything the observer ever sees.
//!
//! RULE: Each event is complete on its own. A sink writes one event
//! as one record; concurrent writers never interleave inside a record.

use crate::{
    config::OperatingLoad,
    farm::FarmSnapshot,
    planner::{FacilityMetrics, TruckMetrics},
    types::{Day, FarmId},
};
use serde::{Deserialize, Serialize};

/// Variants are added over time, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimEvent {
    // ── Day start ──────────────────────────────────
    InitFarms {
        day: Day,
        farms: Vec<FarmSnapshot>,
        slaughterhouse: [f64; 2],
        #[serde(default, skip_serializing_if = "Option::is_none")]
        facility_load: Option<OperatingLoad>,
    },

    // ── Replay ─────────────────────────────────────
    TruckUpdate {
        truck_id: String,
        position: [f64; 2],
        pigs_on_board: u32,
        status: TruckStatus,
    },
    FarmUpdate {
        farm_id: FarmId,
        farm_name: String,
        new_inventory: u32,
        num_pigs_loaded: u32,
        avg_weight: f64,
    },
    TruckArrived {
        truck_id: String,
        pigs_delivered: u32,
        metrics_trip: TripMetrics,
    },

    // ── Day end ────────────────────────────────────
    SlaughterhouseUpdate {
        metrics: FacilityMetrics,
    },
    TrucksUpdate {
        trucks: Vec<TruckMetrics>,
    },
    DailySummary {
        summary: crate::planner::DailySummary,
        cumulative_profit: f64,
    },
    EndOfDay {
        day: Day,
        msg: String,
    },
    SimulationComplete {
        day: Day,
        msg: String,
    },

    // ── Failure ────────────────────────────────────
    Error {
        msg: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TruckStatus {
    MovingToFarm,
    Loaded,
    Returning,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripMetrics {
    pub revenue: f64,
    pub cost: f64,
}

impl SimEvent {
    /// Stable name of the variant, matching its serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            SimEvent::InitFarms { .. }            => "INIT_FARMS",
            SimEvent::TruckUpdate { .. }          => "TRUCK_UPDATE",
            SimEvent::FarmUpdate { .. }           => "FARM_UPDATE",
            SimEvent::TruckArrived { .. }         => "TRUCK_ARRIVED",
            SimEvent::SlaughterhouseUpdate { .. } => "SLAUGHTERHOUSE_UPDATE",
            SimEvent::TrucksUpdate { .. }         => "TRUCKS_UPDATE",
            SimEvent::DailySummary { .. }         => "DAILY_SUMMARY",
            SimEvent::EndOfDay { .. }             => "END_OF_DAY",
            SimEvent::SimulationComplete { .. }   => "SIMULATION_COMPLETE",
            SimEvent::Error { .. }                => "ERROR",
        }
    }

    /// Truck the event belongs to, for replay events.
    pub fn truck_id(&self) -> Option<&str> {
        match self {
            SimEvent::TruckUpdate { truck_id, .. } | SimEvent::TruckArrived { truck_id, .. } => {
                Some(truck_id)
            }
            _ => None,
        }
    }
}

/// A sink record as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: String,
    pub day: Day,
    pub seq: i64,
    pub event_type: String,
    pub payload: String, // JSON-serialized SimEvent
}
