//! Fleet selector. Picks the truck profile for a payload.

use crate::config::TruckRecord;
use serde::{Deserialize, Serialize};

/// Class tag of the trucks that bound the replay wave size.
pub const STANDARD_CLASS: &str = "normal";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckProfile {
    pub id: String,
    pub class: String,
    pub capacity_kg: f64,
    pub cost_per_km: f64,
    pub weekly_fixed_cost: f64,
}

impl TruckProfile {
    /// Synthesized when no catalog is configured.
    pub fn generic() -> Self {
        Self {
            id:                "Generic".into(),
            class:             STANDARD_CLASS.into(),
            capacity_kg:       20_000.0,
            cost_per_km:       1.25,
            weekly_fixed_cost: 2000.0,
        }
    }

    pub fn is_standard(&self) -> bool {
        self.class == STANDARD_CLASS
    }
}

impl From<&TruckRecord> for TruckProfile {
    fn from(record: &TruckRecord) -> Self {
        Self {
            id:                record.transport_id.clone(),
            class:             record.class.clone(),
            capacity_kg:       record.capacity_tons * 1000.0,
            cost_per_km:       record.cost_per_km,
            weekly_fixed_cost: record.weekly_fixed_cost,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FleetSelector {
    catalog: Vec<TruckProfile>,
}

impl FleetSelector {
    pub fn new(records: &[TruckRecord]) -> Self {
        Self { catalog: records.iter().map(TruckProfile::from).collect() }
    }

    /// Smallest profile able to carry `required_kg`. With nothing big
    /// enough, the largest profile is returned and overloaded. Ties go
    /// to the profile listed first.
    pub fn select(&self, required_kg: f64) -> TruckProfile {
        if self.catalog.is_empty() {
            return TruckProfile::generic();
        }

        let smallest_fit = self
            .catalog
            .iter()
            .filter(|t| t.capacity_kg >= required_kg)
            .fold(None::<&TruckProfile>, |best, t| match best {
                Some(b) if b.capacity_kg <= t.capacity_kg => Some(b),
                _ => Some(t),
            });

        let chosen = smallest_fit.unwrap_or_else(|| {
            self.catalog
                .iter()
                .fold(&self.catalog[0], |best, t| if t.capacity_kg > best.capacity_kg { t } else { best })
        });

        chosen.clone()
    }

    pub fn standard_count(&self) -> usize {
        self.catalog.iter().filter(|t| t.is_standard()).count()
    }

    /// Routes replayed concurrently per wave.
    pub fn wave_size(&self, fallback: usize) -> usize {
        match self.standard_count() {
            0 => fallback.max(1),
            n => n,
        }
    }
}
