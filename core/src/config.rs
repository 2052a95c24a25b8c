//! Master data and tuning.
//!
//! Catalog files are read from a data directory. Every file except
//! the farm catalog is optional: a missing facility file falls back
//! to the built-in facility, a missing truck file to an empty catalog
//! (the fleet selector then synthesizes its default truck).

use crate::{
    error::{SimError, SimResult},
    pricing::PenaltySchedule,
    types::{round2, GeoPoint},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const FARMS_FILE: &str = "farms.json";
pub const FACILITY_FILE: &str = "slaughterhouses.json";
pub const TRUCKS_FILE: &str = "transports.json";
pub const TUNING_FILE: &str = "tuning.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmRecord {
    pub farm_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub total_pigs: u32,
    pub mean_weight_kg: f64,
    #[serde(default)]
    pub std_weight_kg: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityConfig {
    #[serde(default = "default_facility_name")]
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub daily_capacity_max: u32,
    /// Lower end of the operating range, for the load indicator.
    #[serde(default)]
    pub daily_capacity_min: u32,
    /// Planned daily intake. Without it no load indicator is reported.
    #[serde(default)]
    pub target_daily: Option<u32>,
    /// `[low_start, low_end, high_start, high_end]` of the 15% bands.
    #[serde(default = "default_penalty_15_range")]
    pub penalty_15_range: [f64; 4],
    #[serde(default = "default_penalty_20_below")]
    pub penalty_20_below: f64,
    #[serde(default = "default_penalty_20_above")]
    pub penalty_20_above: f64,
}

fn default_facility_name() -> String { "Slaughterhouse".into() }
fn default_penalty_15_range() -> [f64; 4] { [100.0, 105.0, 115.0, 120.0] }
fn default_penalty_20_below() -> f64 { 100.0 }
fn default_penalty_20_above() -> f64 { 120.0 }

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            name:               default_facility_name(),
            lat:                41.98,
            lon:                2.80,
            daily_capacity_max: 1800,
            daily_capacity_min: 0,
            target_daily:       None,
            penalty_15_range:   default_penalty_15_range(),
            penalty_20_below:   default_penalty_20_below(),
            penalty_20_above:   default_penalty_20_above(),
        }
    }
}

impl FacilityConfig {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    /// Where the planned intake sits in `[min, max]`, as a percentage.
    /// `None` without a target or with an empty range.
    pub fn operating_load(&self) -> Option<OperatingLoad> {
        let target = self.target_daily?;
        if self.daily_capacity_max <= self.daily_capacity_min {
            return None;
        }
        let span = (self.daily_capacity_max - self.daily_capacity_min) as f64;
        let percent = 100.0 * (target as f64 - self.daily_capacity_min as f64) / span;
        Some(OperatingLoad { percent: round2(percent), level: LoadLevel::from_percent(percent) })
    }

    pub fn penalty_schedule(&self) -> PenaltySchedule {
        let [low_start, low_end, high_start, high_end] = self.penalty_15_range;
        PenaltySchedule {
            low_band_start:  low_start,
            low_band_end:    low_end,
            high_band_start: high_start,
            high_band_end:   high_end,
            hard_low:        self.penalty_20_below,
            hard_high:       self.penalty_20_above,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadLevel {
    Low,       // <= 50%
    Moderate,
    High,      // >= 90%
}

impl LoadLevel {
    pub fn from_percent(percent: f64) -> Self {
        if percent <= 50.0 {
            Self::Low
        } else if percent >= 90.0 {
            Self::High
        } else {
            Self::Moderate
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingLoad {
    pub percent: f64,
    pub level: LoadLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruckRecord {
    pub transport_id: String,
    #[serde(rename = "type")]
    pub class: String,
    pub capacity_tons: f64,
    pub cost_per_km: f64,
    pub weekly_fixed_cost: f64,
}

/// Pacing of the event replay. Zero durations replay instantly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Interpolated positions per leg, both endpoints included.
    pub steps: usize,
    pub step_delay_ms: u64,
    pub load_pause_ms: u64,
    pub wave_pause_ms: u64,
    /// Pause the runner inserts between simulated days.
    pub day_pause_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            steps:         20,
            step_delay_ms: 50,
            load_pause_ms: 200,
            wave_pause_ms: 500,
            day_pause_ms:  2000,
        }
    }
}

impl AnimationConfig {
    pub fn instant() -> Self {
        Self {
            step_delay_ms: 0,
            load_pause_ms: 0,
            wave_pause_ms: 0,
            day_pause_ms:  0,
            ..Self::default()
        }
    }

    pub fn step_delay(&self) -> Duration { Duration::from_millis(self.step_delay_ms) }
    pub fn load_pause(&self) -> Duration { Duration::from_millis(self.load_pause_ms) }
    pub fn wave_pause(&self) -> Duration { Duration::from_millis(self.wave_pause_ms) }
    pub fn day_pause(&self)  -> Duration { Duration::from_millis(self.day_pause_ms) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimTuning {
    pub price_per_kg: f64,
    pub daily_growth_kg: f64,
    /// Last simulated day of a run.
    pub horizon_days: i64,
    pub revisit_cooldown_days: i64,
    pub max_stops_per_route: usize,
    /// Working truck capacity used while filling a route, before the
    /// final truck is chosen on actual payload.
    pub planning_capacity_kg: f64,
    /// Weekly fixed truck cost is spread over this many operating days.
    pub operating_days_per_week: f64,
    pub carcass_yield: f64,
    /// Wave size when the catalog has no standard-class trucks.
    pub default_wave_size: usize,
    /// Std-dev as a fraction of mean when a farm record omits it.
    pub default_std_fraction: f64,
    pub clamp_negative_weights: bool,
    pub animation: AnimationConfig,
}

impl Default for SimTuning {
    fn default() -> Self {
        Self {
            price_per_kg:            1.56,
            daily_growth_kg:         0.71,
            horizon_days:            15,
            revisit_cooldown_days:   7,
            max_stops_per_route:     3,
            planning_capacity_kg:    20_000.0,
            operating_days_per_week: 5.0,
            carcass_yield:           0.75,
            default_wave_size:       3,
            default_std_fraction:    0.05,
            clamp_negative_weights:  false,
            animation:               AnimationConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub farms: Vec<FarmRecord>,
    pub facility: FacilityConfig,
    pub trucks: Vec<TruckRecord>,
    pub tuning: SimTuning,
}

impl SimConfig {
    /// Load from a data directory.
    /// In tests, use SimConfig::default_test().
    pub fn load(data_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = data_dir.as_ref();

        let farms: Vec<FarmRecord> = read_json(&dir.join(FARMS_FILE))?.unwrap_or_else(|| {
            log::warn!("config: no farm catalog in {}", dir.display());
            Vec::new()
        });

        let facility = match read_json::<Vec<FacilityConfig>>(&dir.join(FACILITY_FILE))? {
            Some(list) if !list.is_empty() => list.into_iter().next().unwrap_or_default(),
            _ => {
                log::warn!("config: no facility catalog, using built-in facility");
                FacilityConfig::default()
            }
        };

        let trucks: Vec<TruckRecord> = read_json(&dir.join(TRUCKS_FILE))?.unwrap_or_else(|| {
            log::warn!("config: no truck catalog, default truck will be synthesized");
            Vec::new()
        });

        let tuning: SimTuning = read_json(&dir.join(TUNING_FILE))?.unwrap_or_default();

        log::info!(
            "config: facility '{}' cap={} farms={} trucks={}",
            facility.name,
            facility.daily_capacity_max,
            farms.len(),
            trucks.len()
        );

        Ok(Self { farms, facility, trucks, tuning })
    }

    /// Built-in facility and tuning around a given farm catalog.
    pub fn with_farms(farms: Vec<FarmRecord>) -> Self {
        Self {
            farms,
            facility: FacilityConfig::default(),
            trucks: Vec::new(),
            tuning: SimTuning::default(),
        }
    }

    /// Reject master data a run cannot start from.
    pub fn validate(&self) -> SimResult<()> {
        if self.farms.is_empty() {
            return Err(SimError::Configuration("no farm data loaded".into()));
        }
        if self.facility.daily_capacity_max == 0 {
            return Err(SimError::Configuration(format!(
                "facility '{}' has no daily capacity",
                self.facility.name
            )));
        }
        if let Some(farm) = self.farms.iter().find(|f| !f.mean_weight_kg.is_finite()) {
            return Err(SimError::Configuration(format!(
                "farm {} has a non-finite mean weight",
                farm.farm_id
            )));
        }
        if self.tuning.max_stops_per_route == 0 || self.tuning.animation.steps == 0 {
            return Err(SimError::Configuration(
                "max_stops_per_route and animation.steps must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Config with hardcoded defaults for use in unit tests.
    /// Animation runs with zero delays.
    pub fn default_test() -> Self {
        let farm = |id: &str, name: &str, lat: f64, lon: f64, pigs: u32, mean: f64| FarmRecord {
            farm_id:        id.into(),
            name:           name.into(),
            lat,
            lon,
            total_pigs:     pigs,
            mean_weight_kg: mean,
            std_weight_kg:  Some(mean * 0.05),
        };

        let farms = vec![
            farm("F001", "Mas Vilar",      41.93, 2.74, 600, 108.0),
            farm("F002", "Granja Puig",    42.05, 2.87, 450, 112.5),
            farm("F003", "Can Roca",       41.88, 2.95, 900,  96.0),
            farm("F004", "Mas de la Riba", 42.10, 2.70, 300, 117.0),
            farm("F005", "Les Feixes",     41.99, 2.62, 750, 103.0),
        ];

        let truck = |id: &str, class: &str, tons: f64, km: f64, weekly: f64| TruckRecord {
            transport_id:      id.into(),
            class:             class.into(),
            capacity_tons:     tons,
            cost_per_km:       km,
            weekly_fixed_cost: weekly,
        };

        let trucks = vec![
            truck("TR-S1", "normal", 10.0, 1.05, 1500.0),
            truck("TR-S2", "normal", 20.0, 1.25, 2000.0),
            truck("TR-L1", "large",  30.0, 1.60, 2800.0),
        ];

        Self {
            farms,
            facility: FacilityConfig::default(),
            trucks,
            tuning: SimTuning {
                animation: AnimationConfig::instant(),
                ..SimTuning::default()
            },
        }
    }
}

/// `Ok(None)` when the file does not exist.
fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
    let value = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))?;
    Ok(Some(value))
}
