//! Simulation clock. Owns the day index, the run horizon and the
//! replay tempo.

use crate::types::Day;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    /// The next day to simulate.
    pub current_day: Day,
    /// Last day of the run.
    pub horizon: Day,
    pub speed: SimSpeed,
}

impl SimClock {
    pub fn new(horizon: Day) -> Self {
        Self {
            current_day: 1,
            horizon,
            speed: SimSpeed::Normal,
        }
    }

    /// True once every day up to the horizon has run.
    pub fn is_complete(&self) -> bool {
        self.current_day > self.horizon
    }

    /// Finish the current day. Returns the new day index.
    pub fn advance(&mut self) -> Day {
        self.current_day += 1;
        self.current_day
    }

    pub fn days_completed(&self) -> Day {
        (self.current_day - 1).clamp(0, self.horizon)
    }

    /// Back to day 1. Speed is kept.
    pub fn reset(&mut self) {
        self.current_day = 1;
    }

    pub fn set_speed(&mut self, speed: SimSpeed) {
        self.speed = speed;
    }

    /// A configured replay delay at the current speed.
    pub fn pace(&self, delay: Duration) -> Duration {
        match self.speed {
            SimSpeed::Normal      => delay,
            SimSpeed::Accelerated => delay / 4,
            SimSpeed::FastForward => Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SimSpeed {
    Normal,       // configured delays
    Accelerated,  // a quarter of each delay
    FastForward,  // no delays
}

impl std::str::FromStr for SimSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal"       => Ok(Self::Normal),
            "accelerated"  => Ok(Self::Accelerated),
            "fast_forward" => Ok(Self::FastForward),
            other          => Err(format!("unknown speed: {other}")),
        }
    }
}
