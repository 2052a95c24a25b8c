//! The simulation session: one run, owned by the caller.
//!
//! LIFECYCLE: `create` → `step` (once per day, until the horizon) →
//! `reset` to start over from the catalog. Nothing is global; two
//! sessions never share state.
//!
//! RULES:
//!   - All decisions for a day are made before any of it is emitted.
//!   - All randomness flows through the RngBank.
//!   - Planning effects on farms are durable even if the replay of the
//!     day fails; the failed day is recorded as abandoned and the
//!     daily log of earlier days is never touched.

use crate::{
    animator::{Animator, Pacing},
    config::SimConfig,
    clock::SimClock,
    error::{SimError, SimResult},
    event::SimEvent,
    farm::{Farm, FarmSnapshot},
    fleet::FleetSelector,
    planner::{DailyPlan, DailyPlanner, DailySummary, DayPhase, FacilityMetrics, TruckMetrics},
    rng::{RngBank, RngSlot},
    sink::EventSink,
    types::{round2, Day, RunId},
};

/// Everything a completed day reported.
#[derive(Debug, Clone, PartialEq)]
pub struct DayReport {
    pub summary: DailySummary,
    pub facility: FacilityMetrics,
    pub trucks: Vec<TruckMetrics>,
    pub cumulative_profit: f64,
    pub run_complete: bool,
}

pub struct SimSession {
    pub run_id: RunId,
    pub clock: SimClock,
    rng_bank: RngBank,
    config: SimConfig,
    planner: DailyPlanner,
    farms: Vec<Farm>,
    phase: DayPhase,
    daily_log: Vec<DailySummary>,
    plans: Vec<DailyPlan>,
    abandoned_days: Vec<Day>,
}

impl SimSession {
    /// Start a run from master data. Fails with a configuration error
    /// when the data cannot support a run.
    pub fn create(config: SimConfig, seed: u64) -> SimResult<Self> {
        config.validate()?;

        let fleet = FleetSelector::new(&config.trucks);
        let planner = DailyPlanner::new(config.facility.clone(), fleet, config.tuning.clone());
        let farms = build_farms(&config);
        let run_id = new_run_id(seed);

        log::info!(
            "session {run_id}: {} farms, {} trucks, horizon {} days",
            farms.len(),
            config.trucks.len(),
            config.tuning.horizon_days
        );

        Ok(Self {
            run_id,
            clock: SimClock::new(config.tuning.horizon_days),
            rng_bank: RngBank::new(seed),
            planner,
            farms,
            phase: DayPhase::Done,
            daily_log: Vec::new(),
            plans: Vec::new(),
            abandoned_days: Vec::new(),
            config,
        })
    }

    /// Start a fresh run: day 1, catalog inventories, empty logs.
    /// The seed and clock speed are kept.
    pub fn reset(&mut self) {
        self.farms = build_farms(&self.config);
        self.clock.reset();
        self.phase = DayPhase::Done;
        self.daily_log.clear();
        self.plans.clear();
        self.abandoned_days.clear();
        self.run_id = new_run_id(self.rng_bank.master_seed());
        log::info!("session {}: reset to day 1", self.run_id);
    }

    pub fn seed(&self) -> u64 { self.rng_bank.master_seed() }
    pub fn config(&self) -> &SimConfig { &self.config }
    pub fn farms(&self) -> &[Farm] { &self.farms }
    pub fn phase(&self) -> DayPhase { self.phase }
    pub fn daily_log(&self) -> &[DailySummary] { &self.daily_log }
    pub fn plans(&self) -> &[DailyPlan] { &self.plans }
    pub fn abandoned_days(&self) -> &[Day] { &self.abandoned_days }
    pub fn is_complete(&self) -> bool { self.clock.is_complete() }

    /// Sum of every reported daily profit of this run.
    pub fn cumulative_profit(&self) -> f64 {
        round2(self.daily_log.iter().map(|s| s.net_profit).sum())
    }

    pub fn farm_snapshots(&self) -> Vec<FarmSnapshot> {
        let band = self.planner.pricing.schedule.target_band();
        self.farms.iter().map(|f| f.snapshot(band)).collect()
    }

    /// Simulate the next day and stream it to `sink`.
    ///
    /// On a sink failure the day is abandoned: the clock still moves
    /// on, the farms keep what planning did to them, and the error is
    /// returned.
    pub fn step(&mut self, sink: &dyn EventSink) -> SimResult<DayReport> {
        if self.clock.is_complete() {
            return Err(SimError::RunComplete { last_day: self.clock.horizon });
        }

        let day = self.clock.current_day;
        match self.run_day(day, sink) {
            Ok(report) => Ok(report),
            Err(e) => {
                if self.clock.current_day == day {
                    self.clock.advance();
                }
                self.phase = DayPhase::Done;
                let summarized = self.daily_log.last().is_some_and(|s| s.day == day);
                if !summarized {
                    self.abandoned_days.push(day);
                }
                log::warn!("day={day} session: stream interrupted: {e}");
                Err(e)
            }
        }
    }

    /// Step until the horizon, pausing `day_pause` (scaled by the clock
    /// speed) between days.
    pub fn run_to_completion(&mut self, sink: &dyn EventSink) -> SimResult<Vec<DayReport>> {
        let day_pause = self.clock.pace(self.config.tuning.animation.day_pause());
        let mut reports = Vec::new();
        while !self.clock.is_complete() {
            let report = self.step(sink)?;
            let done = report.run_complete;
            reports.push(report);
            if !done && !day_pause.is_zero() {
                std::thread::sleep(day_pause);
            }
        }
        Ok(reports)
    }

    fn run_day(&mut self, day: Day, sink: &dyn EventSink) -> SimResult<DayReport> {
        log::info!("day={day} session: day started");

        self.phase = DayPhase::Growing;
        self.planner.grow(&mut self.farms);
        let facility = self.config.facility.location();
        emit(sink, day, SimEvent::InitFarms {
            day,
            farms: self.farm_snapshots(),
            slaughterhouse: [facility.lat, facility.lon],
            facility_load: self.config.facility.operating_load(),
        })?;

        self.phase = DayPhase::Planning;
        let mut rng = self.rng_bank.for_day(RngSlot::WeightSampling, day);
        let plan = self.planner.plan(&mut self.farms, day, &mut rng);

        self.phase = DayPhase::Executing;
        let animator = Animator {
            facility,
            pacing: Pacing::new(&self.config.tuning.animation, &self.clock),
            wave_size: self.planner.fleet.wave_size(self.config.tuning.default_wave_size),
            sink,
        };
        animator.replay(&plan)?;

        self.phase = DayPhase::Summarizing;
        let facility_metrics = self.planner.facility_metrics(&plan);
        let truck_metrics = self.planner.truck_metrics(&plan);
        self.daily_log.push(plan.summary.clone());
        let cumulative_profit = self.cumulative_profit();
        let summary = plan.summary.clone();
        self.plans.push(plan);

        emit(sink, day, SimEvent::SlaughterhouseUpdate { metrics: facility_metrics.clone() })?;
        emit(sink, day, SimEvent::TrucksUpdate { trucks: truck_metrics.clone() })?;
        emit(sink, day, SimEvent::DailySummary { summary: summary.clone(), cumulative_profit })?;

        self.phase = DayPhase::Done;
        self.clock.advance();
        let run_complete = self.clock.is_complete();
        let closing = if run_complete {
            SimEvent::SimulationComplete { day, msg: "Simulation finished.".into() }
        } else {
            SimEvent::EndOfDay { day, msg: "Waiting for next day...".into() }
        };
        emit(sink, day, closing)?;

        log::info!("day={day} session: profit {:.2}, cumulative {cumulative_profit:.2}", summary.net_profit);

        Ok(DayReport {
            summary,
            facility: facility_metrics,
            trucks: truck_metrics,
            cumulative_profit,
            run_complete,
        })
    }
}

/// Send an `Error` event for a run that cannot proceed.
pub fn report_error(sink: &dyn EventSink, error: &SimError) {
    if let Err(e) = sink.emit(&SimEvent::Error { msg: error.to_string() }) {
        log::warn!("could not report error to sink: {e}");
    }
}

fn emit(sink: &dyn EventSink, day: Day, event: SimEvent) -> SimResult<()> {
    sink.emit(&event)
        .map_err(|source| SimError::SinkUnavailable { day, source })
}

fn build_farms(config: &SimConfig) -> Vec<Farm> {
    config
        .farms
        .iter()
        .map(|r| Farm::from_record(r, config.tuning.default_std_fraction))
        .collect()
}

fn new_run_id(seed: u64) -> RunId {
    format!("run-{seed}-{}", uuid::Uuid::new_v4().simple())
}

