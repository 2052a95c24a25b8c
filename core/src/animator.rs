//! Replay of a finished day plan as a paced event stream.
//!
//! Routes are replayed in waves. Every route of a wave runs on its own
//! scoped thread; the wave is joined before the next one starts. A
//! replay thread only ever sees a frozen `Route`, never a farm.
//!
//! FAILURE POLICY: the first sink error raises a shared abort flag.
//! The other threads of the wave stop before their next event or
//! pause, the wave is joined, and no further wave starts.

use crate::{
    clock::SimClock,
    config::AnimationConfig,
    error::{SimError, SimResult, SinkError},
    event::{SimEvent, TripMetrics, TruckStatus},
    planner::DailyPlan,
    route::Route,
    sink::EventSink,
    types::{round2, Day, GeoPoint},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Delays actually slept, after the clock's speed is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    pub steps: usize,
    pub step_delay: Duration,
    pub load_pause: Duration,
    pub wave_pause: Duration,
}

impl Pacing {
    pub fn new(config: &AnimationConfig, clock: &SimClock) -> Self {
        Self {
            steps:      config.steps.max(1),
            step_delay: clock.pace(config.step_delay()),
            load_pause: clock.pace(config.load_pause()),
            wave_pause: clock.pace(config.wave_pause()),
        }
    }

    pub fn instant(steps: usize) -> Self {
        Self {
            steps:      steps.max(1),
            step_delay: Duration::ZERO,
            load_pause: Duration::ZERO,
            wave_pause: Duration::ZERO,
        }
    }
}

/// Why a replay thread stopped early.
enum Stop {
    Aborted,
    Sink(SinkError),
}

pub struct Animator<'a> {
    pub facility: GeoPoint,
    pub pacing: Pacing,
    pub wave_size: usize,
    pub sink: &'a dyn EventSink,
}

impl<'a> Animator<'a> {
    /// Replay every route of `plan`, wave by wave.
    pub fn replay(&self, plan: &DailyPlan) -> SimResult<()> {
        let day = plan.day;
        let wave_size = self.wave_size.max(1);
        let mut launched = 0usize;

        for (wave_index, wave) in plan.routes.chunks(wave_size).enumerate() {
            log::info!(
                "day={day} animator: wave {} with {} trucks",
                wave_index + 1,
                wave.len()
            );

            let abort = AtomicBool::new(false);
            let outcomes: Vec<thread::Result<Result<(), Stop>>> = thread::scope(|scope| {
                let handles: Vec<_> = wave
                    .iter()
                    .enumerate()
                    .map(|(i, route)| {
                        let label = DailyPlan::truck_label(launched + i + 1, route);
                        let abort = &abort;
                        scope.spawn(move || self.replay_route(route, &label, abort))
                    })
                    .collect();
                handles.into_iter().map(|h| h.join()).collect()
            });
            launched += wave.len();

            self.settle_wave(day, outcomes)?;
            sleep(self.pacing.wave_pause);
        }

        Ok(())
    }

    /// Turn a joined wave into the day's result. A panic outranks a
    /// sink error; sibling aborts carry no error of their own.
    fn settle_wave(&self, day: Day, outcomes: Vec<thread::Result<Result<(), Stop>>>) -> SimResult<()> {
        let mut sink_error = None;
        for outcome in outcomes {
            match outcome {
                Err(panic) => {
                    let msg = panic
                        .downcast_ref::<String>()
                        .cloned()
                        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
                        .unwrap_or_else(|| "replay thread panicked".into());
                    return Err(SimError::InvariantViolation(msg));
                }
                Ok(Err(Stop::Sink(e))) => {
                    sink_error.get_or_insert(e);
                }
                Ok(Err(Stop::Aborted)) | Ok(Ok(())) => {}
            }
        }

        match sink_error {
            Some(source) => {
                log::warn!("day={day} animator: sink failed, abandoning replay: {source}");
                Err(SimError::SinkUnavailable { day, source })
            }
            None => Ok(()),
        }
    }

    fn replay_route(&self, route: &Route, truck_id: &str, abort: &AtomicBool) -> Result<(), Stop> {
        let mut here = self.facility;
        let mut on_board = 0u32;

        for stop in &route.stops {
            self.drive(truck_id, here, stop.location, on_board, TruckStatus::MovingToFarm, abort)?;

            on_board += stop.picked_up;
            self.emit(abort, SimEvent::TruckUpdate {
                truck_id:      truck_id.to_string(),
                position:      [stop.location.lat, stop.location.lon],
                pigs_on_board: on_board,
                status:        TruckStatus::Loaded,
            })?;
            here = stop.location;

            self.emit(abort, SimEvent::FarmUpdate {
                farm_id:         stop.farm_id.clone(),
                farm_name:       stop.farm_name.clone(),
                new_inventory:   stop.inventory_after,
                num_pigs_loaded: stop.picked_up,
                avg_weight:      stop.avg_weight,
            })?;
            self.pause(self.pacing.load_pause, abort)?;
        }

        self.drive(truck_id, here, self.facility, on_board, TruckStatus::Returning, abort)?;

        self.emit(abort, SimEvent::TruckArrived {
            truck_id:       truck_id.to_string(),
            pigs_delivered: route.pig_count,
            metrics_trip:   TripMetrics {
                revenue: round2(route.revenue),
                cost:    round2(route.variable_cost),
            },
        })
    }

    /// `steps` evenly spaced positions from `from` to `to`, both ends
    /// included.
    fn drive(
        &self,
        truck_id: &str,
        from: GeoPoint,
        to: GeoPoint,
        on_board: u32,
        status: TruckStatus,
        abort: &AtomicBool,
    ) -> Result<(), Stop> {
        let steps = self.pacing.steps;
        for i in 0..steps {
            let t = if steps > 1 { i as f64 / (steps - 1) as f64 } else { 0.0 };
            let at = from.lerp(&to, t);
            self.emit(abort, SimEvent::TruckUpdate {
                truck_id:      truck_id.to_string(),
                position:      [at.lat, at.lon],
                pigs_on_board: on_board,
                status,
            })?;
            self.pause(self.pacing.step_delay, abort)?;
        }
        Ok(())
    }

    fn emit(&self, abort: &AtomicBool, event: SimEvent) -> Result<(), Stop> {
        if abort.load(Ordering::SeqCst) {
            return Err(Stop::Aborted);
        }
        self.sink.emit(&event).map_err(|e| {
            abort.store(true, Ordering::SeqCst);
            Stop::Sink(e)
        })
    }

    fn pause(&self, delay: Duration, abort: &AtomicBool) -> Result<(), Stop> {
        if abort.load(Ordering::SeqCst) {
            return Err(Stop::Aborted);
        }
        sleep(delay);
        Ok(())
    }
}

fn sleep(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
