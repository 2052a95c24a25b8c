//! Daily livestock-collection logistics simulator.
//!
//! One facility processes a fixed number of animals per day. A greedy
//! planner loads trucks from the heaviest eligible farms.
//! Each day is planned in full, then replayed as an event stream.

pub mod animator;
pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod farm;
pub mod fleet;
pub mod planner;
pub mod pricing;
pub mod rng;
pub mod route;
pub mod sink;
pub mod store;
pub mod types;

pub use engine::{DayReport, SimSession};
pub use error::{SimError, SimResult, SinkError};
pub use event::SimEvent;
pub use sink::{EventSink, JsonLinesSink, MemorySink, StoreSink};
