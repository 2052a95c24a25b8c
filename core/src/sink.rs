//! Event sinks: where the stream goes.
//!
//! The core only needs "append one record, in order, possibly
//! failing". Sinks are shared by every replay thread of a wave, so
//! `emit` takes `&self` and each implementation serializes writes.

use crate::{
    error::SinkError,
    event::{EventLogEntry, SimEvent},
    store::SimStore,
    types::{Day, RunId},
};
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

pub trait EventSink: Send + Sync {
    /// Append one event. An error means the consumer is gone; callers
    /// stop emitting.
    fn emit(&self, event: &SimEvent) -> Result<(), SinkError>;
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: &SimEvent) -> Result<(), SinkError> {
        (**self).emit(event)
    }
}

impl<S: EventSink + ?Sized> EventSink for &S {
    fn emit(&self, event: &SimEvent) -> Result<(), SinkError> {
        (**self).emit(event)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, SinkError> {
    mutex.lock().map_err(|_| SinkError::Closed("sink lock poisoned".into()))
}

/// Collects events in memory. Used by tests and tooling.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<SimEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SimEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn take(&self) -> Vec<SimEvent> {
        self.events.lock().map(|mut e| std::mem::take(&mut *e)).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &SimEvent) -> Result<(), SinkError> {
        lock(&self.events)?.push(event.clone());
        Ok(())
    }
}

/// One JSON object per line, flushed per event.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: Mutex::new(writer) }
    }

    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|_| SinkError::Closed("sink lock poisoned".into()))
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn emit(&self, event: &SimEvent) -> Result<(), SinkError> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        let mut writer = lock(&self.writer)?;
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/// Appends events to the run's SQLite event log.
///
/// The day of each row is taken from the latest `InitFarms` event.
pub struct StoreSink {
    run_id: RunId,
    inner: Mutex<StoreSinkState>,
}

struct StoreSinkState {
    store: SimStore,
    day: Day,
    seq: i64,
}

impl StoreSink {
    pub fn new(run_id: RunId, store: SimStore) -> Self {
        Self {
            run_id,
            inner: Mutex::new(StoreSinkState { store, day: 0, seq: 0 }),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Run a read against the underlying store.
    pub fn with_store<T>(&self, f: impl FnOnce(&SimStore) -> T) -> Result<T, SinkError> {
        let state = lock(&self.inner)?;
        Ok(f(&state.store))
    }
}

impl EventSink for StoreSink {
    fn emit(&self, event: &SimEvent) -> Result<(), SinkError> {
        let mut state = lock(&self.inner)?;
        if let SimEvent::InitFarms { day, .. } = event {
            state.day = *day;
        }
        state.seq += 1;
        let entry = EventLogEntry {
            id:         None,
            run_id:     self.run_id.clone(),
            day:        state.day,
            seq:        state.seq,
            event_type: event.kind().to_string(),
            payload:    serde_json::to_string(event)?,
        };
        state
            .store
            .append_event(&entry)
            .map_err(|e| SinkError::Store(e.to_string()))
    }
}
