//! SQLite persistence of the current run's event log.
//!
//! RULE: Only store.rs talks to the database.

use rusqlite::{params, Connection};
use crate::{
    error::SimResult,
    event::EventLogEntry,
    types::Day,
};

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database.
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn.execute_batch(include_str!("../migrations/001_event_log.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: u64, version: &str) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, started_at) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, seed as i64, version, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (run_id, day, seq, event_type, payload, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.run_id,
                entry.day,
                entry.seq,
                entry.event_type,
                entry.payload,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn events_for_day(&self, run_id: &str, day: Day) -> SimResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, day, seq, event_type, payload
             FROM event_log WHERE run_id = ?1 AND day = ?2
             ORDER BY seq ASC"
        )?;
        let entries = stmt.query_map(params![run_id, day], |row| {
            Ok(EventLogEntry {
                id:         Some(row.get(0)?),
                run_id:     row.get(1)?,
                day:        row.get(2)?,
                seq:        row.get(3)?,
                event_type: row.get(4)?,
                payload:    row.get(5)?,
            })
        })?.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, run_id: &str, event_type: Option<&str>) -> SimResult<i64> {
        let count = match event_type {
            Some(kind) => self.conn.query_row(
                "SELECT COUNT(*) FROM event_log WHERE run_id = ?1 AND event_type = ?2",
                params![run_id, kind],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT COUNT(*) FROM event_log WHERE run_id = ?1",
                params![run_id],
                |row| row.get(0),
            )?,
        };
        Ok(count)
    }
}
