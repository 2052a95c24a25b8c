use serde::{Deserialize, Serialize};
use crate::clock::SimSpeed;

/// Commands a caller can issue to a running session, one JSON
/// object per line in the runner's IPC mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum SessionCommand {
    // ── Lifecycle ─────────────────────────────────
    Step {
        #[serde(default = "one_day")]
        days: u32,
    },
    RunToEnd,
    Reset,

    // ── Clock control ─────────────────────────────
    SetSpeed { speed: SimSpeed },

    // ── Queries ───────────────────────────────────
    GetState,
    Quit,
}

fn one_day() -> u32 { 1 }
