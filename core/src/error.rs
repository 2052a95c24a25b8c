use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Event sink unavailable on day {day}: {source}")]
    SinkUnavailable {
        day: i64,
        #[source]
        source: SinkError,
    },

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Simulation complete after day {last_day}; reset the session to start a new run")]
    RunComplete { last_day: i64 },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;

/// Failure to append one record to an event sink.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("sink closed: {0}")]
    Closed(String),

    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("sink store failed: {0}")]
    Store(String),
}
