use thiserror::Error;

/// Result type used across the tracker.
pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// Setup or day input that fails the numeric checks of the form
    #[error("invalid input: {0}")]
    Validation(String),

    /// A day row that does not exist in the current session
    #[error("day {day} is outside 1..={total_days}")]
    DayOutOfRange { day: u32, total_days: u32 },

    #[error("no calculation has been started")]
    NotStarted,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
