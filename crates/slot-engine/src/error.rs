//! Error types for slot-engine operations.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid time window: {0}")]
    InvalidWindow(String),

    #[error("Malformed entry '{input}': {reason}")]
    MalformedEntry { input: String, reason: String },

    #[error("Unknown day filter: {0}")]
    UnknownDayFilter(String),

    #[error("Invalid busy interval: end {end} is before start {start}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl ScheduleError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        ScheduleError::MalformedEntry {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
