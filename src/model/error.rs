use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Failures raised by the timeline model: geometry, date ranges and task lookups.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    #[error("invalid geometry: container height must be positive, got {height}")]
    InvalidGeometry { height: f64 },

    #[error("invalid pointer offset: {offset} does not map to a date")]
    InvalidOffset { offset: f64 },

    #[error("invalid window: {start} must be before {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("invalid interval: end date {end} is before start date {start}")]
    InvalidInterval { start: NaiveDate, end: NaiveDate },

    #[error("task title cannot be empty")]
    EmptyTitle,

    #[error("task not found: {0}")]
    TaskNotFound(Uuid),
}
