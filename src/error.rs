//! Error types.
//!
//! Constraint violations are not errors: they are reported as
//! [`Violation`](crate::validation::Violation) data. `ScheduleError` covers
//! lookups and mutations that reference something that is not there.

use thiserror::Error;

/// Error for schedule lookups and mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// Referenced employee is not part of the schedule.
    #[error("employee '{0}' not found")]
    EmployeeNotFound(String),

    /// Referenced shift is not part of the schedule.
    #[error("shift '{0}' not found")]
    ShiftNotFound(String),

    /// An entity with the same ID already exists.
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    /// The employee is not assigned to the shift.
    #[error("employee '{employee_id}' is not assigned to shift '{shift_id}'")]
    NotAssigned {
        employee_id: String,
        shift_id: String,
    },
}

/// Result alias for schedule operations.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Error for invalid engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A scoring weight is negative or not finite.
    #[error("weight '{name}' must be a finite non-negative number, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    /// Scoring weights add up to more than 1.
    #[error("scoring weights sum to {0}, which exceeds 1.0")]
    WeightsExceedOne(f64),

    /// A tuning parameter is out of range.
    #[error("parameter '{name}' is out of range: {reason}")]
    OutOfRange { name: &'static str, reason: String },

    /// The configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
