//! Structural integrity checks for schedules.
//!
//! Checks the input before the engine reasons about it. Detects:
//! - Duplicate employee or shift IDs
//! - Assignments or constraints referencing unknown employees
//! - Duplicate assignees and over-capacity shifts
//! - Inverted shift times and inconsistent headcounts
//! - Daily hour limits above weekly limits

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::Schedule;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A structural problem in a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of structural problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// An assignment or constraint names an employee that doesn't exist.
    UnknownEmployee,
    /// An employee appears twice in one shift.
    DuplicateAssignment,
    /// A shift has more assignees than `max_employees`.
    OverCapacity,
    /// A shift ends before it starts.
    InvertedShiftTimes,
    /// `required_employees` exceeds `max_employees`.
    InconsistentHeadcount,
    /// `max_hours_per_day` exceeds `max_hours_per_week`.
    InconsistentHourLimits,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the structure of a schedule.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(schedule: &Schedule) -> ValidationResult {
    let mut errors = Vec::new();

    let mut employee_ids = HashSet::new();
    for e in &schedule.employees {
        if !employee_ids.insert(e.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate employee ID: {}", e.id),
            ));
        }
        if e.max_hours_per_day > e.max_hours_per_week {
            errors.push(ValidationError::new(
                ValidationErrorKind::InconsistentHourLimits,
                format!(
                    "Employee '{}' allows {}h/day but only {}h/week",
                    e.id, e.max_hours_per_day, e.max_hours_per_week
                ),
            ));
        }
    }

    let mut shift_ids = HashSet::new();
    for shift in &schedule.shifts {
        if !shift_ids.insert(shift.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate shift ID: {}", shift.id),
            ));
        }

        if shift.end_time < shift.start_time {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvertedShiftTimes,
                format!(
                    "Shift '{}' ends ({}) before it starts ({})",
                    shift.id, shift.end_time, shift.start_time
                ),
            ));
        }

        if shift.required_employees > shift.max_employees {
            errors.push(ValidationError::new(
                ValidationErrorKind::InconsistentHeadcount,
                format!(
                    "Shift '{}' requires {} employees but allows only {}",
                    shift.id, shift.required_employees, shift.max_employees
                ),
            ));
        }

        if shift.assigned_employees.len() > shift.max_employees {
            errors.push(ValidationError::new(
                ValidationErrorKind::OverCapacity,
                format!(
                    "Shift '{}' has {} assignees (capacity {})",
                    shift.id,
                    shift.assigned_employees.len(),
                    shift.max_employees
                ),
            ));
        }

        let mut seen = HashSet::new();
        for employee_id in &shift.assigned_employees {
            if !seen.insert(employee_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateAssignment,
                    format!(
                        "Employee '{}' is assigned twice to shift '{}'",
                        employee_id, shift.id
                    ),
                ));
            }
            if !employee_ids.contains(employee_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownEmployee,
                    format!(
                        "Shift '{}' references unknown employee '{}'",
                        shift.id, employee_id
                    ),
                ));
            }
        }
    }

    for constraint in &schedule.constraints {
        if !employee_ids.contains(constraint.employee_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownEmployee,
                format!(
                    "{:?} constraint references unknown employee '{}'",
                    constraint.constraint_type, constraint.employee_id
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
