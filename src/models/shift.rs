//! Shift model.
//!
//! A shift is a dated, timed unit of work that requires a role and a
//! headcount. Shifts start and end on the same calendar date.
//!
//! # Time Model
//! Times are wall-clock `NaiveTime` values on `date`; the interval is
//! half-open `[start, end)`, so back-to-back shifts do not overlap.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::Role;

/// Shift classification used for preference scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftType {
    Morning,
    Afternoon,
    Evening,
    Night,
    FullDay,
}

/// A unit of work to be staffed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    /// Unique shift identifier.
    pub id: String,
    /// Calendar date of the shift.
    pub date: NaiveDate,
    /// Start time (inclusive).
    pub start_time: NaiveTime,
    /// End time (exclusive).
    pub end_time: NaiveTime,
    /// Skill requirements.
    pub role: Role,
    /// Where the shift takes place.
    pub location: String,
    /// Owning department.
    pub department: String,
    /// Shift classification.
    pub shift_type: ShiftType,
    /// Minimum headcount for the shift to count as staffed.
    pub required_employees: usize,
    /// Capacity.
    pub max_employees: usize,
    /// Scheduling priority (higher = staffed first).
    pub priority: i32,
    /// Assigned employee IDs, in assignment order, without duplicates.
    pub assigned_employees: Vec<String>,
}

impl Shift {
    /// Creates a shift needing one employee.
    ///
    /// # Panics
    /// If `end_time` is before `start_time`.
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        let shift = Self {
            id: id.into(),
            date,
            start_time,
            end_time,
            role: Role::default(),
            location: String::new(),
            department: String::new(),
            shift_type: ShiftType::Morning,
            required_employees: 1,
            max_employees: 1,
            priority: 0,
            assigned_employees: Vec::new(),
        };
        // Rejects inverted times.
        let _ = shift.duration_hours();
        shift
    }

    /// Sets the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Sets the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Sets the department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    /// Sets the shift type.
    pub fn with_shift_type(mut self, shift_type: ShiftType) -> Self {
        self.shift_type = shift_type;
        self
    }

    /// Sets required headcount and capacity.
    pub fn with_headcount(mut self, required: usize, max: usize) -> Self {
        self.required_employees = required;
        self.max_employees = max;
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Duration in hours.
    ///
    /// # Panics
    /// If the shift ends before it starts.
    pub fn duration_hours(&self) -> f64 {
        let seconds = self
            .end_time
            .signed_duration_since(self.start_time)
            .num_seconds();
        assert!(
            seconds >= 0,
            "shift '{}' has negative duration ({} -> {})",
            self.id,
            self.start_time,
            self.end_time
        );
        seconds as f64 / 3600.0
    }

    /// Start as a date-time.
    #[inline]
    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    /// End as a date-time.
    #[inline]
    pub fn end(&self) -> NaiveDateTime {
        self.date.and_time(self.end_time)
    }

    /// Weekday of the shift date.
    #[inline]
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// Whether `[start, end)` intersects the other shift's interval.
    pub fn overlaps(&self, other: &Shift) -> bool {
        !(self.end() <= other.start() || other.end() <= self.start())
    }

    /// Whether the shift has at least `required_employees` assignees.
    #[inline]
    pub fn is_fully_staffed(&self) -> bool {
        self.assigned_employees.len() >= self.required_employees
    }

    /// Whether another employee fits under `max_employees`.
    #[inline]
    pub fn has_capacity(&self) -> bool {
        self.assigned_employees.len() < self.max_employees
    }

    /// Number of employees still needed to reach `required_employees`.
    #[inline]
    pub fn open_slots(&self) -> usize {
        self.required_employees
            .saturating_sub(self.assigned_employees.len())
    }

    /// Whether `employee_id` is assigned.
    pub fn is_assigned(&self, employee_id: &str) -> bool {
        self.assigned_employees.iter().any(|id| id == employee_id)
    }
}
