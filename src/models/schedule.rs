//! Schedule (aggregate root) model.
//!
//! A schedule owns the shifts, employees and work constraints of one
//! planning period. The engine only ever mutates the assignment lists of
//! its shifts; everything else is read-only input.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Employee, Shift, WorkConstraint, WorkConstraintType};
use crate::error::{Result, ScheduleError};

/// A planning period with its shifts, staff and constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    /// Unique schedule identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// First date of the period.
    pub start_date: NaiveDate,
    /// Last date of the period (inclusive).
    pub end_date: NaiveDate,
    /// Shifts to staff.
    pub shifts: Vec<Shift>,
    /// Staff pool.
    pub employees: Vec<Employee>,
    /// Per-employee work constraints.
    pub constraints: Vec<WorkConstraint>,
    /// Time of the last assignment change.
    pub last_modified: DateTime<Utc>,
}

impl Schedule {
    /// Creates an empty schedule for `[start_date, end_date]`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_date,
            end_date,
            shifts: Vec::new(),
            employees: Vec::new(),
            constraints: Vec::new(),
            last_modified: Utc::now(),
        }
    }

    /// Builder: adds an employee without checks.
    pub fn with_employee(mut self, employee: Employee) -> Self {
        self.employees.push(employee);
        self
    }

    /// Builder: adds a shift without checks.
    pub fn with_shift(mut self, shift: Shift) -> Self {
        self.shifts.push(shift);
        self
    }

    /// Builder: adds a constraint without checks.
    pub fn with_constraint(mut self, constraint: WorkConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Adds a shift, rejecting duplicate IDs.
    pub fn create_shift(&mut self, shift: Shift) -> Result<()> {
        if self.shift(&shift.id).is_some() {
            return Err(ScheduleError::DuplicateId {
                kind: "shift",
                id: shift.id,
            });
        }
        self.shifts.push(shift);
        self.touch();
        Ok(())
    }

    /// Adds an employee, rejecting duplicate IDs.
    pub fn add_employee(&mut self, employee: Employee) -> Result<()> {
        if self.employee(&employee.id).is_some() {
            return Err(ScheduleError::DuplicateId {
                kind: "employee",
                id: employee.id,
            });
        }
        self.employees.push(employee);
        self.touch();
        Ok(())
    }

    /// Adds a constraint for an existing employee.
    pub fn add_constraint(&mut self, constraint: WorkConstraint) -> Result<()> {
        if self.employee(&constraint.employee_id).is_none() {
            return Err(ScheduleError::EmployeeNotFound(constraint.employee_id));
        }
        self.constraints.push(constraint);
        self.touch();
        Ok(())
    }

    /// Looks up an employee.
    pub fn employee(&self, employee_id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == employee_id)
    }

    /// Looks up a shift.
    pub fn shift(&self, shift_id: &str) -> Option<&Shift> {
        self.shifts.iter().find(|s| s.id == shift_id)
    }

    /// Looks up a shift mutably.
    pub fn shift_mut(&mut self, shift_id: &str) -> Option<&mut Shift> {
        self.shifts.iter_mut().find(|s| s.id == shift_id)
    }

    /// Position of a shift in `shifts`.
    pub fn shift_index(&self, shift_id: &str) -> Option<usize> {
        self.shifts.iter().position(|s| s.id == shift_id)
    }

    /// Removes an employee from a shift.
    pub fn unassign(&mut self, shift_id: &str, employee_id: &str) -> Result<()> {
        let shift = self
            .shift_mut(shift_id)
            .ok_or_else(|| ScheduleError::ShiftNotFound(shift_id.to_string()))?;
        let position = shift
            .assigned_employees
            .iter()
            .position(|id| id == employee_id)
            .ok_or_else(|| ScheduleError::NotAssigned {
                employee_id: employee_id.to_string(),
                shift_id: shift_id.to_string(),
            })?;
        shift.assigned_employees.remove(position);
        self.touch();
        Ok(())
    }

    /// Shifts the employee is assigned to, in schedule order.
    pub fn shifts_for_employee(&self, employee_id: &str) -> Vec<&Shift> {
        self.shifts
            .iter()
            .filter(|s| s.is_assigned(employee_id))
            .collect()
    }

    /// Total assigned hours for an employee.
    pub fn employee_hours(&self, employee_id: &str) -> f64 {
        self.shifts_for_employee(employee_id)
            .iter()
            .map(|s| s.duration_hours())
            .sum()
    }

    /// Constraints for `employee_id` in force on `date`.
    pub fn active_constraints<'a>(
        &'a self,
        employee_id: &'a str,
        date: NaiveDate,
    ) -> impl Iterator<Item = &'a WorkConstraint> + 'a {
        self.constraints
            .iter()
            .filter(move |c| c.employee_id == employee_id && c.is_active_on(date))
    }

    /// Applies every active constraint of `constraint_type` to `base`.
    ///
    /// Returns the stricter of `base` and each constraint's value.
    pub fn effective_limit(
        &self,
        employee_id: &str,
        constraint_type: WorkConstraintType,
        date: NaiveDate,
        base: f64,
    ) -> f64 {
        self.active_constraints(employee_id, date)
            .filter(|c| c.constraint_type == constraint_type)
            .fold(base, |limit, c| c.tighten(limit))
    }

    /// Shifts below their required headcount.
    pub fn understaffed_shifts(&self) -> Vec<&Shift> {
        self.shifts.iter().filter(|s| !s.is_fully_staffed()).collect()
    }

    /// Number of shifts below their required headcount.
    pub fn understaffed_count(&self) -> usize {
        self.shifts.iter().filter(|s| !s.is_fully_staffed()).count()
    }

    /// All (employee_id, shift_id) pairs, shift order then assignment order.
    pub fn assignment_pairs(&self) -> Vec<(&str, &str)> {
        self.shifts
            .iter()
            .flat_map(|s| {
                s.assigned_employees
                    .iter()
                    .map(move |e| (e.as_str(), s.id.as_str()))
            })
            .collect()
    }

    /// Number of (employee, shift) assignments.
    pub fn assignment_count(&self) -> usize {
        self.shifts.iter().map(|s| s.assigned_employees.len()).sum()
    }

    /// Removes every assignment.
    pub fn clear_assignments(&mut self) {
        for shift in &mut self.shifts {
            shift.assigned_employees.clear();
        }
        self.touch();
    }

    /// Records a modification.
    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}
