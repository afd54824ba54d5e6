//! Per-employee work constraints.
//!
//! A `WorkConstraint` tightens one of the engine's built-in limits for a
//! single employee over a date window (e.g., a temporary 20h/week cap).
//! When both a constraint and the built-in limit apply, the stricter one wins.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of limit a constraint tightens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkConstraintType {
    /// Hours per calendar day (upper bound).
    MaxHoursPerDay,
    /// Hours per ISO week (upper bound).
    MaxHoursPerWeek,
    /// Rest between consecutive shifts, in hours (lower bound).
    MinRestHours,
    /// Consecutive working days (upper bound).
    MaxConsecutiveDays,
}

impl WorkConstraintType {
    /// Whether a smaller value is stricter.
    pub fn is_upper_bound(self) -> bool {
        !matches!(self, WorkConstraintType::MinRestHours)
    }
}

/// A time-scoped rule for one employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkConstraint {
    /// Constrained employee.
    pub employee_id: String,
    /// Limit being tightened.
    pub constraint_type: WorkConstraintType,
    /// Limit value (hours or days, depending on type).
    pub value: f64,
    /// First date the constraint applies.
    pub effective_date: NaiveDate,
    /// Last date the constraint applies. `None` = open-ended.
    pub expiry_date: Option<NaiveDate>,
}

impl WorkConstraint {
    /// Creates an open-ended constraint.
    pub fn new(
        employee_id: impl Into<String>,
        constraint_type: WorkConstraintType,
        value: f64,
        effective_date: NaiveDate,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            constraint_type,
            value,
            effective_date,
            expiry_date: None,
        }
    }

    /// Sets the expiry date (inclusive).
    pub fn with_expiry(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    /// Whether the constraint is in force on `date`.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.effective_date <= date && self.expiry_date.is_none_or(|expiry| date <= expiry)
    }

    /// Combines this constraint's value with a base limit, keeping the stricter.
    pub fn tighten(&self, base: f64) -> f64 {
        if self.constraint_type.is_upper_bound() {
            base.min(self.value)
        } else {
            base.max(self.value)
        }
    }
}
