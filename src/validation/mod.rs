//! Constraint checking.
//!
//! Three layers of checks, from narrowest to broadest:
//!
//! - [`ConstraintValidator`]: is assigning employee E to shift S legal in the
//!   current schedule? Evaluated against the proposed post-assignment state.
//! - [`BreakEnforcer`]: does an employee's whole shift sequence respect
//!   minimum rest and maximum consecutive working days?
//! - [`validate_input`]: is the schedule structurally sound (unique IDs,
//!   known references, sane limits)?
//!
//! The first two report [`Violation`]s as data. Violations block an
//! assignment, warnings never do.

mod assignment;
mod breaks;
mod integrity;

pub use assignment::ConstraintValidator;
pub use breaks::BreakEnforcer;
pub use integrity::{validate_input, ValidationError, ValidationErrorKind, ValidationResult};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance for comparing summed hours against limits.
pub(crate) const HOURS_EPSILON: f64 = 1e-9;

/// Classification of constraint findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Referenced employee or shift does not exist.
    NotFound,
    /// Daily hour limit exceeded.
    DailyHoursExceeded,
    /// ISO-week hour limit exceeded.
    WeeklyHoursExceeded,
    /// Two shifts of one employee overlap in time.
    TimeOverlap,
    /// A required skill is not held.
    MissingSkill,
    /// A required skill is held below the required rank.
    InsufficientSkill,
    /// A required certification is not held.
    MissingCertification,
    /// Headcount would exceed `max_employees`.
    CapacityExceeded,
    /// Gap between two shifts is below the minimum rest.
    InsufficientRest,
    /// Too many consecutive working days.
    ConsecutiveDaysExceeded,
    /// A preferred skill is missing or below the preferred rank (warning).
    PreferredSkillMissing,
    /// The shift falls on a day the employee is not normally available (warning).
    UnavailableDay,
}

/// A single constraint finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// What was found.
    pub kind: ViolationKind,
    /// Employee concerned.
    pub employee_id: String,
    /// Shift concerned, if the finding is about one shift.
    pub shift_id: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    /// Creates a finding about an (employee, shift) pair.
    pub fn new(
        kind: ViolationKind,
        employee_id: impl Into<String>,
        shift_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            employee_id: employee_id.into(),
            shift_id: Some(shift_id.into()),
            message: message.into(),
        }
    }

    /// Creates a finding about an employee's shift sequence.
    pub fn for_employee(
        kind: ViolationKind,
        employee_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            employee_id: employee_id.into(),
            shift_id: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of checking one proposed assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// `true` iff `violations` is empty.
    pub success: bool,
    /// Blocking findings.
    pub violations: Vec<Violation>,
    /// Advisory findings.
    pub warnings: Vec<Violation>,
}

impl ValidationOutcome {
    /// Builds an outcome, deriving `success`.
    pub fn new(violations: Vec<Violation>, warnings: Vec<Violation>) -> Self {
        Self {
            success: violations.is_empty(),
            violations,
            warnings,
        }
    }

    /// Violation messages.
    pub fn violation_messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.message.clone()).collect()
    }

    /// Warning messages.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(|v| v.message.clone()).collect()
    }

    /// Whether any violation has the given kind.
    pub fn has_violation(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }

    /// Whether any warning has the given kind.
    pub fn has_warning(&self, kind: ViolationKind) -> bool {
        self.warnings.iter().any(|v| v.kind == kind)
    }
}

/// Whole-schedule consistency report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleValidation {
    /// Distinct violation messages, in discovery order.
    pub violations: Vec<String>,
    /// Distinct warning messages, in discovery order.
    pub warnings: Vec<String>,
}

impl ScheduleValidation {
    /// Whether the schedule has no violations.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub(crate) fn push_violation(&mut self, message: &str) {
        if !self.violations.iter().any(|m| m == message) {
            self.violations.push(message.to_string());
        }
    }

    pub(crate) fn push_warning(&mut self, message: &str) {
        if !self.warnings.iter().any(|m| m == message) {
            self.warnings.push(message.to_string());
        }
    }
}
