//! Break and rest-period enforcement over an employee's full shift sequence.
//!
//! Complements [`ConstraintValidator`](super::ConstraintValidator), which
//! only looks at one candidate shift at a time. Each rule is resolved on
//! the date it is checked: rest on the date of the later shift, the
//! consecutive-day limit on the day the run grows past it.

use chrono::NaiveDate;

use super::assignment::rest_hours;
use super::{Violation, ViolationKind, HOURS_EPSILON};
use crate::config::BreakRules;
use crate::models::{Employee, Schedule, Shift, WorkConstraintType};

/// Checks minimum rest and maximum consecutive working days.
#[derive(Debug, Clone, Default)]
pub struct BreakEnforcer {
    break_rules: BreakRules,
}

impl BreakEnforcer {
    /// Creates an enforcer with the given system defaults.
    pub fn new(break_rules: BreakRules) -> Self {
        Self { break_rules }
    }

    /// Returns every rest or consecutive-day violation in the employee's schedule.
    pub fn validate_break_compliance(
        &self,
        schedule: &Schedule,
        employee: &Employee,
    ) -> Vec<Violation> {
        let mut shifts = schedule.shifts_for_employee(&employee.id);
        shifts.sort_by(|a, b| a.start().cmp(&b.start()).then_with(|| a.id.cmp(&b.id)));

        let mut violations = self.check_rest(schedule, employee, &shifts);
        violations.extend(self.check_consecutive_days(schedule, employee, &shifts));
        violations
    }

    fn check_rest(
        &self,
        schedule: &Schedule,
        employee: &Employee,
        shifts: &[&Shift],
    ) -> Vec<Violation> {
        let mut violations = Vec::new();

        for pair in shifts.windows(2) {
            let (previous, next) = (pair[0], pair[1]);
            let required = schedule.effective_limit(
                &employee.id,
                WorkConstraintType::MinRestHours,
                next.date,
                self.break_rules.min_rest_hours,
            );
            let gap = rest_hours(previous, next);
            if gap + HOURS_EPSILON < required {
                violations.push(Violation::for_employee(
                    ViolationKind::InsufficientRest,
                    &employee.id,
                    format!(
                        "Employee '{}' rests {:.1}h between shifts '{}' and '{}' (minimum {:.1}h)",
                        employee.id, gap, previous.id, next.id, required
                    ),
                ));
            }
        }

        violations
    }

    fn check_consecutive_days(
        &self,
        schedule: &Schedule,
        employee: &Employee,
        shifts: &[&Shift],
    ) -> Vec<Violation> {
        let mut days: Vec<NaiveDate> = shifts.iter().map(|s| s.date).collect();
        days.dedup();

        let mut violations = Vec::new();
        let mut run_start = None;
        let mut run = 0usize;
        let mut reported = false;
        let mut previous: Option<NaiveDate> = None;

        for day in days {
            let continues = previous.and_then(|p| p.succ_opt()) == Some(day);
            if continues {
                run += 1;
            } else {
                run = 1;
                run_start = Some(day);
                reported = false;
            }
            previous = Some(day);

            let limit = schedule.effective_limit(
                &employee.id,
                WorkConstraintType::MaxConsecutiveDays,
                day,
                f64::from(self.break_rules.max_consecutive_days),
            );
            if !reported && run as f64 > limit + HOURS_EPSILON {
                reported = true;
                let start = run_start.unwrap_or(day);
                violations.push(Violation::for_employee(
                    ViolationKind::ConsecutiveDaysExceeded,
                    &employee.id,
                    format!(
                        "Employee '{}' works more than {} consecutive days starting {}",
                        employee.id, limit, start
                    ),
                ));
            }
        }

        violations
    }
}
