//! Single-assignment constraint validator.
//!
//! Answers "may employee E work shift S?" for the schedule as it would be
//! right after the assignment. If E already holds S the check describes
//! the current state, which is what whole-schedule validation relies on.
//!
//! # Checks
//! 1. Employee and shift exist
//! 2. Daily and ISO-week hour limits (incl. the candidate shift)
//! 3. No overlap with E's other shifts on the same date
//! 4. Minimum rest to E's neighbouring shifts
//! 5. Maximum consecutive working days
//! 6. Required skills (rank) and certifications
//! 7. Shift capacity
//!
//! Active `WorkConstraint`s tighten checks 2, 4 and 5. The weekly limit is
//! the strictest one active on any day E works that week. Rest and
//! consecutive-day limits are resolved per date the same way
//! [`BreakEnforcer`](super::BreakEnforcer) resolves them. Preferred skills
//! and weekday availability only produce warnings.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

use super::{ValidationOutcome, Violation, ViolationKind, HOURS_EPSILON};
use crate::config::BreakRules;
use crate::models::{Employee, Schedule, Shift, WorkConstraintType};

/// Validates proposed (employee, shift) assignments.
#[derive(Debug, Clone, Default)]
pub struct ConstraintValidator {
    break_rules: BreakRules,
}

impl ConstraintValidator {
    /// Creates a validator with the given rest/consecutive-day defaults.
    pub fn new(break_rules: BreakRules) -> Self {
        Self { break_rules }
    }

    /// The rest/consecutive-day defaults in use.
    pub fn break_rules(&self) -> &BreakRules {
        &self.break_rules
    }

    /// Checks whether `employee_id` may work `shift_id`.
    pub fn validate_shift_assignment(
        &self,
        schedule: &Schedule,
        employee_id: &str,
        shift_id: &str,
    ) -> ValidationOutcome {
        let employee = schedule.employee(employee_id);
        let shift = schedule.shift(shift_id);

        let (employee, shift) = match (employee, shift) {
            (Some(e), Some(s)) => (e, s),
            (employee, shift) => {
                let mut violations = Vec::new();
                if employee.is_none() {
                    violations.push(Violation::new(
                        ViolationKind::NotFound,
                        employee_id,
                        shift_id,
                        format!("Employee '{employee_id}' not found"),
                    ));
                }
                if shift.is_none() {
                    violations.push(Violation::new(
                        ViolationKind::NotFound,
                        employee_id,
                        shift_id,
                        format!("Shift '{shift_id}' not found"),
                    ));
                }
                return ValidationOutcome::new(violations, Vec::new());
            }
        };

        let others: Vec<&Shift> = schedule
            .shifts
            .iter()
            .filter(|s| s.id != shift.id && s.is_assigned(employee_id))
            .collect();

        let mut violations = Vec::new();
        let mut warnings = Vec::new();

        self.check_hours(schedule, employee, shift, &others, &mut violations);
        self.check_overlap_and_rest(schedule, employee, shift, &others, &mut violations);
        self.check_consecutive_days(schedule, employee, shift, &others, &mut violations);
        check_qualifications(employee, shift, &mut violations, &mut warnings);
        check_capacity(employee, shift, &mut violations);

        if !employee.is_available_on(shift.weekday()) {
            warnings.push(Violation::new(
                ViolationKind::UnavailableDay,
                &employee.id,
                &shift.id,
                format!(
                    "Employee '{}' is not normally available on {} (shift '{}')",
                    employee.id,
                    shift.weekday(),
                    shift.id
                ),
            ));
        }

        ValidationOutcome::new(violations, warnings)
    }

    fn check_hours(
        &self,
        schedule: &Schedule,
        employee: &Employee,
        shift: &Shift,
        others: &[&Shift],
        violations: &mut Vec<Violation>,
    ) {
        let duration = shift.duration_hours();

        let day_total: f64 = duration
            + others
                .iter()
                .filter(|s| s.date == shift.date)
                .map(|s| s.duration_hours())
                .sum::<f64>();
        let day_limit = schedule.effective_limit(
            &employee.id,
            WorkConstraintType::MaxHoursPerDay,
            shift.date,
            employee.max_hours_per_day,
        );
        if day_total > day_limit + HOURS_EPSILON {
            violations.push(Violation::new(
                ViolationKind::DailyHoursExceeded,
                &employee.id,
                &shift.id,
                format!(
                    "Employee '{}' would work {:.1}h on {} (limit {:.1}h)",
                    employee.id, day_total, shift.date, day_limit
                ),
            ));
        }

        let week = shift.date.iso_week();
        let same_week: Vec<&Shift> = others
            .iter()
            .copied()
            .filter(|s| s.date.iso_week() == week)
            .collect();
        let week_total: f64 =
            duration + same_week.iter().map(|s| s.duration_hours()).sum::<f64>();
        // Strictest limit active on any worked day of the week.
        let week_limit = same_week
            .iter()
            .map(|s| s.date)
            .chain(std::iter::once(shift.date))
            .map(|date| {
                schedule.effective_limit(
                    &employee.id,
                    WorkConstraintType::MaxHoursPerWeek,
                    date,
                    employee.max_hours_per_week,
                )
            })
            .fold(f64::INFINITY, f64::min);
        if week_total > week_limit + HOURS_EPSILON {
            violations.push(Violation::new(
                ViolationKind::WeeklyHoursExceeded,
                &employee.id,
                &shift.id,
                format!(
                    "Employee '{}' would work {:.1}h in week {}-W{:02} (limit {:.1}h)",
                    employee.id,
                    week_total,
                    week.year(),
                    week.week(),
                    week_limit
                ),
            ));
        }
    }

    fn check_overlap_and_rest(
        &self,
        schedule: &Schedule,
        employee: &Employee,
        shift: &Shift,
        others: &[&Shift],
        violations: &mut Vec<Violation>,
    ) {
        for other in others {
            if other.date == shift.date && shift.overlaps(other) {
                violations.push(Violation::new(
                    ViolationKind::TimeOverlap,
                    &employee.id,
                    &shift.id,
                    format!(
                        "Shift '{}' ({}-{}) overlaps shift '{}' ({}-{}) assigned to employee '{}'",
                        shift.id,
                        shift.start_time.format("%H:%M"),
                        shift.end_time.format("%H:%M"),
                        other.id,
                        other.start_time.format("%H:%M"),
                        other.end_time.format("%H:%M"),
                        employee.id
                    ),
                ));
                continue;
            }

            let (earlier, later) = if other.end() <= shift.start() {
                (*other, shift)
            } else {
                (shift, *other)
            };
            let min_rest = schedule.effective_limit(
                &employee.id,
                WorkConstraintType::MinRestHours,
                later.date,
                self.break_rules.min_rest_hours,
            );
            let gap = rest_hours(earlier, later);
            if gap + HOURS_EPSILON < min_rest {
                violations.push(Violation::new(
                    ViolationKind::InsufficientRest,
                    &employee.id,
                    &shift.id,
                    format!(
                        "Employee '{}' would rest {:.1}h between shifts '{}' and '{}' (minimum {:.1}h)",
                        employee.id, gap, earlier.id, later.id, min_rest
                    ),
                ));
            }
        }
    }

    fn check_consecutive_days(
        &self,
        schedule: &Schedule,
        employee: &Employee,
        shift: &Shift,
        others: &[&Shift],
        violations: &mut Vec<Violation>,
    ) {
        let mut days: BTreeSet<NaiveDate> = others.iter().map(|s| s.date).collect();
        days.insert(shift.date);

        let (first, last) = run_bounds(&days, shift.date);
        let run = (last - first).num_days() + 1;
        // Each day of the run is held to the limit active on that day.
        let exceeded = first
            .iter_days()
            .take_while(|day| *day <= last)
            .enumerate()
            .find_map(|(position, day)| {
                let limit = schedule.effective_limit(
                    &employee.id,
                    WorkConstraintType::MaxConsecutiveDays,
                    day,
                    f64::from(self.break_rules.max_consecutive_days),
                );
                ((position + 1) as f64 > limit + HOURS_EPSILON).then_some(limit)
            });
        if let Some(limit) = exceeded {
            violations.push(Violation::new(
                ViolationKind::ConsecutiveDaysExceeded,
                &employee.id,
                &shift.id,
                format!(
                    "Employee '{}' would work {} consecutive days through {} (limit {})",
                    employee.id, run, shift.date, limit
                ),
            ));
        }
    }
}

/// Hours between the end of `earlier` and the start of `later`.
pub(crate) fn rest_hours(earlier: &Shift, later: &Shift) -> f64 {
    later
        .start()
        .signed_duration_since(earlier.end())
        .num_seconds() as f64
        / 3600.0
}

/// First and last date of the run of consecutive dates in `days` that
/// contains `day`.
fn run_bounds(days: &BTreeSet<NaiveDate>, day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let mut first = day;
    while let Some(prev) = first.pred_opt().filter(|d| days.contains(d)) {
        first = prev;
    }

    let mut last = day;
    while let Some(next) = last.succ_opt().filter(|d| days.contains(d)) {
        last = next;
    }

    (first, last)
}

fn check_qualifications(
    employee: &Employee,
    shift: &Shift,
    violations: &mut Vec<Violation>,
    warnings: &mut Vec<Violation>,
) {
    let role = &shift.role;

    for (skill, &required) in &role.required_skills {
        match employee.skill_level(skill) {
            None => violations.push(Violation::new(
                ViolationKind::MissingSkill,
                &employee.id,
                &shift.id,
                format!(
                    "Employee '{}' lacks required skill '{}' ({:?}) for shift '{}'",
                    employee.id, skill, required, shift.id
                ),
            )),
            Some(level) if level < required => violations.push(Violation::new(
                ViolationKind::InsufficientSkill,
                &employee.id,
                &shift.id,
                format!(
                    "Employee '{}' has skill '{}' at {:?}, shift '{}' requires {:?}",
                    employee.id, skill, level, shift.id, required
                ),
            )),
            Some(_) => {}
        }
    }

    for certification in &role.required_certifications {
        if !employee.has_certification(certification) {
            violations.push(Violation::new(
                ViolationKind::MissingCertification,
                &employee.id,
                &shift.id,
                format!(
                    "Employee '{}' lacks required certification '{}' for shift '{}'",
                    employee.id, certification, shift.id
                ),
            ));
        }
    }

    for (skill, &preferred) in &role.preferred_skills {
        if !employee.meets_skill(skill, preferred) {
            warnings.push(Violation::new(
                ViolationKind::PreferredSkillMissing,
                &employee.id,
                &shift.id,
                format!(
                    "Employee '{}' does not meet preferred skill '{}' ({:?}) for shift '{}'",
                    employee.id, skill, preferred, shift.id
                ),
            ));
        }
    }
}

fn check_capacity(employee: &Employee, shift: &Shift, violations: &mut Vec<Violation>) {
    let proposed = shift.assigned_employees.len() + usize::from(!shift.is_assigned(&employee.id));
    if proposed > shift.max_employees {
        violations.push(Violation::new(
            ViolationKind::CapacityExceeded,
            &employee.id,
            &shift.id,
            format!(
                "Shift '{}' would have {} employees (capacity {})",
                shift.id, proposed, shift.max_employees
            ),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, SkillLevel, WorkConstraint};
    use chrono::{NaiveTime, Weekday};

    fn d(day: u32) -> NaiveDate {
        // 2024-01-01 is a Monday.
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn worker(id: &str) -> Employee {
        Employee::new(id)
            .with_max_hours(10.0, 40.0)
            .with_available_days([
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ])
    }

    fn assigned(mut shift: Shift, employee_id: &str) -> Shift {
        shift.assigned_employees.push(employee_id.into());
        shift
    }

    fn schedule_with(employees: Vec<Employee>, shifts: Vec<Shift>) -> Schedule {
        let mut schedule = Schedule::new("SCH", "test", d(1), d(31));
        schedule.employees = employees;
        schedule.shifts = shifts;
        schedule
    }

    fn validator() -> ConstraintValidator {
        ConstraintValidator::default()
    }

    #[test]
    fn test_valid_assignment() {
        let s = schedule_with(vec![worker("E1")], vec![Shift::new("S1", d(1), t(9), t(17))]);
        let outcome = validator().validate_shift_assignment(&s, "E1", "S1");
        assert!(outcome.success);
        assert!(outcome.violations.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_not_found() {
        let s = schedule_with(vec![worker("E1")], vec![Shift::new("S1", d(1), t(9), t(17))]);

        let missing_employee = validator().validate_shift_assignment(&s, "E9", "S1");
        assert!(!missing_employee.success);
        assert!(missing_employee.has_violation(ViolationKind::NotFound));
        assert!(missing_employee.violations[0].message.contains("E9"));

        let both = validator().validate_shift_assignment(&s, "E9", "S9");
        assert_eq!(both.violations.len(), 2);
    }

    #[test]
    fn test_overlap_same_day() {
        let s = schedule_with(
            vec![worker("E1")],
            vec![
                assigned(Shift::new("S1", d(1), t(9), t(13)), "E1"),
                Shift::new("S2", d(1), t(12), t(16)),
            ],
        );
        let outcome = validator().validate_shift_assignment(&s, "E1", "S2");
        assert!(!outcome.success);
        assert!(outcome.has_violation(ViolationKind::TimeOverlap));
        // Overlapping pairs are not double-reported as rest problems.
        assert!(!outcome.has_violation(ViolationKind::InsufficientRest));
    }

    #[test]
    fn test_daily_limit() {
        let employee = worker("E1").with_max_hours(6.0, 40.0);
        let rules = BreakRules {
            min_rest_hours: 0.0,
            ..BreakRules::default()
        };
        let s = schedule_with(
            vec![employee],
            vec![
                assigned(Shift::new("S1", d(1), t(6), t(10)), "E1"),
                Shift::new("S2", d(1), t(12), t(15)),
            ],
        );
        let outcome = ConstraintValidator::new(rules).validate_shift_assignment(&s, "E1", "S2");
        assert!(outcome.has_violation(ViolationKind::DailyHoursExceeded));
        assert!(!outcome.has_violation(ViolationKind::TimeOverlap));
    }

    #[test]
    fn test_weekly_limit_counts_only_same_iso_week() {
        let employee = worker("E1").with_max_hours(10.0, 20.0);
        // Mon/Tue of week 1 (16h) plus Mon of week 2 (8h).
        let s = schedule_with(
            vec![employee],
            vec![
                assigned(Shift::new("S1", d(1), t(8), t(16)), "E1"),
                assigned(Shift::new("S2", d(2), t(8), t(16)), "E1"),
                Shift::new("S3", d(3), t(8), t(13)),
                Shift::new("S4", d(8), t(8), t(16)),
            ],
        );
        let v = validator();
        assert!(v
            .validate_shift_assignment(&s, "E1", "S3")
            .has_violation(ViolationKind::WeeklyHoursExceeded));
        assert!(v.validate_shift_assignment(&s, "E1", "S4").success);
    }

    #[test]
    fn test_custom_constraint_tightens_weekly_limit() {
        let s = schedule_with(
            vec![worker("E1")],
            vec![
                assigned(Shift::new("S1", d(1), t(8), t(16)), "E1"),
                Shift::new("S2", d(2), t(8), t(16)),
            ],
        )
        .with_constraint(
            WorkConstraint::new("E1", WorkConstraintType::MaxHoursPerWeek, 12.0, d(1))
                .with_expiry(d(5)),
        );

        let outcome = validator().validate_shift_assignment(&s, "E1", "S2");
        assert!(outcome.has_violation(ViolationKind::WeeklyHoursExceeded));
        assert!(outcome.violations[0].message.contains("limit 12.0h"));
    }

    #[test]
    fn test_looser_constraint_does_not_relax() {
        let employee = worker("E1").with_max_hours(4.0, 40.0);
        let s = schedule_with(vec![employee], vec![Shift::new("S1", d(1), t(8), t(14))])
            .with_constraint(WorkConstraint::new(
                "E1",
                WorkConstraintType::MaxHoursPerDay,
                12.0,
                d(1),
            ));
        assert!(validator()
            .validate_shift_assignment(&s, "E1", "S1")
            .has_violation(ViolationKind::DailyHoursExceeded));
    }

    #[test]
    fn test_min_rest() {
        let s = schedule_with(
            vec![worker("E1")],
            vec![
                assigned(Shift::new("S1", d(1), t(14), t(22)), "E1"),
                Shift::new("S2", d(2), t(4), t(10)),
                Shift::new("S3", d(2), t(8), t(12)),
            ],
        );
        let v = validator();
        // 6h rest < 8h default
        let early = v.validate_shift_assignment(&s, "E1", "S2");
        assert!(early.has_violation(ViolationKind::InsufficientRest));
        // 10h rest
        assert!(v.validate_shift_assignment(&s, "E1", "S3").success);

        let strict = s.clone().with_constraint(WorkConstraint::new(
            "E1",
            WorkConstraintType::MinRestHours,
            11.0,
            d(1),
        ));
        assert!(v
            .validate_shift_assignment(&strict, "E1", "S3")
            .has_violation(ViolationKind::InsufficientRest));
    }

    #[test]
    fn test_weekly_limit_starting_mid_week() {
        // 20h cap from Wednesday; Mon/Tue are checked against it too.
        let mut s = schedule_with(
            vec![worker("E1")],
            vec![
                Shift::new("MON", d(1), t(8), t(16)),
                Shift::new("TUE", d(2), t(8), t(16)),
                assigned(Shift::new("WED", d(3), t(8), t(16)), "E1"),
            ],
        )
        .with_constraint(WorkConstraint::new(
            "E1",
            WorkConstraintType::MaxHoursPerWeek,
            20.0,
            d(3),
        ));
        let v = validator();

        assert!(v.validate_shift_assignment(&s, "E1", "MON").success);
        s.shifts[0].assigned_employees.push("E1".into());

        let tue = v.validate_shift_assignment(&s, "E1", "TUE");
        assert!(tue.has_violation(ViolationKind::WeeklyHoursExceeded));
        assert!(tue.violations[0].message.contains("limit 20.0h"));
        // The existing assignments stay clean.
        assert!(v.validate_shift_assignment(&s, "E1", "MON").success);
        assert!(v.validate_shift_assignment(&s, "E1", "WED").success);
    }

    #[test]
    fn test_rest_resolved_on_later_shift_date() {
        // 14h rest applies from d2; the candidate on d1 precedes a d2 shift.
        let s = schedule_with(
            vec![worker("E1")],
            vec![
                Shift::new("EARLY", d(1), t(10), t(20)),
                Shift::new("DAY", d(1), t(8), t(14)),
                assigned(Shift::new("LATER", d(2), t(6), t(10)), "E1"),
            ],
        )
        .with_constraint(WorkConstraint::new(
            "E1",
            WorkConstraintType::MinRestHours,
            14.0,
            d(2),
        ));
        let v = validator();

        let early = v.validate_shift_assignment(&s, "E1", "EARLY");
        assert!(early.has_violation(ViolationKind::InsufficientRest));
        assert!(early.violations[0].message.contains("minimum 14.0h"));
        // 16h of rest
        assert!(v.validate_shift_assignment(&s, "E1", "DAY").success);
    }

    #[test]
    fn test_consecutive_limit_starting_inside_run() {
        // Limit of 2 from d3; adding d2 makes d4 the third day in a row.
        let s = schedule_with(
            vec![worker("E1")],
            vec![
                Shift::new("S2", d(2), t(9), t(13)),
                assigned(Shift::new("S3", d(3), t(9), t(13)), "E1"),
                assigned(Shift::new("S4", d(4), t(9), t(13)), "E1"),
                Shift::new("S6", d(6), t(9), t(13)),
            ],
        )
        .with_constraint(WorkConstraint::new(
            "E1",
            WorkConstraintType::MaxConsecutiveDays,
            2.0,
            d(3),
        ));
        let v = validator();

        assert!(v
            .validate_shift_assignment(&s, "E1", "S2")
            .has_violation(ViolationKind::ConsecutiveDaysExceeded));
        assert!(v.validate_shift_assignment(&s, "E1", "S6").success);
    }

    #[test]
    fn test_split_shift_needs_default_rest() {
        let s = schedule_with(
            vec![worker("E1")],
            vec![
                assigned(Shift::new("AM", d(1), t(9), t(13)), "E1"),
                Shift::new("PM", d(1), t(14), t(18)),
            ],
        );

        let outcome = validator().validate_shift_assignment(&s, "E1", "PM");
        assert!(outcome.has_violation(ViolationKind::InsufficientRest));

        let relaxed = ConstraintValidator::new(BreakRules {
            min_rest_hours: 0.0,
            ..BreakRules::default()
        });
        assert!(relaxed.validate_shift_assignment(&s, "E1", "PM").success);
    }

    #[test]
    fn test_consecutive_days() {
        let mut shifts: Vec<Shift> = (1..=6)
            .map(|day| assigned(Shift::new(format!("S{day}"), d(day), t(9), t(13)), "E1"))
            .collect();
        shifts.push(Shift::new("S7", d(7), t(9), t(13)));
        shifts.push(Shift::new("S9", d(9), t(9), t(13)));

        let employee = worker("E1").with_max_hours(8.0, 60.0);
        let s = schedule_with(vec![employee], shifts);
        let v = validator();

        assert!(v
            .validate_shift_assignment(&s, "E1", "S7")
            .has_violation(ViolationKind::ConsecutiveDaysExceeded));
        assert!(v.validate_shift_assignment(&s, "E1", "S9").success);
    }

    #[test]
    fn test_skill_requirements() {
        let role = Role::new("coach")
            .with_required_skill("basketball", SkillLevel::Intermediate)
            .with_required_certification("cpr")
            .with_preferred_skill("spanish", SkillLevel::Beginner);
        let shift = Shift::new("S1", d(1), t(9), t(13)).with_role(role);

        let qualified = worker("E1")
            .with_skill("basketball", SkillLevel::Advanced)
            .with_certification("cpr");
        let weak = worker("E2")
            .with_skill("basketball", SkillLevel::Beginner)
            .with_certification("cpr");
        let untrained = worker("E3");

        let s = schedule_with(vec![qualified, weak, untrained], vec![shift]);
        let v = validator();

        let ok = v.validate_shift_assignment(&s, "E1", "S1");
        assert!(ok.success);
        assert!(ok.has_warning(ViolationKind::PreferredSkillMissing));

        let weak = v.validate_shift_assignment(&s, "E2", "S1");
        assert!(weak.has_violation(ViolationKind::InsufficientSkill));

        let none = v.validate_shift_assignment(&s, "E3", "S1");
        assert!(none.has_violation(ViolationKind::MissingSkill));
        assert!(none.has_violation(ViolationKind::MissingCertification));
    }

    #[test]
    fn test_capacity() {
        let shift = assigned(
            Shift::new("S1", d(1), t(9), t(13)).with_headcount(1, 1),
            "E1",
        );
        let s = schedule_with(vec![worker("E1"), worker("E2")], vec![shift]);
        let v = validator();

        assert!(v
            .validate_shift_assignment(&s, "E2", "S1")
            .has_violation(ViolationKind::CapacityExceeded));
        // An existing assignee re-validates cleanly.
        assert!(v.validate_shift_assignment(&s, "E1", "S1").success);
    }

    #[test]
    fn test_unavailable_day_is_warning() {
        let employee = Employee::new("E1").with_available_day(Weekday::Tue);
        let s = schedule_with(vec![employee], vec![Shift::new("S1", d(1), t(9), t(13))]);
        let outcome = validator().validate_shift_assignment(&s, "E1", "S1");
        assert!(outcome.success);
        assert!(outcome.has_warning(ViolationKind::UnavailableDay));
    }

    #[test]
    fn test_run_bounds() {
        let days: BTreeSet<NaiveDate> = [d(1), d(2), d(3), d(5)].into_iter().collect();
        assert_eq!(run_bounds(&days, d(2)), (d(1), d(3)));
        assert_eq!(run_bounds(&days, d(5)), (d(5), d(5)));
    }
}
