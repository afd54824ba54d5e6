//! Local-search improvement of an existing assignment.
//!
//! # Moves (tried in this order every iteration)
//!
//! | Move | Effect |
//! |------|--------|
//! | Reassign | Add one of the top candidates to an understaffed shift |
//! | Swap | Exchange the first assignees of two shifts |
//! | Rebalance | Hand a shift from an overloaded to an underloaded employee |
//!
//! Reassign and rebalance moves are built on a clone of the schedule. Swaps
//! are applied in place and undone when rejected. A move is kept only if it
//! strictly raises [`ShiftScheduler::schedule_score`], so the score never
//! decreases over a run.
//!
//! # Termination
//! `max_iterations`, `max_stale_iterations` iterations in a row without an
//! accepted move, or the cancellation flag.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use super::ShiftScheduler;
use crate::models::Schedule;

/// Minimum score gain for a move to count as an improvement.
const IMPROVEMENT_EPSILON: f64 = 1e-12;

/// Counters from one local-search run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Iterations started.
    pub iterations: usize,
    /// Accepted reassign moves.
    pub reassignments: usize,
    /// Accepted swap moves.
    pub swaps: usize,
    /// Accepted rebalance moves.
    pub rebalances: usize,
    /// Whether the run stopped on the cancellation flag.
    pub cancelled: bool,
}

impl SearchStats {
    /// Total accepted moves.
    pub fn accepted_moves(&self) -> usize {
        self.reassignments + self.swaps + self.rebalances
    }
}

#[derive(Debug, Clone, Copy)]
enum Move {
    Reassign,
    Swap,
    Rebalance,
}

impl Move {
    const ALL: [Move; 3] = [Move::Reassign, Move::Swap, Move::Rebalance];
}

impl ShiftScheduler {
    /// Improves the current assignments of `schedule` in place.
    ///
    /// Unlike [`optimize_schedule`](Self::optimize_schedule) this keeps the
    /// existing assignments as the starting point.
    pub fn improve_schedule(&self, schedule: &mut Schedule, max_iterations: usize) -> SearchStats {
        self.improve_schedule_with_cancel(schedule, max_iterations, &AtomicBool::new(false))
    }

    /// Like [`improve_schedule`](Self::improve_schedule), checking `cancel`
    /// before every move attempt.
    pub fn improve_schedule_with_cancel(
        &self,
        schedule: &mut Schedule,
        max_iterations: usize,
        cancel: &AtomicBool,
    ) -> SearchStats {
        let mut stats = SearchStats::default();
        let mut score = self.schedule_score(schedule);
        let mut stale = 0usize;

        'search: while stats.iterations < max_iterations
            && stale < self.config.max_stale_iterations
        {
            stats.iterations += 1;
            let mut improved = false;

            for mv in Move::ALL {
                if cancel.load(Ordering::Relaxed) {
                    stats.cancelled = true;
                    break 'search;
                }
                let accepted = match mv {
                    Move::Reassign => {
                        let n = self.reassign_understaffed(schedule, &mut score);
                        stats.reassignments += n;
                        n
                    }
                    Move::Swap => {
                        let n = self.swap_first_assignees(schedule, &mut score);
                        stats.swaps += n;
                        n
                    }
                    Move::Rebalance => {
                        let n = self.rebalance_load(schedule, &mut score);
                        stats.rebalances += n;
                        n
                    }
                };
                improved |= accepted > 0;
            }

            if improved {
                stale = 0;
            } else {
                stale += 1;
            }
        }

        if stats.accepted_moves() > 0 {
            schedule.touch();
        }
        stats
    }

    /// Tries the top candidates on every understaffed shift.
    fn reassign_understaffed(&self, schedule: &mut Schedule, score: &mut f64) -> usize {
        let mut accepted = 0;

        for idx in self.staffing_indices(schedule) {
            let shift = &schedule.shifts[idx];
            if shift.is_fully_staffed() || !shift.has_capacity() {
                continue;
            }
            let candidates: Vec<String> = self
                .rank_candidates(schedule, shift)
                .into_iter()
                .take(self.config.reassign_candidates)
                .map(|s| s.employee_id)
                .collect();

            for employee_id in candidates {
                let shift = &schedule.shifts[idx];
                if shift.is_fully_staffed() || !shift.has_capacity() {
                    break;
                }
                // An earlier acceptance may have invalidated this candidate.
                if !self
                    .validator
                    .validate_shift_assignment(schedule, &employee_id, &shift.id)
                    .success
                {
                    continue;
                }

                let mut trial = schedule.clone();
                trial.shifts[idx].assigned_employees.push(employee_id.clone());
                let trial_score = self.schedule_score(&trial);
                if trial_score > *score + IMPROVEMENT_EPSILON {
                    tracing::debug!(
                        shift_id = %trial.shifts[idx].id,
                        employee_id = %employee_id,
                        score = trial_score,
                        "reassign accepted"
                    );
                    *schedule = trial;
                    *score = trial_score;
                    accepted += 1;
                }
            }
        }

        accepted
    }

    /// Tries exchanging the first assignees of every pair of shifts.
    fn swap_first_assignees(&self, schedule: &mut Schedule, score: &mut f64) -> usize {
        let mut accepted = 0;
        let n = schedule.shifts.len();

        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = match (
                    schedule.shifts[i].assigned_employees.first(),
                    schedule.shifts[j].assigned_employees.first(),
                ) {
                    (Some(a), Some(b)) => (a.clone(), b.clone()),
                    _ => continue,
                };
                if a == b || schedule.shifts[j].is_assigned(&a) || schedule.shifts[i].is_assigned(&b)
                {
                    continue;
                }

                let before = match (
                    self.pair_total(schedule, &a, i),
                    self.pair_total(schedule, &b, j),
                ) {
                    (Some((x, _)), Some((y, _))) => x + y,
                    _ => continue,
                };

                schedule.shifts[i].assigned_employees[0] = b.clone();
                schedule.shifts[j].assigned_employees[0] = a.clone();

                let after = match (
                    self.pair_total(schedule, &a, j),
                    self.pair_total(schedule, &b, i),
                ) {
                    (Some((x, true)), Some((y, true))) => Some(x + y),
                    _ => None,
                };
                let trial_score = after
                    .filter(|after| *after > before + IMPROVEMENT_EPSILON)
                    .map(|_| self.schedule_score(schedule))
                    .filter(|trial| *trial > *score + IMPROVEMENT_EPSILON);

                match trial_score {
                    Some(trial_score) => {
                        tracing::debug!(
                            first_shift = %schedule.shifts[i].id,
                            second_shift = %schedule.shifts[j].id,
                            employee_a = %a,
                            employee_b = %b,
                            score = trial_score,
                            "swap accepted"
                        );
                        *score = trial_score;
                        accepted += 1;
                    }
                    None => {
                        schedule.shifts[i].assigned_employees[0] = a;
                        schedule.shifts[j].assigned_employees[0] = b;
                    }
                }
            }
        }

        accepted
    }

    /// Moves one shift from an overloaded to an underloaded employee.
    ///
    /// Accepts at most one move per call; the load picture changes after it.
    fn rebalance_load(&self, schedule: &mut Schedule, score: &mut f64) -> usize {
        if schedule.employees.len() < 2 {
            return 0;
        }

        let hours: Vec<(String, f64)> = schedule
            .employees
            .iter()
            .map(|e| (e.id.clone(), schedule.employee_hours(&e.id)))
            .collect();
        let average = hours.iter().map(|(_, h)| h).sum::<f64>() / hours.len() as f64;
        if average <= 0.0 {
            return 0;
        }

        let mut overloaded: Vec<&(String, f64)> = hours
            .iter()
            .filter(|(_, h)| *h > self.config.overload_factor * average)
            .collect();
        overloaded.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut underloaded: Vec<&(String, f64)> = hours
            .iter()
            .filter(|(_, h)| *h < self.config.underload_factor * average)
            .collect();
        underloaded.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        for (from, _) in &overloaded {
            let held: Vec<usize> = schedule
                .shifts
                .iter()
                .enumerate()
                .filter(|(_, s)| s.is_assigned(from))
                .map(|(idx, _)| idx)
                .collect();

            for idx in held {
                for (to, _) in &underloaded {
                    let shift = &schedule.shifts[idx];
                    if shift.is_assigned(to) {
                        continue;
                    }
                    let Some(position) = shift.assigned_employees.iter().position(|id| id == from)
                    else {
                        continue;
                    };

                    let mut trial = schedule.clone();
                    trial.shifts[idx].assigned_employees[position] = to.clone();
                    let shift_id = trial.shifts[idx].id.clone();
                    if !self
                        .validator
                        .validate_shift_assignment(&trial, to, &shift_id)
                        .success
                    {
                        continue;
                    }

                    let trial_score = self.schedule_score(&trial);
                    if trial_score > *score + IMPROVEMENT_EPSILON {
                        tracing::debug!(
                            shift_id = %shift_id,
                            from = %from,
                            to = %to,
                            score = trial_score,
                            "rebalance accepted"
                        );
                        *schedule = trial;
                        *score = trial_score;
                        return 1;
                    }
                }
            }
        }

        0
    }

    /// Total and validity of an employee holding the shift at `idx`.
    fn pair_total(&self, schedule: &Schedule, employee_id: &str, idx: usize) -> Option<(f64, bool)> {
        let employee = schedule.employee(employee_id)?;
        let (score, outcome) = self.score_pair(schedule, employee, &schedule.shifts[idx]);
        Some((score.total, outcome.success))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, Role, Shift, ShiftType, SkillLevel};
    use chrono::{NaiveDate, NaiveTime, Weekday};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn anyday(e: Employee) -> Employee {
        e.with_available_days([
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ])
    }

    fn held(mut shift: Shift, employee_id: &str) -> Shift {
        shift.assigned_employees.push(employee_id.into());
        shift
    }

    #[test]
    fn test_reassign_fills_open_shift() {
        let mut schedule = Schedule::new("SCH", "test", d(1), d(7))
            .with_employee(anyday(Employee::new("E1")))
            .with_shift(Shift::new("S1", d(1), t(9), t(13)));

        let scheduler = ShiftScheduler::new();
        let before = scheduler.schedule_score(&schedule);
        let stats = scheduler.improve_schedule(&mut schedule, 10);

        assert_eq!(stats.reassignments, 1);
        assert!(schedule.shifts[0].is_assigned("E1"));
        assert!(scheduler.schedule_score(&schedule) > before);
    }

    #[test]
    fn test_swap_improves_preferences() {
        let morning = Shift::new("S1", d(1), t(8), t(12)).with_shift_type(ShiftType::Morning);
        let night = Shift::new("S2", d(3), t(18), t(22)).with_shift_type(ShiftType::Night);
        let early = anyday(Employee::new("E_m").with_preferred_shift_type(ShiftType::Morning));
        let late = anyday(Employee::new("E_n").with_preferred_shift_type(ShiftType::Night));

        let mut schedule = Schedule::new("SCH", "test", d(1), d(7))
            .with_employee(early)
            .with_employee(late)
            .with_shift(held(morning, "E_n"))
            .with_shift(held(night, "E_m"));

        let scheduler = ShiftScheduler::new();
        let before = scheduler.schedule_score(&schedule);
        let stats = scheduler.improve_schedule(&mut schedule, 10);

        assert_eq!(stats.swaps, 1);
        assert_eq!(schedule.shifts[0].assigned_employees, vec!["E_m".to_string()]);
        assert_eq!(schedule.shifts[1].assigned_employees, vec!["E_n".to_string()]);
        assert!(scheduler.schedule_score(&schedule) > before);
    }

    #[test]
    fn test_swap_rejected_when_invalid() {
        let role = Role::new("medic").with_required_skill("first_aid", SkillLevel::Advanced);
        let morning = Shift::new("S1", d(1), t(8), t(12))
            .with_shift_type(ShiftType::Morning)
            .with_role(role);
        let night = Shift::new("S2", d(3), t(18), t(22)).with_shift_type(ShiftType::Night);
        let medic = anyday(
            Employee::new("E_medic")
                .with_skill("first_aid", SkillLevel::Expert)
                .with_preferred_shift_type(ShiftType::Night),
        );
        let other = anyday(Employee::new("E_other").with_preferred_shift_type(ShiftType::Morning));

        let mut schedule = Schedule::new("SCH", "test", d(1), d(7))
            .with_employee(medic)
            .with_employee(other)
            .with_shift(held(morning, "E_medic"))
            .with_shift(held(night, "E_other"));

        let stats = ShiftScheduler::new().improve_schedule(&mut schedule, 10);
        assert_eq!(stats.swaps, 0);
        assert_eq!(schedule.shifts[0].assigned_employees, vec!["E_medic".to_string()]);
        assert_eq!(schedule.shifts[1].assigned_employees, vec!["E_other".to_string()]);
    }

    #[test]
    fn test_rejected_swap_restores_order() {
        // Swapping E1 and E2 gains nothing; both keep their first positions.
        let mut schedule = Schedule::new("SCH", "test", d(1), d(7))
            .with_employee(anyday(Employee::new("E1")))
            .with_employee(anyday(Employee::new("E2")))
            .with_employee(anyday(Employee::new("E3")))
            .with_shift(held(
                held(Shift::new("S1", d(1), t(8), t(12)).with_headcount(2, 2), "E1"),
                "E3",
            ))
            .with_shift(held(Shift::new("S2", d(3), t(8), t(12)), "E2"));
        let before: Vec<Vec<String>> = schedule
            .shifts
            .iter()
            .map(|s| s.assigned_employees.clone())
            .collect();

        let stats = ShiftScheduler::new().improve_schedule(&mut schedule, 5);
        assert_eq!(stats.accepted_moves(), 0);
        let after: Vec<Vec<String>> = schedule
            .shifts
            .iter()
            .map(|s| s.assigned_employees.clone())
            .collect();
        assert_eq!(after, before);
    }

    #[test]
    fn test_rebalance_moves_shift_to_underloaded() {
        // X holds 30h, Y holds 5h on a shift only Y is qualified for.
        let guard = Role::new("guard").with_required_skill("first_aid", SkillLevel::Beginner);
        let x = anyday(Employee::new("X").with_max_hours(10.0, 40.0));
        let y = anyday(
            Employee::new("Y")
                .with_max_hours(10.0, 40.0)
                .with_skill("first_aid", SkillLevel::Beginner),
        );

        let mut schedule = Schedule::new("SCH", "test", d(1), d(7))
            .with_employee(x)
            .with_employee(y)
            .with_shift(held(Shift::new("A", d(1), t(8), t(18)), "X"))
            .with_shift(held(Shift::new("B", d(2), t(8), t(18)), "X"))
            .with_shift(held(Shift::new("C", d(3), t(8), t(18)), "X"))
            .with_shift(held(Shift::new("D", d(4), t(8), t(13)).with_role(guard), "Y"));

        let scheduler = ShiftScheduler::new();
        let before = scheduler.schedule_score(&schedule);
        let stats = scheduler.improve_schedule(&mut schedule, 20);

        assert_eq!(stats.rebalances, 1);
        assert!(schedule.shifts[0].is_assigned("Y"));
        assert!((schedule.employee_hours("X") - 20.0).abs() < 1e-10);
        assert!((schedule.employee_hours("Y") - 15.0).abs() < 1e-10);
        assert!(scheduler.schedule_score(&schedule) > before);
    }

    #[test]
    fn test_stale_limit_stops_search() {
        let mut schedule = Schedule::new("SCH", "test", d(1), d(7))
            .with_employee(anyday(Employee::new("E1")))
            .with_shift(held(Shift::new("S1", d(1), t(9), t(13)), "E1"));

        let scheduler = ShiftScheduler::with_config(
            crate::config::SchedulerConfig::default().with_max_stale_iterations(5),
        )
        .unwrap();
        let stats = scheduler.improve_schedule(&mut schedule, 1000);
        assert_eq!(stats.iterations, 5);
        assert_eq!(stats.accepted_moves(), 0);
    }

    #[test]
    fn test_zero_iterations_is_noop() {
        let mut schedule = Schedule::new("SCH", "test", d(1), d(7))
            .with_employee(anyday(Employee::new("E1")))
            .with_shift(Shift::new("S1", d(1), t(9), t(13)));
        let stats = ShiftScheduler::new().improve_schedule(&mut schedule, 0);
        assert_eq!(stats, SearchStats::default());
        assert!(schedule.shifts[0].assigned_employees.is_empty());
    }

    #[test]
    fn test_cancel_before_first_move() {
        let mut schedule = Schedule::new("SCH", "test", d(1), d(7))
            .with_employee(anyday(Employee::new("E1")))
            .with_shift(Shift::new("S1", d(1), t(9), t(13)));
        let cancel = AtomicBool::new(true);
        let stats = ShiftScheduler::new().improve_schedule_with_cancel(&mut schedule, 10, &cancel);

        assert!(stats.cancelled);
        assert_eq!(stats.accepted_moves(), 0);
        assert!(schedule.shifts[0].assigned_employees.is_empty());
    }
}
