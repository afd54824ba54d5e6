//! Priority-driven greedy staffing.
//!
//! # Algorithm
//!
//! 1. Order shifts by [`staffing_order`]: priority, then skill demand, then date.
//! 2. For each shift below its required headcount, rank the valid
//!    candidates by [`candidate_order`].
//! 3. Assign the top `required − assigned` candidates (never past capacity).
//!
//! Shifts with more required skills go early so they are not starved of
//! qualified people by easier shifts.
//!
//! # Complexity
//! O(s · e · v) where s=shifts, e=employees, v=cost of one validation.

use std::cmp::Ordering;

use super::{AssignmentScore, ShiftScheduler};
use crate::error::{Result, ScheduleError};
use crate::models::{Schedule, Shift};

/// Staffing order of shifts.
///
/// Descending by `(priority, required skill count, date)`, then ascending
/// by shift ID so that equal keys always come out in the same order.
pub fn staffing_order(a: &Shift, b: &Shift) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| {
            b.role
                .required_skill_count()
                .cmp(&a.role.required_skill_count())
        })
        .then_with(|| b.date.cmp(&a.date))
        .then_with(|| a.id.cmp(&b.id))
}

/// Ranking order of candidates: highest `total` first, then employee ID.
pub fn candidate_order(a: &AssignmentScore, b: &AssignmentScore) -> Ordering {
    b.total
        .total_cmp(&a.total)
        .then_with(|| a.employee_id.cmp(&b.employee_id))
}

impl ShiftScheduler {
    /// Indices of `schedule.shifts` in staffing order.
    pub(crate) fn staffing_indices(&self, schedule: &Schedule) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..schedule.shifts.len()).collect();
        indices.sort_by(|&a, &b| staffing_order(&schedule.shifts[a], &schedule.shifts[b]));
        indices
    }

    /// Valid, unassigned candidates for a shift, best first.
    pub(crate) fn rank_candidates(&self, schedule: &Schedule, shift: &Shift) -> Vec<AssignmentScore> {
        let mut ranked: Vec<AssignmentScore> = schedule
            .employees
            .iter()
            .filter(|e| !shift.is_assigned(&e.id))
            .filter_map(|e| {
                let (score, outcome) = self.score_pair(schedule, e, shift);
                outcome.success.then_some(score)
            })
            .collect();
        ranked.sort_by(candidate_order);
        ranked
    }

    /// Returns up to `limit` valid candidates for a shift, best first.
    ///
    /// Employees already on the shift and employees that fail validation are
    /// left out.
    pub fn find_best_employees_for_shift(
        &self,
        schedule: &Schedule,
        shift_id: &str,
        limit: usize,
    ) -> Result<Vec<AssignmentScore>> {
        let shift = schedule
            .shift(shift_id)
            .ok_or_else(|| ScheduleError::ShiftNotFound(shift_id.to_string()))?;
        let mut ranked = self.rank_candidates(schedule, shift);
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Fills shifts greedily. Returns the number of assignments made.
    pub(crate) fn greedy_assign(&self, schedule: &mut Schedule) -> usize {
        let mut assigned = 0;

        for idx in self.staffing_indices(schedule) {
            let shift = &schedule.shifts[idx];
            let capacity_left = shift
                .max_employees
                .saturating_sub(shift.assigned_employees.len());
            let needed = shift.open_slots().min(capacity_left);
            if needed == 0 {
                continue;
            }

            let chosen: Vec<String> = self
                .rank_candidates(schedule, shift)
                .into_iter()
                .take(needed)
                .map(|score| score.employee_id)
                .collect();

            if chosen.len() < needed {
                tracing::debug!(
                    shift_id = %shift.id,
                    needed,
                    found = chosen.len(),
                    "not enough valid candidates"
                );
            }

            assigned += chosen.len();
            schedule.shifts[idx].assigned_employees.extend(chosen);
        }

        if assigned > 0 {
            schedule.touch();
        }
        assigned
    }
}
