//! Assignment and schedule scoring.
//!
//! # Assignment score
//!
//! ```text
//! total = w_skill·skill + w_pref·preference + w_load·workload − penalty
//! penalty = 0.5·violations + 0.1·warnings
//! ```
//!
//! | Component | Range | Meaning |
//! |-----------|-------|---------|
//! | skill | [0, 1] | Mean rank ratio over required skills (+0.5 terms for met preferred skills) |
//! | preference | [0, 1] | Shift type and weekday fit |
//! | workload | [0, 1] | Closeness to the target utilization |
//!
//! `total` is not clamped: a heavily violated candidate goes negative.
//!
//! # Schedule score
//! Mean `total` over all assignments minus 0.5 per understaffed shift.

use serde::{Deserialize, Serialize};

use super::ShiftScheduler;
use crate::models::{Employee, Role, Schedule, Shift};
use crate::validation::ValidationOutcome;

/// Score of one (employee, shift) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentScore {
    pub employee_id: String,
    pub shift_id: String,
    /// Weighted sum of the components minus `constraint_penalty`.
    pub total: f64,
    pub skill_match_score: f64,
    pub preference_score: f64,
    pub workload_score: f64,
    pub constraint_penalty: f64,
}

impl ShiftScheduler {
    /// Scores a pair by ID. Returns `None` if either is unknown.
    pub fn assignment_score(
        &self,
        schedule: &Schedule,
        employee_id: &str,
        shift_id: &str,
    ) -> Option<AssignmentScore> {
        let employee = schedule.employee(employee_id)?;
        let shift = schedule.shift(shift_id)?;
        Some(self.score_pair(schedule, employee, shift).0)
    }

    /// Scores a pair and returns the validation outcome it was penalized with.
    pub(crate) fn score_pair(
        &self,
        schedule: &Schedule,
        employee: &Employee,
        shift: &Shift,
    ) -> (AssignmentScore, ValidationOutcome) {
        let outcome = self
            .validator
            .validate_shift_assignment(schedule, &employee.id, &shift.id);

        let weights = &self.config.weights;
        let skill_match_score = skill_match_score(employee, &shift.role);
        let preference_score = preference_score(employee, shift);
        let workload_score = self.workload_score(schedule, employee, shift);
        let constraint_penalty = self.config.violation_penalty * outcome.violations.len() as f64
            + self.config.warning_penalty * outcome.warnings.len() as f64;

        let total = weights.skill_match * skill_match_score
            + weights.preference * preference_score
            + weights.workload_balance * workload_score
            - constraint_penalty;

        let score = AssignmentScore {
            employee_id: employee.id.clone(),
            shift_id: shift.id.clone(),
            total,
            skill_match_score,
            preference_score,
            workload_score,
            constraint_penalty,
        };
        (score, outcome)
    }

    /// Aggregate quality of the current assignments.
    ///
    /// Mean assignment total (0 when nothing is assigned) minus
    /// `understaffed_penalty` for every shift below its required headcount.
    pub fn schedule_score(&self, schedule: &Schedule) -> f64 {
        let mut sum = 0.0;
        let mut count = 0usize;

        for shift in &schedule.shifts {
            for employee_id in &shift.assigned_employees {
                count += 1;
                sum += match schedule.employee(employee_id) {
                    Some(employee) => self.score_pair(schedule, employee, shift).0.total,
                    // Dangling reference: only the not-found penalty applies.
                    None => -self.config.violation_penalty,
                };
            }
        }

        let mean = if count == 0 { 0.0 } else { sum / count as f64 };
        mean - self.config.understaffed_penalty * schedule.understaffed_count() as f64
    }

    /// Workload fit after taking `shift`.
    ///
    /// `ratio = hours / (target · max_hours_per_week)`, where `hours` is the
    /// employee's total assigned hours including `shift`. Scores
    /// `1 − |ratio − target|` up to ratio 1.0, then falls off linearly
    /// from `target`, floored at 0.
    pub(crate) fn workload_score(&self, schedule: &Schedule, employee: &Employee, shift: &Shift) -> f64 {
        let target = self.config.target_utilization;
        let ideal = target * employee.max_hours_per_week;
        if ideal <= 0.0 {
            return 0.0;
        }

        let held = schedule.employee_hours(&employee.id);
        let hours = if shift.is_assigned(&employee.id) {
            held
        } else {
            held + shift.duration_hours()
        };

        let ratio = hours / ideal;
        if ratio <= 1.0 {
            1.0 - (ratio - target).abs()
        } else {
            (target - (ratio - 1.0)).max(0.0)
        }
    }
}

/// Skill fit of an employee for a role.
///
/// Averages `min(1, (rank + 1) / (required_rank + 1))` over the required
/// skills (0 for a missing skill) together with a flat 0.5 term for every
/// preferred skill met at or above its level. A role without required
/// skills scores 1.0.
///
/// Preferred-skill terms share the pool with required ones, so a met
/// preferred skill can lower the mean (e.g. one perfect required skill plus
/// one met preferred skill averages to 0.75).
pub fn skill_match_score(employee: &Employee, role: &Role) -> f64 {
    if role.required_skills.is_empty() {
        return 1.0;
    }

    let mut terms: Vec<f64> = role
        .required_skills
        .iter()
        .map(|(skill, required)| match employee.skill_level(skill) {
            Some(level) => {
                (f64::from(level.rank() + 1) / f64::from(required.rank() + 1)).min(1.0)
            }
            None => 0.0,
        })
        .collect();

    terms.extend(
        role.preferred_skills
            .iter()
            .filter(|(skill, level)| employee.meets_skill(skill, **level))
            .map(|_| 0.5),
    );

    terms.iter().sum::<f64>() / terms.len() as f64
}

/// Shift-type and weekday preference fit, in [0, 1].
pub fn preference_score(employee: &Employee, shift: &Shift) -> f64 {
    let mut score: f64 = 0.5;
    score += if employee.prefers(shift.shift_type) { 0.3 } else { -0.2 };
    score += if employee.is_available_on(shift.weekday()) { 0.2 } else { -0.3 };
    score.clamp(0.0, 1.0)
}
