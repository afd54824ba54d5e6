//! Public shift-scheduling engine.
//!
//! [`ShiftScheduler`] ties the validators and the scorer together and
//! exposes the operations callers use: single assignments, candidate
//! ranking, whole-schedule validation and optimization.
//!
//! # Optimization pipeline
//!
//! 1. Log structural problems found by [`validate_input`] (never fatal)
//! 2. Clear all assignments
//! 3. Greedy construction
//! 4. Local search ([`improve_schedule`](ShiftScheduler::improve_schedule))
//! 5. Final [`validate_schedule`](ShiftScheduler::validate_schedule) and KPIs

use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::ScheduleKpi;
use crate::config::SchedulerConfig;
use crate::error::{ConfigError, Result};
use crate::models::{Employee, Schedule};
use crate::validation::{
    validate_input, BreakEnforcer, ConstraintValidator, ScheduleValidation, ValidationOutcome,
    Violation,
};

/// Shift-assignment engine.
///
/// Holds only configuration; every call works on the schedule it is given,
/// so one engine can serve independent schedules from several threads.
#[derive(Debug, Clone)]
pub struct ShiftScheduler {
    pub(crate) config: SchedulerConfig,
    pub(crate) validator: ConstraintValidator,
    enforcer: BreakEnforcer,
}

/// Outcome of [`ShiftScheduler::assign_shift`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftAssignmentResult {
    /// Whether the employee was added to the shift.
    pub success: bool,
    /// Blocking problems (empty on success).
    pub violations: Vec<String>,
    /// Advisory findings; reported on success and failure alike.
    pub warnings: Vec<String>,
    /// Summary line.
    pub message: String,
}

/// Outcome of [`ShiftScheduler::optimize_schedule`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOptimizationResult {
    /// `true` iff the returned schedule has no constraint violations.
    pub success: bool,
    /// The optimized schedule.
    pub schedule: Schedule,
    /// IDs of shifts still below their required headcount.
    pub unassigned_shifts: Vec<String>,
    /// Violations remaining in the returned schedule.
    pub constraint_violations: Vec<String>,
    /// Warnings for the returned schedule.
    pub warnings: Vec<String>,
    /// Final [`ShiftScheduler::schedule_score`].
    pub optimization_score: f64,
    /// Score right after greedy construction.
    pub greedy_score: f64,
    /// Wall-clock time of the run.
    pub execution_time: Duration,
    /// Local-search iterations started.
    pub iterations: usize,
    /// Accepted reassign moves.
    pub reassignments: usize,
    /// Accepted swap moves.
    pub swaps: usize,
    /// Accepted rebalance moves.
    pub rebalances: usize,
    /// Whether the run was cut short by the cancellation flag.
    pub cancelled: bool,
    /// Staffing and workload indicators of the returned schedule.
    pub kpi: ScheduleKpi,
    /// Summary line.
    pub message: String,
}

impl Default for ShiftScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ShiftScheduler {
    /// Creates an engine with the default configuration.
    pub fn new() -> Self {
        Self::from_valid_config(SchedulerConfig::default())
    }

    /// Creates an engine from a configuration, rejecting invalid values.
    pub fn with_config(config: SchedulerConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: SchedulerConfig) -> Self {
        Self {
            validator: ConstraintValidator::new(config.break_rules),
            enforcer: BreakEnforcer::new(config.break_rules),
            config,
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Checks whether `employee_id` may work `shift_id`.
    pub fn validate_shift_assignment(
        &self,
        schedule: &Schedule,
        employee_id: &str,
        shift_id: &str,
    ) -> ValidationOutcome {
        self.validator
            .validate_shift_assignment(schedule, employee_id, shift_id)
    }

    /// Rest and consecutive-day violations across an employee's shifts.
    pub fn validate_break_compliance(&self, schedule: &Schedule, employee: &Employee) -> Vec<Violation> {
        self.enforcer.validate_break_compliance(schedule, employee)
    }

    /// Validates and, if legal, performs one assignment.
    pub fn assign_shift(
        &self,
        schedule: &mut Schedule,
        employee_id: &str,
        shift_id: &str,
    ) -> ShiftAssignmentResult {
        if schedule
            .shift(shift_id)
            .is_some_and(|s| s.is_assigned(employee_id))
        {
            return ShiftAssignmentResult {
                success: false,
                violations: vec![format!(
                    "Employee '{employee_id}' is already assigned to shift '{shift_id}'"
                )],
                warnings: Vec::new(),
                message: format!("Employee '{employee_id}' already works shift '{shift_id}'"),
            };
        }

        let outcome = self
            .validator
            .validate_shift_assignment(schedule, employee_id, shift_id);
        let violations = outcome.violation_messages();
        let warnings = outcome.warning_messages();

        if !outcome.success {
            tracing::debug!(
                employee_id,
                shift_id,
                violations = violations.len(),
                "assignment rejected"
            );
            return ShiftAssignmentResult {
                success: false,
                violations,
                warnings,
                message: format!("Cannot assign employee '{employee_id}' to shift '{shift_id}'"),
            };
        }

        if let Some(shift) = schedule.shift_mut(shift_id) {
            shift.assigned_employees.push(employee_id.to_string());
        }
        schedule.touch();

        ShiftAssignmentResult {
            success: true,
            violations,
            warnings,
            message: format!("Assigned employee '{employee_id}' to shift '{shift_id}'"),
        }
    }

    /// Removes an employee from a shift.
    ///
    /// # Errors
    /// [`ShiftNotFound`](crate::error::ScheduleError::ShiftNotFound) or
    /// [`NotAssigned`](crate::error::ScheduleError::NotAssigned).
    pub fn unassign_shift(
        &self,
        schedule: &mut Schedule,
        shift_id: &str,
        employee_id: &str,
    ) -> Result<()> {
        schedule.unassign(shift_id, employee_id)
    }

    /// Re-checks every current assignment and every employee's breaks.
    ///
    /// Messages are deduplicated and keep discovery order, so the report is
    /// stable for an unchanged schedule.
    pub fn validate_schedule(&self, schedule: &Schedule) -> ScheduleValidation {
        let mut report = ScheduleValidation::default();

        for (employee_id, shift_id) in schedule.assignment_pairs() {
            let outcome = self
                .validator
                .validate_shift_assignment(schedule, employee_id, shift_id);
            for v in &outcome.violations {
                report.push_violation(&v.message);
            }
            for w in &outcome.warnings {
                report.push_warning(&w.message);
            }
        }

        for employee in &schedule.employees {
            for v in self.enforcer.validate_break_compliance(schedule, employee) {
                report.push_violation(&v.message);
            }
        }

        report
    }

    /// Rebuilds the assignments of `schedule` from scratch.
    ///
    /// Always returns a best-effort schedule; understaffed shifts and
    /// remaining violations are reported, not raised.
    pub fn optimize_schedule(
        &self,
        schedule: Schedule,
        max_iterations: usize,
    ) -> ScheduleOptimizationResult {
        self.optimize_schedule_with_cancel(schedule, max_iterations, &AtomicBool::new(false))
    }

    /// Like [`optimize_schedule`](Self::optimize_schedule), stopping the
    /// local search once `cancel` is set.
    pub fn optimize_schedule_with_cancel(
        &self,
        mut schedule: Schedule,
        max_iterations: usize,
        cancel: &AtomicBool,
    ) -> ScheduleOptimizationResult {
        let started = Instant::now();
        tracing::info!(
            schedule_id = %schedule.id,
            shifts = schedule.shifts.len(),
            employees = schedule.employees.len(),
            max_iterations,
            "optimization started"
        );

        if let Err(errors) = validate_input(&schedule) {
            for error in &errors {
                tracing::warn!(kind = ?error.kind, "{}", error.message);
            }
        }

        schedule.clear_assignments();
        let assigned = self.greedy_assign(&mut schedule);
        let greedy_score = self.schedule_score(&schedule);
        tracing::debug!(assigned, score = greedy_score, "greedy construction done");

        let stats = self.improve_schedule_with_cancel(&mut schedule, max_iterations, cancel);
        let optimization_score = self.schedule_score(&schedule);

        let report = self.validate_schedule(&schedule);
        let unassigned_shifts: Vec<String> = schedule
            .understaffed_shifts()
            .iter()
            .map(|s| s.id.clone())
            .collect();
        let kpi = ScheduleKpi::calculate(&schedule);
        let success = report.is_valid();
        let execution_time = started.elapsed();

        let message = if stats.cancelled {
            format!(
                "Optimization cancelled after {} iterations; {} shift(s) understaffed",
                stats.iterations,
                unassigned_shifts.len()
            )
        } else if success {
            format!(
                "Optimization completed; {} shift(s) understaffed",
                unassigned_shifts.len()
            )
        } else {
            format!(
                "Optimization completed with {} violation(s); {} shift(s) understaffed",
                report.violations.len(),
                unassigned_shifts.len()
            )
        };

        tracing::info!(
            schedule_id = %schedule.id,
            iterations = stats.iterations,
            accepted_moves = stats.accepted_moves(),
            greedy_score,
            score = optimization_score,
            unassigned = unassigned_shifts.len(),
            cancelled = stats.cancelled,
            elapsed_ms = execution_time.as_millis() as u64,
            "optimization finished"
        );

        ScheduleOptimizationResult {
            success,
            schedule,
            unassigned_shifts,
            constraint_violations: report.violations,
            warnings: report.warnings,
            optimization_score,
            greedy_score,
            execution_time,
            iterations: stats.iterations,
            reassignments: stats.reassignments,
            swaps: stats.swaps,
            rebalances: stats.rebalances,
            cancelled: stats.cancelled,
            kpi,
            message,
        }
    }
}
