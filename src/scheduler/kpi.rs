//! Schedule quality metrics (KPIs).
//!
//! Computes staffing and workload indicators from a schedule's current
//! assignments.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Coverage Rate | Fully staffed shifts / all shifts |
//! | Open Slots | Sum of `required − assigned` over understaffed shifts |
//! | Assigned Hours | Sum of shift hours over all assignments |
//! | Avg Utilization | Mean of `hours / max_hours_per_week` over employees |
//! | Max / Min Hours | Spread of per-employee workload |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Schedule;

/// Schedule performance indicators.
///
/// All time values are in hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Number of shifts.
    pub total_shifts: usize,
    /// Shifts with at least `required_employees` assignees.
    pub fully_staffed_shifts: usize,
    /// Fraction of fully staffed shifts (1.0 when there are no shifts).
    pub coverage_rate: f64,
    /// Missing headcount across understaffed shifts.
    pub open_slots: usize,
    /// Hours summed over every assignment.
    pub total_assigned_hours: f64,
    /// Assigned hours per employee, including employees with none.
    pub hours_by_employee: BTreeMap<String, f64>,
    /// Average of `hours / max_hours_per_week` (0.0..).
    pub avg_utilization: f64,
    /// Largest per-employee workload.
    pub max_employee_hours: f64,
    /// Smallest per-employee workload.
    pub min_employee_hours: f64,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule's current assignments.
    pub fn calculate(schedule: &Schedule) -> Self {
        let total_shifts = schedule.shifts.len();
        let fully_staffed_shifts = schedule
            .shifts
            .iter()
            .filter(|s| s.is_fully_staffed())
            .count();
        let open_slots = schedule.shifts.iter().map(|s| s.open_slots()).sum();
        let total_assigned_hours = schedule
            .shifts
            .iter()
            .map(|s| s.duration_hours() * s.assigned_employees.len() as f64)
            .sum();

        let coverage_rate = if total_shifts == 0 {
            1.0
        } else {
            fully_staffed_shifts as f64 / total_shifts as f64
        };

        let hours_by_employee: BTreeMap<String, f64> = schedule
            .employees
            .iter()
            .map(|e| (e.id.clone(), schedule.employee_hours(&e.id)))
            .collect();

        let utilizations: Vec<f64> = schedule
            .employees
            .iter()
            .filter(|e| e.max_hours_per_week > 0.0)
            .map(|e| hours_by_employee.get(&e.id).copied().unwrap_or(0.0) / e.max_hours_per_week)
            .collect();
        let avg_utilization = if utilizations.is_empty() {
            0.0
        } else {
            utilizations.iter().sum::<f64>() / utilizations.len() as f64
        };

        let max_employee_hours = hours_by_employee.values().copied().fold(0.0, f64::max);
        let min_employee_hours = if hours_by_employee.is_empty() {
            0.0
        } else {
            hours_by_employee
                .values()
                .copied()
                .fold(f64::INFINITY, f64::min)
        };

        Self {
            total_shifts,
            fully_staffed_shifts,
            coverage_rate,
            open_slots,
            total_assigned_hours,
            hours_by_employee,
            avg_utilization,
            max_employee_hours,
            min_employee_hours,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_coverage: f64, max_avg_utilization: f64) -> bool {
        self.coverage_rate >= min_coverage && self.avg_utilization <= max_avg_utilization
    }

    /// Difference between the busiest and the idlest employee.
    pub fn workload_spread(&self) -> f64 {
        self.max_employee_hours - self.min_employee_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, Shift};
    use chrono::{NaiveDate, NaiveTime};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn sample() -> Schedule {
        let mut s1 = Shift::new("S1", d(1), t(8), t(16)).with_headcount(2, 2);
        s1.assigned_employees = vec!["E1".into(), "E2".into()];
        let mut s2 = Shift::new("S2", d(2), t(8), t(12)).with_headcount(2, 3);
        s2.assigned_employees = vec!["E1".into()];
        let s3 = Shift::new("S3", d(3), t(8), t(12));

        Schedule::new("SCH", "test", d(1), d(7))
            .with_employee(Employee::new("E1"))
            .with_employee(Employee::new("E2"))
            .with_employee(Employee::new("E3").with_max_hours(8.0, 20.0))
            .with_shift(s1)
            .with_shift(s2)
            .with_shift(s3)
    }

    #[test]
    fn test_kpi_basic() {
        let kpi = ScheduleKpi::calculate(&sample());
        assert_eq!(kpi.total_shifts, 3);
        assert_eq!(kpi.fully_staffed_shifts, 1);
        assert!((kpi.coverage_rate - 1.0 / 3.0).abs() < 1e-10);
        // S2 misses 1, S3 misses 1
        assert_eq!(kpi.open_slots, 2);
        // 8 × 2 + 4 × 1
        assert!((kpi.total_assigned_hours - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_workload() {
        let kpi = ScheduleKpi::calculate(&sample());
        assert!((kpi.hours_by_employee["E1"] - 12.0).abs() < 1e-10);
        assert!((kpi.hours_by_employee["E2"] - 8.0).abs() < 1e-10);
        assert!((kpi.hours_by_employee["E3"] - 0.0).abs() < 1e-10);
        // (12/40 + 8/40 + 0/20) / 3
        assert!((kpi.avg_utilization - (0.3 + 0.2) / 3.0).abs() < 1e-10);
        assert!((kpi.max_employee_hours - 12.0).abs() < 1e-10);
        assert!((kpi.min_employee_hours - 0.0).abs() < 1e-10);
        assert!((kpi.workload_spread() - 12.0).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = ScheduleKpi::calculate(&Schedule::new("SCH", "empty", d(1), d(7)));
        assert_eq!(kpi.total_shifts, 0);
        assert!((kpi.coverage_rate - 1.0).abs() < 1e-10);
        assert!((kpi.avg_utilization - 0.0).abs() < 1e-10);
        assert!((kpi.min_employee_hours - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_meets_thresholds() {
        let kpi = ScheduleKpi::calculate(&sample());
        assert!(kpi.meets_thresholds(0.3, 1.0));
        assert!(!kpi.meets_thresholds(0.5, 1.0)); // Coverage too low
        assert!(!kpi.meets_thresholds(0.0, 0.1)); // Utilization too high
    }
}
