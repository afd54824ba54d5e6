//! Shift assignment: scoring, greedy construction and local search.
//!
//! # Pipeline
//!
//! [`ShiftScheduler::optimize_schedule`] clears a schedule, fills it with a
//! priority-driven greedy pass, then improves it by local search
//! (reassign, swap, rebalance). Every step is deterministic: shift order
//! and candidate ranking use the explicit comparators [`staffing_order`]
//! and [`candidate_order`], ties broken by ID.
//!
//! # KPI
//!
//! `ScheduleKpi` summarizes coverage and workload of a finished schedule.
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"

mod engine;
mod greedy;
mod kpi;
mod local_search;
mod scoring;

pub use engine::{ScheduleOptimizationResult, ShiftAssignmentResult, ShiftScheduler};
pub use greedy::{candidate_order, staffing_order};
pub use kpi::ScheduleKpi;
pub use local_search::SearchStats;
pub use scoring::{preference_score, skill_match_score, AssignmentScore};
