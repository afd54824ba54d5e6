//! Shift-assignment optimization engine.
//!
//! Assigns employees to dated, timed shifts subject to skill, availability,
//! workload and rest constraints, then improves the assignment by local
//! search.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Employee`, `Role`, `Shift`,
//!   `WorkConstraint`, `Schedule`
//! - **`validation`**: Per-assignment constraint checks, break enforcement
//!   and input integrity checks
//! - **`scheduler`**: Scoring, greedy construction, local search, KPIs and
//!   the public [`ShiftScheduler`](scheduler::ShiftScheduler) engine
//! - **`config`**: Scoring weights, break rules and search tunables
//! - **`error`**: Error types for lookups, mutations and configuration
//!
//! # Example
//!
//! ```
//! use chrono::{NaiveDate, NaiveTime, Weekday};
//! use u_shift::models::{Employee, Role, Schedule, Shift, SkillLevel};
//! use u_shift::scheduler::ShiftScheduler;
//!
//! let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
//! let one = NaiveTime::from_hms_opt(13, 0, 0).unwrap();
//!
//! let coach = Role::new("coach").with_required_skill("basketball", SkillLevel::Intermediate);
//! let schedule = Schedule::new("SCH-1", "Week 1", monday, monday)
//!     .with_employee(
//!         Employee::new("E1")
//!             .with_skill("basketball", SkillLevel::Advanced)
//!             .with_available_day(Weekday::Mon),
//!     )
//!     .with_shift(Shift::new("S1", monday, nine, one).with_role(coach));
//!
//! let result = ShiftScheduler::new().optimize_schedule(schedule, 100);
//! assert!(result.success);
//! assert!(result.unassigned_shifts.is_empty());
//! ```
//!
//! # Logging
//!
//! The engine emits `tracing` events and never installs a subscriber.

pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;
