//! Shift-assignment domain models.
//!
//! Provides the data types the engine reads and mutates: the staff pool,
//! the shifts to cover, the per-employee constraints, and the `Schedule`
//! aggregate that owns all of them.
//!
//! # Domain Mappings
//!
//! | u-shift | Sports camp | Hospital | Retail |
//! |---------|-------------|----------|--------|
//! | Employee | Coach | Nurse | Clerk |
//! | Role | Head coach | ICU nurse | Cashier |
//! | Shift | Session | Ward shift | Store shift |
//! | Schedule | Camp week | Roster period | Weekly rota |

mod constraint;
mod employee;
mod role;
mod schedule;
mod shift;

pub use constraint::{WorkConstraint, WorkConstraintType};
pub use employee::{Employee, SkillLevel};
pub use role::Role;
pub use schedule::Schedule;
pub use shift::{Shift, ShiftType};
