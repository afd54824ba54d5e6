//! Employee model.
//!
//! Employees are the people the engine assigns to shifts. Each employee
//! carries ranked skills, certifications, hour limits, weekday
//! availability and shift-type preferences.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::ShiftType;

/// Ordered proficiency tier.
///
/// Ordering follows declaration order: `Beginner < Intermediate < Advanced < Expert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    /// Numeric rank used by scoring (1 = Beginner, 4 = Expert).
    #[inline]
    pub fn rank(self) -> u8 {
        match self {
            SkillLevel::Beginner => 1,
            SkillLevel::Intermediate => 2,
            SkillLevel::Advanced => 3,
            SkillLevel::Expert => 4,
        }
    }
}

/// A person that can be assigned to shifts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    /// Unique employee identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Skills with proficiency levels.
    pub skills: BTreeMap<String, SkillLevel>,
    /// Held certifications.
    pub certifications: BTreeSet<String>,
    /// Hard daily hour limit.
    pub max_hours_per_day: f64,
    /// Hard weekly (ISO week) hour limit.
    pub max_hours_per_week: f64,
    /// Weekdays the employee is normally available.
    pub available_days: HashSet<Weekday>,
    /// Shift types the employee prefers to work.
    pub preferred_shift_types: HashSet<ShiftType>,
}

impl Employee {
    /// Creates an employee with 8h/day, 40h/week limits and no skills.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            skills: BTreeMap::new(),
            certifications: BTreeSet::new(),
            max_hours_per_day: 8.0,
            max_hours_per_week: 40.0,
            available_days: HashSet::new(),
            preferred_shift_types: HashSet::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds (or replaces) a skill.
    pub fn with_skill(mut self, name: impl Into<String>, level: SkillLevel) -> Self {
        self.skills.insert(name.into(), level);
        self
    }

    /// Adds a certification.
    pub fn with_certification(mut self, certification: impl Into<String>) -> Self {
        self.certifications.insert(certification.into());
        self
    }

    /// Sets the daily and weekly hour limits.
    ///
    /// # Panics
    /// If `per_day > per_week`.
    pub fn with_max_hours(mut self, per_day: f64, per_week: f64) -> Self {
        assert!(
            per_day <= per_week,
            "max_hours_per_day ({per_day}) exceeds max_hours_per_week ({per_week})"
        );
        self.max_hours_per_day = per_day;
        self.max_hours_per_week = per_week;
        self
    }

    /// Marks a weekday as available.
    pub fn with_available_day(mut self, day: Weekday) -> Self {
        self.available_days.insert(day);
        self
    }

    /// Marks every weekday in `days` as available.
    pub fn with_available_days(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.available_days.extend(days);
        self
    }

    /// Adds a preferred shift type.
    pub fn with_preferred_shift_type(mut self, shift_type: ShiftType) -> Self {
        self.preferred_shift_types.insert(shift_type);
        self
    }

    /// Proficiency for a skill, if held.
    pub fn skill_level(&self, skill: &str) -> Option<SkillLevel> {
        self.skills.get(skill).copied()
    }

    /// Whether the employee holds `skill` at `minimum` or better.
    pub fn meets_skill(&self, skill: &str, minimum: SkillLevel) -> bool {
        self.skill_level(skill).is_some_and(|level| level >= minimum)
    }

    /// Whether the employee holds a certification.
    pub fn has_certification(&self, certification: &str) -> bool {
        self.certifications.contains(certification)
    }

    /// Whether the employee is normally available on `day`.
    pub fn is_available_on(&self, day: Weekday) -> bool {
        self.available_days.contains(&day)
    }

    /// Whether `shift_type` is among the employee's preferences.
    pub fn prefers(&self, shift_type: ShiftType) -> bool {
        self.preferred_shift_types.contains(&shift_type)
    }
}
