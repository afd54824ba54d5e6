//! Role model.
//!
//! A role bundles the skill and certification requirements a shift
//! places on whoever works it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::SkillLevel;

/// Named bundle of required and preferred skills.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Role {
    /// Role name (e.g., "coach", "lifeguard").
    pub name: String,
    /// Mandatory skills with minimum rank.
    pub required_skills: BTreeMap<String, SkillLevel>,
    /// Mandatory certifications.
    pub required_certifications: BTreeSet<String>,
    /// Bonus skills (never mandatory).
    pub preferred_skills: BTreeMap<String, SkillLevel>,
}

impl Role {
    /// Creates a role without requirements.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds a required skill.
    pub fn with_required_skill(mut self, skill: impl Into<String>, minimum: SkillLevel) -> Self {
        self.required_skills.insert(skill.into(), minimum);
        self
    }

    /// Adds a required certification.
    pub fn with_required_certification(mut self, certification: impl Into<String>) -> Self {
        self.required_certifications.insert(certification.into());
        self
    }

    /// Adds a preferred skill.
    pub fn with_preferred_skill(mut self, skill: impl Into<String>, level: SkillLevel) -> Self {
        self.preferred_skills.insert(skill.into(), level);
        self
    }

    /// Number of required skills.
    pub fn required_skill_count(&self) -> usize {
        self.required_skills.len()
    }
}
