//! Engine configuration.
//!
//! All tunables of the scorer, the validators and the local search live in
//! [`SchedulerConfig`]. Every field has a default, so a JSON document only
//! needs to name what it overrides:
//!
//! ```
//! use u_shift::config::SchedulerConfig;
//!
//! let config = SchedulerConfig::from_json_str(
//!     r#"{ "weights": { "skill_match": 0.4, "preference": 0.2 }, "max_stale_iterations": 20 }"#,
//! ).unwrap();
//! assert_eq!(config.max_stale_iterations, 20);
//! assert!((config.weights.workload_balance - 0.2).abs() < 1e-10);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Weights of the assignment score components.
///
/// Must sum to at most 1.0; the remaining mass is left for the
/// constraint penalty, which is subtracted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub skill_match: f64,
    pub preference: f64,
    pub workload_balance: f64,
    /// Counted toward the sum limit; not applied to any score component.
    pub continuity: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skill_match: 0.4,
            preference: 0.25,
            workload_balance: 0.2,
            continuity: 0.15,
        }
    }
}

impl ScoringWeights {
    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.skill_match + self.preference + self.workload_balance + self.continuity
    }

    /// Checks that every weight is finite, non-negative, and that they sum to ≤ 1.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("skill_match", self.skill_match),
            ("preference", self.preference),
            ("workload_balance", self.workload_balance),
            ("continuity", self.continuity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }
        let sum = self.sum();
        if sum > 1.0 + 1e-9 {
            return Err(ConfigError::WeightsExceedOne(sum));
        }
        Ok(())
    }
}

/// System-wide rest and consecutive-day defaults.
///
/// Per-employee `MinRestHours` / `MaxConsecutiveDays` constraints can only
/// make these stricter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakRules {
    /// Minimum hours between the end of one shift and the start of the next.
    ///
    /// Also applies between two shifts on the same day, so split shifts
    /// (09-13 plus 14-18) need this lowered to be staffed by one employee.
    pub min_rest_hours: f64,
    /// Maximum run of consecutive working days.
    pub max_consecutive_days: u32,
}

impl Default for BreakRules {
    fn default() -> Self {
        Self {
            min_rest_hours: 8.0,
            max_consecutive_days: 6,
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Score component weights.
    pub weights: ScoringWeights,
    /// Rest and consecutive-day defaults.
    pub break_rules: BreakRules,
    /// Local search stops after this many iterations without improvement.
    pub max_stale_iterations: usize,
    /// Candidates tried per understaffed shift by the reassignment move.
    pub reassign_candidates: usize,
    /// Employees above `overload_factor × average hours` are overloaded.
    pub overload_factor: f64,
    /// Employees below `underload_factor × average hours` are underloaded.
    pub underload_factor: f64,
    /// Utilization the workload score is centred on.
    pub target_utilization: f64,
    /// Schedule score deduction per understaffed shift.
    pub understaffed_penalty: f64,
    /// Assignment score deduction per violation.
    pub violation_penalty: f64,
    /// Assignment score deduction per warning.
    pub warning_penalty: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            break_rules: BreakRules::default(),
            max_stale_iterations: 100,
            reassign_candidates: 3,
            overload_factor: 1.2,
            underload_factor: 0.8,
            target_utilization: 0.8,
            understaffed_penalty: 0.5,
            violation_penalty: 0.5,
            warning_penalty: 0.1,
        }
    }
}

impl SchedulerConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the scoring weights.
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the break rules.
    pub fn with_break_rules(mut self, break_rules: BreakRules) -> Self {
        self.break_rules = break_rules;
        self
    }

    /// Sets the stale-iteration limit.
    pub fn with_max_stale_iterations(mut self, iterations: usize) -> Self {
        self.max_stale_iterations = iterations;
        self
    }

    /// Checks every field for a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;

        let rules = &self.break_rules;
        if !rules.min_rest_hours.is_finite() || rules.min_rest_hours < 0.0 {
            return Err(out_of_range("break_rules.min_rest_hours", "must be >= 0"));
        }
        if rules.max_consecutive_days == 0 {
            return Err(out_of_range(
                "break_rules.max_consecutive_days",
                "must be at least 1",
            ));
        }
        if self.reassign_candidates == 0 {
            return Err(out_of_range("reassign_candidates", "must be at least 1"));
        }
        if !(self.overload_factor.is_finite() && self.overload_factor > 0.0) {
            return Err(out_of_range("overload_factor", "must be > 0"));
        }
        if !(self.underload_factor.is_finite() && self.underload_factor > 0.0) {
            return Err(out_of_range("underload_factor", "must be > 0"));
        }
        if self.underload_factor >= self.overload_factor {
            return Err(out_of_range(
                "underload_factor",
                "must be below overload_factor",
            ));
        }
        if !(self.target_utilization > 0.0 && self.target_utilization <= 1.0) {
            return Err(out_of_range("target_utilization", "must be in (0, 1]"));
        }
        for (name, value) in [
            ("understaffed_penalty", self.understaffed_penalty),
            ("violation_penalty", self.violation_penalty),
            ("warning_penalty", self.warning_penalty),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(out_of_range(name, "must be >= 0"));
            }
        }
        Ok(())
    }
}

fn out_of_range(name: &'static str, reason: &str) -> ConfigError {
    ConfigError::OutOfRange {
        name,
        reason: reason.to_string(),
    }
}
