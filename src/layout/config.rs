//! Configuration for the layout engine
//!
//! Every threshold, step size, and weight the engine uses lives here so
//! callers and tests can move edge thresholds deterministically.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::types::RoomDimensions;

/// A length that is either absolute or relative to the room
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distance {
    /// In the layout's own unit
    Absolute(f64),
    /// Fraction of the smaller room dimension
    Fraction(f64),
}

impl Distance {
    /// Resolve to the layout's unit for a given room
    pub fn resolve(&self, room: RoomDimensions) -> f64 {
        match *self {
            Distance::Absolute(v) => v,
            Distance::Fraction(f) => f * room.min_side(),
        }
    }

    fn value(&self) -> f64 {
        match *self {
            Distance::Absolute(v) | Distance::Fraction(v) => v,
        }
    }
}

/// Weights of the three sub-scores in the composite total
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub constraint: f64,
    pub walkability: f64,
    pub preference: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            constraint: 0.5,
            walkability: 0.3,
            preference: 0.2,
        }
    }
}

/// Configuration options for evaluation and repair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum gap between any two objects (structural pairs excepted)
    pub min_clearance: Distance,

    /// Keep-out distance around doors for movable objects
    pub door_clearance: Distance,

    /// Width of the straight corridor that must run from the entry door
    pub walkway_width: Distance,

    /// Maximum gap between a nightstand and the nearest bed
    pub nightstand_reach: Distance,

    /// Maximum gap between a seat and the nearest desk or table
    pub seating_reach: Distance,

    /// Base distance of one solver step
    pub move_step: Distance,

    /// Multiples of `move_step` tried by the solver, in order
    pub step_multipliers: Vec<f64>,

    /// Repair passes allowed before the controller gives up
    pub max_iterations: u32,

    /// Total score at which the controller stops early
    pub success_threshold: f64,

    /// Constraint sub-score lost per active violation
    pub violation_penalty: f64,

    pub weights: ScoreWeights,

    /// Generator proposals with more violations than this are discarded
    pub max_repairable_violations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_clearance: Distance::Fraction(0.05),
            door_clearance: Distance::Fraction(0.10),
            walkway_width: Distance::Fraction(0.15),
            nightstand_reach: Distance::Fraction(0.08),
            seating_reach: Distance::Fraction(0.12),
            move_step: Distance::Fraction(0.03),
            step_multipliers: vec![1.0, 2.0, 5.0, 10.0],
            max_iterations: 5,
            success_threshold: 95.0,
            violation_penalty: 20.0,
            weights: ScoreWeights::default(),
            max_repairable_violations: 3,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load a configuration from a TOML string. Missing keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the minimum clearance between objects
    pub fn with_min_clearance(mut self, distance: Distance) -> Self {
        self.min_clearance = distance;
        self
    }

    /// Set the keep-out distance around doors
    pub fn with_door_clearance(mut self, distance: Distance) -> Self {
        self.door_clearance = distance;
        self
    }

    /// Set the required walkway width
    pub fn with_walkway_width(mut self, distance: Distance) -> Self {
        self.walkway_width = distance;
        self
    }

    /// Set the solver's base step
    pub fn with_move_step(mut self, distance: Distance) -> Self {
        self.move_step = distance;
        self
    }

    /// Set the step multipliers tried by the solver
    pub fn with_step_multipliers(mut self, multipliers: Vec<f64>) -> Self {
        self.step_multipliers = multipliers;
        self
    }

    /// Set the repair pass budget
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the early-stop score threshold
    pub fn with_success_threshold(mut self, threshold: f64) -> Self {
        self.success_threshold = threshold;
        self
    }

    /// Set the flat per-violation penalty
    pub fn with_violation_penalty(mut self, penalty: f64) -> Self {
        self.violation_penalty = penalty;
        self
    }

    /// Set the proposal filter limit
    pub fn with_max_repairable_violations(mut self, limit: usize) -> Self {
        self.max_repairable_violations = limit;
        self
    }

    /// Solver step distances for a room, smallest first
    pub fn step_distances(&self, room: RoomDimensions) -> Vec<f64> {
        let base = self.move_step.resolve(room);
        self.step_multipliers.iter().map(|m| base * m).collect()
    }

    /// Check value ranges and the step progression
    pub fn validate(&self) -> Result<(), ConfigError> {
        let distances = [
            ("min_clearance", self.min_clearance),
            ("door_clearance", self.door_clearance),
            ("walkway_width", self.walkway_width),
            ("nightstand_reach", self.nightstand_reach),
            ("seating_reach", self.seating_reach),
        ];
        for (field, d) in distances {
            if !d.value().is_finite() || d.value() < 0.0 {
                return Err(ConfigError::invalid(field, "must be a finite, non-negative distance"));
            }
        }
        let positive = [
            ("walkway_width", self.walkway_width),
            ("move_step", self.move_step),
        ];
        for (field, d) in positive {
            if !d.value().is_finite() || d.value() <= 0.0 {
                return Err(ConfigError::invalid(field, "must be a finite, positive distance"));
            }
        }

        if self.step_multipliers.len() < 4 {
            return Err(ConfigError::invalid(
                "step_multipliers",
                format!(
                    "need at least 4 magnitudes, got {}",
                    self.step_multipliers.len()
                ),
            ));
        }
        if self.step_multipliers.iter().any(|m| !m.is_finite() || *m <= 0.0) {
            return Err(ConfigError::invalid("step_multipliers", "must all be positive"));
        }
        if self.step_multipliers.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ConfigError::invalid("step_multipliers", "must be strictly increasing"));
        }

        if !(0.0..=100.0).contains(&self.success_threshold) {
            return Err(ConfigError::invalid("success_threshold", "must lie in 0..=100"));
        }
        if !self.violation_penalty.is_finite() || self.violation_penalty < 0.0 {
            return Err(ConfigError::invalid("violation_penalty", "must be non-negative"));
        }
        let w = self.weights;
        if [w.constraint, w.walkability, w.preference]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(ConfigError::invalid("weights", "must all be non-negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.min_clearance, Distance::Fraction(0.05));
        assert_eq!(config.step_multipliers, vec![1.0, 2.0, 5.0, 10.0]);
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.success_threshold, 95.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::new()
            .with_max_iterations(2)
            .with_min_clearance(Distance::Absolute(4.0));

        assert_eq!(config.max_iterations, 2);
        assert_eq!(config.min_clearance, Distance::Absolute(4.0));
    }

    #[test]
    fn test_distance_resolve() {
        let room = RoomDimensions::new(300.0, 400.0);
        assert!((Distance::Fraction(0.05).resolve(room) - 15.0).abs() < 1e-9);
        assert_eq!(Distance::Absolute(7.0).resolve(room), 7.0);
    }

    #[test]
    fn test_step_distances_increase() {
        let room = RoomDimensions::new(100.0, 100.0);
        let steps = EngineConfig::default()
            .with_move_step(Distance::Absolute(3.0))
            .step_distances(room);
        assert_eq!(steps, vec![3.0, 6.0, 15.0, 30.0]);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = EngineConfig::from_toml(
            r#"
max_iterations = 8
min_clearance = { absolute = 12.0 }

[weights]
preference = 0.0
"#,
        )
        .unwrap();
        assert_eq!(config.max_iterations, 8);
        assert_eq!(config.min_clearance, Distance::Absolute(12.0));
        assert_eq!(config.weights.preference, 0.0);
        assert_eq!(config.weights.constraint, 0.5);
        assert_eq!(config.success_threshold, 95.0);
    }

    #[test]
    fn test_from_toml_rejects_short_step_progression() {
        let err = EngineConfig::from_toml("step_multipliers = [1.0, 2.0, 3.0]").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "step_multipliers", .. }));
    }

    #[test]
    fn test_from_toml_rejects_non_increasing_steps() {
        let err = EngineConfig::from_toml("step_multipliers = [1.0, 2.0, 2.0, 4.0]").unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn test_zero_walkway_width_is_rejected() {
        let err = EngineConfig::from_toml("walkway_width = { absolute = 0.0 }").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "walkway_width", .. }));
    }

    #[test]
    fn test_validate_catches_builder_mistakes() {
        let nan_width = EngineConfig::default().with_walkway_width(Distance::Fraction(f64::NAN));
        assert!(matches!(
            nan_width.validate(),
            Err(ConfigError::Invalid { field: "walkway_width", .. })
        ));

        let no_steps = EngineConfig::default().with_step_multipliers(vec![]);
        assert!(matches!(
            no_steps.validate(),
            Err(ConfigError::Invalid { field: "step_multipliers", .. })
        ));

        let infinite_step =
            EngineConfig::default().with_move_step(Distance::Absolute(f64::INFINITY));
        assert!(matches!(
            infinite_step.validate(),
            Err(ConfigError::Invalid { field: "move_step", .. })
        ));
    }

    #[test]
    fn test_from_toml_syntax_error() {
        let err = EngineConfig::from_toml("max_iterations = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
