//! Pocket Planner - furniture layout checking and repair
//!
//! This library validates a room layout (a rectangle of axis-aligned
//! furniture boxes), reports design-rule violations, scores it, and
//! nudges movable furniture until the layout is clean or the iteration
//! budget runs out.
//!
//! # Example
//!
//! ```rust
//! use pocket_planner::optimize;
//!
//! let outcome = optimize(r#"{
//!     "room_dimensions": {"width": 300, "height": 400},
//!     "objects": [
//!         {"id": "door_1", "label": "door", "bbox": [0, 100, 20, 80], "type": "structural"},
//!         {"id": "desk_1", "label": "desk", "bbox": [25, 100, 80, 50]}
//!     ]
//! }"#).unwrap();
//!
//! assert!(outcome.is_success());
//! assert!(outcome.violations.is_empty());
//! ```

pub mod error;
pub mod layout;

pub use error::{ConfigError, InputError};
pub use layout::{
    check_all_hard_constraints, clearance, optimize_layout, overlap, rank_proposals,
    score_layout, within_bounds, BoundingBox, ConstraintViolation, Decision, Distance,
    EngineConfig, IterationController, Layout, LayoutGraph, LayoutScore, ObjectKind,
    OptimizationOutcome, Proposal, Ranking, RoomDimensions, RoomObject,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur in the request pipeline
#[derive(Debug, Error)]
pub enum PlannerError {
    /// The request is not valid JSON or is missing fields
    #[error("invalid request: {0}")]
    Request(#[from] serde_json::Error),

    /// The request parsed but describes an impossible layout
    #[error("invalid layout: {0}")]
    Input(#[from] InputError),

    /// The engine configuration fails validation
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// A layout to check or repair, as producers send it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub room_dimensions: RoomDimensions,
    #[serde(alias = "current_layout")]
    pub objects: Vec<RoomObject>,
    /// Ids the solver must not move, on top of structural and flagged objects
    #[serde(default, alias = "locked_ids")]
    pub locked_object_ids: Vec<String>,
    /// Overrides the configured pass budget
    #[serde(default)]
    pub max_iterations: Option<u32>,
    /// Generator variations to rank instead of repairing the layout itself
    #[serde(default)]
    pub proposals: Vec<Proposal>,
}

impl OptimizeRequest {
    pub fn from_json(source: &str) -> Result<Self, PlannerError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Validate the objects into a layout snapshot
    pub fn layout(&self) -> Result<Layout, InputError> {
        Layout::new(self.room_dimensions, self.objects.clone())
    }

    /// `config` with this request's overrides applied
    pub fn effective_config(&self, config: &EngineConfig) -> EngineConfig {
        match self.max_iterations {
            Some(n) => config.clone().with_max_iterations(n),
            None => config.clone(),
        }
    }
}

/// Optimizer result in the shape clients consume
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizeResponse {
    pub new_layout: Vec<RoomObject>,
    pub explanation: String,
    pub constraint_violations: Vec<String>,
    pub score: LayoutScore,
    pub decision: Decision,
    pub iterations: u32,
}

impl From<&OptimizationOutcome> for OptimizeResponse {
    fn from(outcome: &OptimizationOutcome) -> Self {
        let explanation = match outcome.passes.last() {
            Some(pass) => layout::report::pass_explanation(pass),
            None => layout::report::format_violations(&outcome.violations),
        };
        Self {
            new_layout: outcome.layout.objects().to_vec(),
            explanation,
            constraint_violations: outcome.violations.iter().map(|v| v.to_string()).collect(),
            score: outcome.final_score.clone(),
            decision: outcome.decision,
            iterations: outcome.iterations,
        }
    }
}

/// Repair a JSON request with the default configuration
pub fn optimize(source: &str) -> Result<OptimizationOutcome, PlannerError> {
    optimize_with_config(source, &EngineConfig::default())
}

/// Repair a JSON request with a custom configuration
pub fn optimize_with_config(
    source: &str,
    config: &EngineConfig,
) -> Result<OptimizationOutcome, PlannerError> {
    let request = OptimizeRequest::from_json(source)?;
    optimize_request(&request, config)
}

/// Repair an already-parsed request. The request itself is left untouched.
pub fn optimize_request(
    request: &OptimizeRequest,
    config: &EngineConfig,
) -> Result<OptimizationOutcome, PlannerError> {
    let layout = request.layout()?;
    let config = request.effective_config(config);
    Ok(optimize_layout(layout, &request.locked_object_ids, &config)?)
}

/// Rank a request's generator proposals against its layout
pub fn rank_request(
    request: &OptimizeRequest,
    config: &EngineConfig,
) -> Result<Ranking, PlannerError> {
    let layout = request.layout()?;
    let config = request.effective_config(config);
    Ok(rank_proposals(
        &layout,
        &request.proposals,
        &request.locked_object_ids,
        &config,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESK_ON_DOOR: &str = r#"{
        "room_dimensions": {"width_estimate": 300, "height_estimate": 400},
        "current_layout": [
            {"id": "door_1", "label": "door", "bbox": [0, 100, 20, 80], "type": "structural"},
            {"id": "desk_1", "label": "desk", "bbox": [25, 100, 80, 50], "type": "movable"}
        ],
        "locked_object_ids": []
    }"#;

    #[test]
    fn test_optimize_repairs_desk() {
        let outcome = optimize(DESK_ON_DOOR).unwrap();
        assert_eq!(outcome.decision, Decision::StopSuccess);
        assert_eq!(outcome.iterations, 1);
        let desk = outcome.layout.get("desk_1").unwrap();
        assert_eq!(desk.bbox, BoundingBox::new(115.0, 100.0, 80.0, 50.0));
    }

    #[test]
    fn test_request_aliases() {
        let request = OptimizeRequest::from_json(DESK_ON_DOOR).unwrap();
        assert_eq!(request.room_dimensions, RoomDimensions::new(300.0, 400.0));
        assert_eq!(request.objects.len(), 2);
        assert!(request.proposals.is_empty());
    }

    #[test]
    fn test_max_iterations_override() {
        let mut request = OptimizeRequest::from_json(DESK_ON_DOOR).unwrap();
        request.max_iterations = Some(0);
        let outcome = optimize_request(&request, &EngineConfig::default()).unwrap();
        assert_eq!(outcome.decision, Decision::StopExhausted);
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn test_malformed_json_is_request_error() {
        let err = optimize("{ not json").unwrap_err();
        assert!(matches!(err, PlannerError::Request(_)));
    }

    #[test]
    fn test_invalid_room_is_input_error() {
        let err = optimize(r#"{"room_dimensions": {"width": 0, "height": 10}, "objects": []}"#)
            .unwrap_err();
        assert!(matches!(err, PlannerError::Input(InputError::InvalidRoom { .. })));
    }

    #[test]
    fn test_builder_config_is_validated() {
        let config = EngineConfig::default().with_step_multipliers(vec![]);
        let err = optimize_with_config(DESK_ON_DOOR, &config).unwrap_err();
        assert!(matches!(
            err,
            PlannerError::Config(ConfigError::Invalid { field: "step_multipliers", .. })
        ));
    }

    #[test]
    fn test_response_from_outcome() {
        let outcome = optimize(DESK_ON_DOOR).unwrap();
        let response = OptimizeResponse::from(&outcome);
        assert!(response.constraint_violations.is_empty());
        assert!(response.explanation.starts_with("Made 1 change(s)."));
        assert_eq!(response.new_layout.len(), 2);
    }
}
