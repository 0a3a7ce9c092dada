//! Layout engine
//!
//! Validated room snapshots, the geometry and rules that judge them, and
//! the scoring, solver, and controller that repair them.

pub mod config;
pub mod controller;
pub mod geometry;
pub mod graph;
pub mod proposal;
pub mod report;
pub mod rules;
pub mod scoring;
pub mod solver;
pub mod types;
pub mod walkway;

pub use config::{Distance, EngineConfig, ScoreWeights};
pub use controller::{
    optimize_layout, Decision, Evaluation, IterationController, OptimizationOutcome,
};
pub use geometry::{clearance, overlap, within_bounds};
pub use graph::LayoutGraph;
pub use proposal::{apply_proposal, rank_proposals, Proposal, ProposedPlacement, Ranking};
pub use rules::{check_all_hard_constraints, ConstraintViolation, Rule, RuleSet};
pub use scoring::{score_layout, score_with_violations, LayoutScore};
pub use solver::{LocalSearchSolver, Move, PassReport};
pub use types::*;
