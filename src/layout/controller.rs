//! Bounded evaluate/repair loop
//!
//! ```text
//! evaluate ──► decide ──► stop_success | stop_exhausted
//!    ▲            │
//!    │        continue
//!    └── repair ◄─┘
//! ```
//!
//! Success is checked before exhaustion, so a pass that reaches the
//! threshold on the last allowed iteration still counts as a success.

use serde::Serialize;
use tracing::info;

use crate::error::ConfigError;

use super::config::EngineConfig;
use super::graph::LayoutGraph;
use super::rules::{ConstraintViolation, RuleSet};
use super::scoring::{score_with_violations, LayoutScore};
use super::solver::{LocalSearchSolver, PassReport};
use super::types::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Run another repair pass
    Continue,
    /// No violations, or the score reached the threshold
    StopSuccess,
    /// Iteration budget spent with violations remaining
    StopExhausted,
}

impl Decision {
    pub fn should_continue(self) -> bool {
        self == Decision::Continue
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Continue => "continue",
            Decision::StopSuccess => "stop_success",
            Decision::StopExhausted => "stop_exhausted",
        }
    }
}

/// Violations, score, and verdict for one layout snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Passes completed when this snapshot was evaluated
    pub iteration: u32,
    pub violations: Vec<ConstraintViolation>,
    pub score: LayoutScore,
    pub decision: Decision,
}

impl Evaluation {
    pub fn should_continue(&self) -> bool {
        self.decision.should_continue()
    }
}

/// Final state of a controller run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationOutcome {
    pub layout: Layout,
    pub violations: Vec<ConstraintViolation>,
    pub initial_score: LayoutScore,
    pub final_score: LayoutScore,
    /// Repair passes run
    pub iterations: u32,
    /// Always a stop decision
    pub decision: Decision,
    pub passes: Vec<PassReport>,
}

impl OptimizationOutcome {
    pub fn is_success(&self) -> bool {
        self.decision == Decision::StopSuccess
    }

    pub fn improvement(&self) -> f64 {
        self.final_score.total_score - self.initial_score.total_score
    }
}

/// Drives evaluate/repair cycles until success or the iteration budget runs out
#[derive(Debug)]
pub struct IterationController {
    config: EngineConfig,
    rules: RuleSet,
    graph: LayoutGraph,
    iteration_count: u32,
    initial_score: Option<LayoutScore>,
}

impl IterationController {
    /// A controller using the standard rule set.
    ///
    /// Fails when `config` does not pass [`EngineConfig::validate`].
    pub fn new(graph: LayoutGraph, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rules: RuleSet::standard(),
            graph,
            iteration_count: 0,
            initial_score: None,
        })
    }

    /// Replace the rule set
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> &LayoutGraph {
        &self.graph
    }

    /// Repair passes run so far
    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    /// Score of the first snapshot this controller evaluated
    pub fn initial_score(&self) -> Option<&LayoutScore> {
        self.initial_score.as_ref()
    }

    /// Check a snapshot and decide whether another pass should run.
    ///
    /// Has no effect on the layout. The first call records the initial score.
    pub fn evaluate(&mut self, layout: &Layout) -> Evaluation {
        let violations = self.rules.evaluate(layout, &self.config);
        let score = score_with_violations(layout, &violations, &self.config);
        if self.initial_score.is_none() {
            self.initial_score = Some(score.clone());
        }
        let decision = self.decide(violations.len(), &score);
        info!(
            iteration = self.iteration_count,
            violations = violations.len(),
            score = score.total_score,
            decision = decision.as_str(),
            "evaluated layout"
        );
        Evaluation {
            iteration: self.iteration_count,
            violations,
            score,
            decision,
        }
    }

    fn decide(&self, violation_count: usize, score: &LayoutScore) -> Decision {
        if violation_count == 0 || score.total_score >= self.config.success_threshold {
            Decision::StopSuccess
        } else if self.iteration_count >= self.config.max_iterations {
            Decision::StopExhausted
        } else {
            Decision::Continue
        }
    }

    /// Run one repair pass and count it.
    ///
    /// Call only after [`evaluate`](Self::evaluate) returned `Continue` for
    /// `layout`; [`run`](Self::run) does this for you.
    pub fn repair(
        &mut self,
        layout: Layout,
        violations: &[ConstraintViolation],
    ) -> (Layout, PassReport) {
        let solver = LocalSearchSolver::new(&self.graph, &self.rules, &self.config);
        let (layout, report) = solver.repair_pass(layout, violations);
        self.iteration_count += 1;
        info!(
            iteration = self.iteration_count,
            moves = report.moves.len(),
            score = report.score_after.total_score,
            "repair pass finished"
        );
        (layout, report)
    }

    /// Evaluate and repair until a stop decision
    pub fn run(mut self, layout: Layout) -> OptimizationOutcome {
        let mut layout = layout;
        let mut passes = Vec::new();

        loop {
            let evaluation = self.evaluate(&layout);
            if !evaluation.should_continue() {
                let initial_score = self
                    .initial_score
                    .take()
                    .unwrap_or_else(|| evaluation.score.clone());
                return OptimizationOutcome {
                    layout,
                    violations: evaluation.violations,
                    initial_score,
                    final_score: evaluation.score,
                    iterations: self.iteration_count,
                    decision: evaluation.decision,
                    passes,
                };
            }
            let (next, report) = self.repair(layout, &evaluation.violations);
            layout = next;
            passes.push(report);
        }
    }
}

/// Classify, then run a controller with the standard rules
pub fn optimize_layout<S: AsRef<str>>(
    layout: Layout,
    user_locked_ids: &[S],
    config: &EngineConfig,
) -> Result<OptimizationOutcome, ConfigError> {
    let graph = LayoutGraph::classify(&layout, user_locked_ids);
    Ok(IterationController::new(graph, config.clone())?.run(layout))
}
