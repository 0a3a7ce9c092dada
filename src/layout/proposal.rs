//! Generator proposals: merge onto a base layout, filter, repair, rank
//!
//! A layout generator suggests new boxes and orientations for some
//! objects. Each suggestion becomes a fresh snapshot of the base layout;
//! snapshots that break too many rules are dropped, and the rest go
//! through the iteration controller before being ranked by final score.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ConfigError, InputError};

use super::config::EngineConfig;
use super::controller::{IterationController, OptimizationOutcome};
use super::graph::LayoutGraph;
use super::rules::RuleSet;
use super::types::{BoundingBox, Layout};

/// New placement for one object. Absent fields keep the base value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedPlacement {
    pub id: String,
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
    /// Degrees; any value, normalized into 0..360 when applied
    #[serde(default)]
    pub orientation: Option<f64>,
}

/// A named set of placements, e.g. one styled variation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "layout")]
    pub objects: Vec<ProposedPlacement>,
}

/// Fold an arbitrary angle into whole degrees in `0..360`
fn normalize_orientation(degrees: f64) -> Option<u16> {
    if !degrees.is_finite() {
        return None;
    }
    let whole = degrees.round().rem_euclid(360.0);
    Some((whole as u16) % 360)
}

/// Apply a proposal to a copy of `base`.
///
/// Only movable objects change. Entries for locked or unknown ids are
/// skipped with a warning. The merged layout is validated again, so a
/// malformed proposed box is an error.
pub fn apply_proposal(
    base: &Layout,
    proposal: &Proposal,
    graph: &LayoutGraph,
) -> Result<Layout, InputError> {
    let mut updates: HashMap<&str, &ProposedPlacement> = HashMap::new();
    for placement in &proposal.objects {
        if base.get(&placement.id).is_none() {
            warn!(
                proposal = %proposal.name,
                id = %placement.id,
                "proposal names an unknown object"
            );
            continue;
        }
        if !graph.is_movable(&placement.id) {
            warn!(
                proposal = %proposal.name,
                id = %placement.id,
                "proposal tried to move a locked object"
            );
            continue;
        }
        // Later entries for the same id win
        updates.insert(placement.id.as_str(), placement);
    }

    let mut objects = base.objects().to_vec();
    for obj in &mut objects {
        let Some(placement) = updates.get(obj.id.as_str()) else {
            continue;
        };
        if let Some(bbox) = placement.bbox {
            obj.bbox = bbox;
        }
        if let Some(degrees) = placement.orientation {
            match normalize_orientation(degrees) {
                Some(orientation) => obj.orientation = orientation,
                None => warn!(id = %obj.id, degrees, "ignoring non-finite orientation"),
            }
        }
    }

    Layout::new(base.room(), objects)
}

/// Why a proposal was dropped before repair
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// The merged layout failed validation
    Invalid(InputError),
    /// More violations than the repair budget is meant for
    TooManyViolations { count: usize, limit: usize },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Invalid(err) => write!(f, "invalid layout: {}", err),
            RejectReason::TooManyViolations { count, limit } => {
                write!(f, "{} violations exceed the limit of {}", count, limit)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedProposal {
    pub name: String,
    pub reason: RejectReason,
}

/// A proposal that survived filtering, after repair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedVariation {
    pub name: String,
    pub description: Option<String>,
    /// Violations of the merged layout before any repair
    pub initial_violations: usize,
    pub outcome: OptimizationOutcome,
}

impl RankedVariation {
    pub fn total_score(&self) -> f64 {
        self.outcome.final_score.total_score
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ranking {
    /// Best first; equal scores keep proposal order
    pub variations: Vec<RankedVariation>,
    pub rejected: Vec<RejectedProposal>,
}

/// Merge, filter, repair, and rank generator proposals against one base layout.
///
/// Every proposal gets its own snapshot and controller, so one
/// proposal's repair never leaks into another's. An invalid `config`
/// fails before any proposal is looked at.
pub fn rank_proposals<S: AsRef<str>>(
    base: &Layout,
    proposals: &[Proposal],
    user_locked_ids: &[S],
    config: &EngineConfig,
) -> Result<Ranking, ConfigError> {
    config.validate()?;
    let graph = LayoutGraph::classify(base, user_locked_ids);
    let rules = RuleSet::standard();
    let mut ranking = Ranking::default();

    for proposal in proposals {
        let layout = match apply_proposal(base, proposal, &graph) {
            Ok(layout) => layout,
            Err(err) => {
                warn!(proposal = %proposal.name, error = %err, "rejected proposal");
                ranking.rejected.push(RejectedProposal {
                    name: proposal.name.clone(),
                    reason: RejectReason::Invalid(err),
                });
                continue;
            }
        };

        let count = rules.evaluate(&layout, config).len();
        if count > config.max_repairable_violations {
            info!(proposal = %proposal.name, violations = count, "rejected proposal");
            ranking.rejected.push(RejectedProposal {
                name: proposal.name.clone(),
                reason: RejectReason::TooManyViolations {
                    count,
                    limit: config.max_repairable_violations,
                },
            });
            continue;
        }

        let outcome = IterationController::new(graph.clone(), config.clone())?.run(layout);
        info!(
            proposal = %proposal.name,
            score = outcome.final_score.total_score,
            iterations = outcome.iterations,
            "ranked proposal"
        );
        ranking.variations.push(RankedVariation {
            name: proposal.name.clone(),
            description: proposal.description.clone(),
            initial_violations: count,
            outcome,
        });
    }

    ranking
        .variations
        .sort_by(|a, b| b.total_score().total_cmp(&a.total_score()));
    Ok(ranking)
}
