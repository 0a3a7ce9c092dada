//! Local-search repair of constraint violations
//!
//! One pass walks the violations in reported order. For each movable
//! participant it tries a fixed set of shifted positions (four step
//! sizes times eight directions) and keeps the feasible one with the most
//! clearance to everything else. This is a greedy heuristic, not an
//! optimizer: a pass can leave violations in place or trade one for another.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use super::config::EngineConfig;
use super::geometry::{clearance, overlap, within_bounds};
use super::graph::LayoutGraph;
use super::rules::{ConstraintViolation, RuleSet};
use super::scoring::{score_with_violations, LayoutScore};
use super::types::{Layout, Point};

/// Search directions: the four axes, then the four diagonals.
/// Diagonals are not normalized, so a diagonal step covers more ground.
const DIRECTIONS: [(f64, f64); 8] = [
    (1.0, 0.0),
    (0.0, 1.0),
    (-1.0, 0.0),
    (0.0, -1.0),
    (1.0, 1.0),
    (1.0, -1.0),
    (-1.0, 1.0),
    (-1.0, -1.0),
];

// ============================================================================
// Pass results
// ============================================================================

/// One committed repositioning
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Move {
    pub object_id: String,
    pub label: String,
    /// Top-left corner before the move
    pub from: Point,
    /// Top-left corner after the move
    pub to: Point,
}

/// A position the solver found for an object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub position: Point,
    /// Smallest clearance to any other object; infinite in an otherwise empty room
    pub min_clearance: f64,
}

/// What one repair pass did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassReport {
    /// Committed moves in the order they were made
    pub moves: Vec<Move>,
    /// Violations none of whose participants moved during the pass
    pub unresolved: Vec<ConstraintViolation>,
    /// Total score of the layout the pass started from
    pub score_before: f64,
    /// Score of the layout the pass produced
    pub score_after: LayoutScore,
}

impl PassReport {
    pub fn made_changes(&self) -> bool {
        !self.moves.is_empty()
    }

    pub fn improvement(&self) -> f64 {
        self.score_after.total_score - self.score_before
    }
}

// ============================================================================
// Solver
// ============================================================================

/// Greedy repositioning of movable objects
#[derive(Debug, Clone, Copy)]
pub struct LocalSearchSolver<'a> {
    graph: &'a LayoutGraph,
    rules: &'a RuleSet,
    config: &'a EngineConfig,
}

impl<'a> LocalSearchSolver<'a> {
    pub fn new(graph: &'a LayoutGraph, rules: &'a RuleSet, config: &'a EngineConfig) -> Self {
        Self {
            graph,
            rules,
            config,
        }
    }

    /// Run one repair pass over `violations` and return the updated layout.
    ///
    /// Locked objects never move. Each movable object moves at most once
    /// per pass; later passes see the effect and may move it again.
    pub fn repair_pass(
        &self,
        layout: Layout,
        violations: &[ConstraintViolation],
    ) -> (Layout, PassReport) {
        let score_before = score_with_violations(&layout, violations, self.config).total_score;
        let mut layout = layout;
        let mut moves = Vec::new();
        let mut moved: HashSet<String> = HashSet::new();

        for violation in violations {
            for id in &violation.objects {
                if moved.contains(id) || !self.may_move(&layout, id) {
                    continue;
                }
                let Some(index) = layout.index_of(id) else {
                    continue;
                };
                let Some(candidate) = self.find_better_position(&layout, index) else {
                    debug!(object = %id, rule = violation.rule, "no feasible position");
                    continue;
                };

                let obj = &layout.objects()[index];
                let record = Move {
                    object_id: obj.id.clone(),
                    label: obj.label.clone(),
                    from: Point::new(obj.bbox.x, obj.bbox.y),
                    to: candidate.position,
                };
                debug!(
                    object = %record.object_id,
                    rule = violation.rule,
                    from_x = record.from.x,
                    from_y = record.from.y,
                    to_x = record.to.x,
                    to_y = record.to.y,
                    clearance = candidate.min_clearance,
                    "moved object"
                );
                layout.move_object(index, candidate.position.x, candidate.position.y);
                moved.insert(record.object_id.clone());
                moves.push(record);
            }
        }

        let unresolved = violations
            .iter()
            .filter(|v| !v.objects.iter().any(|id| moved.contains(id)))
            .cloned()
            .collect();

        let after = self.rules.evaluate(&layout, self.config);
        let score_after = score_with_violations(&layout, &after, self.config);

        let report = PassReport {
            moves,
            unresolved,
            score_before,
            score_after,
        };
        (layout, report)
    }

    /// Best shifted position for the object at `index`, if any is feasible.
    ///
    /// Feasible means inside the room and overlapping nothing else. Among
    /// feasible positions the one with the largest minimum clearance wins;
    /// ties go to the first tried (smaller step, then direction order).
    pub fn find_better_position(&self, layout: &Layout, index: usize) -> Option<Candidate> {
        let obj = layout.objects().get(index)?;
        let room = layout.room();
        let others: Vec<_> = layout
            .objects()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, o)| &o.bbox)
            .collect();

        let mut best: Option<Candidate> = None;
        for distance in self.config.step_distances(room) {
            for (dx, dy) in DIRECTIONS {
                let candidate = obj.bbox.translated(dx * distance, dy * distance);
                if !within_bounds(&candidate, room) {
                    continue;
                }
                if others.iter().any(|other| overlap(&candidate, other)) {
                    continue;
                }
                let min_clearance = others
                    .iter()
                    .map(|other| clearance(&candidate, other))
                    .fold(f64::INFINITY, f64::min);
                if best.map_or(true, |b| min_clearance > b.min_clearance) {
                    best = Some(Candidate {
                        position: Point::new(candidate.x, candidate.y),
                        min_clearance,
                    });
                }
            }
        }
        best
    }

    fn may_move(&self, layout: &Layout, id: &str) -> bool {
        self.graph.is_movable(id) && layout.get(id).is_some_and(|o| !o.is_fixed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::rules::check_all_hard_constraints;
    use crate::layout::types::{BoundingBox, RoomDimensions, RoomObject};

    fn bb(x: f64, y: f64, w: f64, h: f64) -> BoundingBox {
        BoundingBox::new(x, y, w, h)
    }

    fn layout(objects: Vec<RoomObject>) -> Layout {
        Layout::new(RoomDimensions::new(300.0, 400.0), objects).unwrap()
    }

    fn run_pass(l: Layout, locked: &[&str]) -> (Layout, PassReport) {
        let config = EngineConfig::default();
        let rules = RuleSet::standard();
        let graph = LayoutGraph::classify(&l, locked);
        let violations = rules.evaluate(&l, &config);
        LocalSearchSolver::new(&graph, &rules, &config).repair_pass(l, &violations)
    }

    #[test]
    fn test_desk_moves_off_door() {
        let l = layout(vec![
            RoomObject::structural("door_1", "door", bb(0.0, 100.0, 20.0, 80.0)),
            RoomObject::movable("desk_1", "desk", bb(25.0, 100.0, 80.0, 50.0)),
        ]);
        let (after, report) = run_pass(l, &[]);

        // Step 9 on a 300x400 room; the largest step straight right wins
        assert_eq!(report.moves.len(), 1);
        assert_eq!(report.moves[0].to, Point::new(115.0, 100.0));
        assert_eq!(
            after.get("desk_1").map(|o| o.bbox),
            Some(bb(115.0, 100.0, 80.0, 50.0))
        );
        assert_eq!(
            after.get("door_1").map(|o| o.bbox),
            Some(bb(0.0, 100.0, 20.0, 80.0))
        );
        assert!(report.unresolved.is_empty());
        assert!(check_all_hard_constraints(&after, &EngineConfig::default()).is_empty());
        assert!(report.improvement() > 0.0);
    }

    #[test]
    fn test_locked_objects_stay_put() {
        let bed = bb(30.0, 100.0, 100.0, 200.0);
        let l = layout(vec![
            RoomObject::structural("door_1", "door", bb(0.0, 100.0, 20.0, 80.0)),
            RoomObject::movable("bed_1", "bed", bed),
        ]);
        let (after, report) = run_pass(l, &["bed_1"]);
        assert!(report.moves.is_empty());
        assert_eq!(after.get("bed_1").map(|o| o.bbox), Some(bed));
        assert!(!report.unresolved.is_empty());
    }

    #[test]
    fn test_flagged_object_is_never_moved() {
        let desk = bb(25.0, 100.0, 80.0, 50.0);
        let l = layout(vec![
            RoomObject::structural("door_1", "door", bb(0.0, 100.0, 20.0, 80.0)),
            RoomObject::movable("desk_1", "desk", desk).with_locked(true),
        ]);
        let (after, report) = run_pass(l, &[]);
        assert!(report.moves.is_empty());
        assert_eq!(after.get("desk_1").map(|o| o.bbox), Some(desk));
    }

    #[test]
    fn test_object_moves_once_per_pass() {
        let l = layout(vec![
            RoomObject::structural("door_1", "door", bb(0.0, 100.0, 20.0, 80.0)),
            RoomObject::movable("desk_1", "desk", bb(25.0, 100.0, 80.0, 50.0)),
        ]);
        let (_, report) = run_pass(l, &[]);
        let desk_moves = report
            .moves
            .iter()
            .filter(|m| m.object_id == "desk_1")
            .count();
        assert_eq!(desk_moves, 1);
    }

    #[test]
    fn test_no_feasible_position_in_tight_room() {
        // The table fills the room; every shift leaves the bounds.
        let l = Layout::new(
            RoomDimensions::new(100.0, 100.0),
            vec![
                RoomObject::movable("table_1", "table", bb(0.0, 0.0, 100.0, 100.0)),
                RoomObject::movable("lamp_1", "lamp", bb(40.0, 40.0, 10.0, 10.0)),
            ],
        )
        .unwrap();
        let config = EngineConfig::default();
        let rules = RuleSet::standard();
        let graph = LayoutGraph::classify::<&str>(&l, &[]);
        let solver = LocalSearchSolver::new(&graph, &rules, &config);
        assert_eq!(solver.find_better_position(&l, 0), None);
        // The lamp can move but stays inside the table wherever it goes
        assert_eq!(solver.find_better_position(&l, 1), None);
    }

    #[test]
    fn test_lone_object_has_infinite_clearance() {
        let l = layout(vec![RoomObject::movable("chair_1", "chair", bb(100.0, 100.0, 30.0, 30.0))]);
        let config = EngineConfig::default();
        let rules = RuleSet::standard();
        let graph = LayoutGraph::classify::<&str>(&l, &[]);
        let candidate = LocalSearchSolver::new(&graph, &rules, &config)
            .find_better_position(&l, 0)
            .unwrap();
        // Every candidate ties; the first (one step right) is kept
        assert_eq!(candidate.position, Point::new(109.0, 100.0));
        assert!(candidate.min_clearance.is_infinite());
    }

    #[test]
    fn test_empty_violation_list_is_a_no_op() {
        let l = layout(vec![RoomObject::movable("bed_1", "bed", bb(100.0, 100.0, 100.0, 150.0))]);
        let config = EngineConfig::default();
        let rules = RuleSet::standard();
        let graph = LayoutGraph::classify::<&str>(&l, &[]);
        let (after, report) =
            LocalSearchSolver::new(&graph, &rules, &config).repair_pass(l.clone(), &[]);
        assert_eq!(after, l);
        assert!(!report.made_changes());
    }
}
