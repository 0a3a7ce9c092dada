//! Hard design rules evaluated against a layout.
//!
//! Every rule is a value implementing [`Rule`]; a [`RuleSet`] runs them in
//! registration order and concatenates their violations. The order is
//! stable and matters: the solver repairs violations in the order reported.

use std::fmt;

use serde::Serialize;

use super::config::EngineConfig;
use super::geometry::{bounds_overflow, clearance, overlap, within_bounds};
use super::types::{Layout, RoomObject};
use super::walkway::check_walkway;

/// Slack for comparing measured distances against thresholds
const EPSILON: f64 = 1e-9;

pub const NO_OVERLAP: &str = "no_overlap";
pub const BOUNDS: &str = "bounds";
pub const DOOR_CLEARANCE: &str = "door_clearance";
pub const WALKWAY: &str = "walkway";
pub const ADJACENCY: &str = "adjacency";

/// A breach of one hard rule. All hard rules are must-fix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintViolation {
    /// Identifier of the rule that raised it
    pub rule: &'static str,
    pub description: String,
    /// One or two object ids
    pub objects: Vec<String>,
}

impl ConstraintViolation {
    pub fn new(rule: &'static str, description: impl Into<String>, objects: Vec<String>) -> Self {
        Self {
            rule,
            description: description.into(),
            objects,
        }
    }

    pub fn involves(&self, id: &str) -> bool {
        self.objects.iter().any(|o| o == id)
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule, self.description)
    }
}

/// A hard rule: a pure check from a layout snapshot to its violations
pub trait Rule: Send + Sync {
    /// Identifier stamped on every violation this rule raises
    fn id(&self) -> &'static str;

    fn evaluate(&self, layout: &Layout, config: &EngineConfig) -> Vec<ConstraintViolation>;
}

/// Display name used in violation text, e.g. `desk (desk_1)`
fn name(obj: &RoomObject) -> String {
    format!("{} ({})", obj.label, obj.id)
}

// ── No-overlap ────────────────────────────────────────────────────

/// Every pair except structural-vs-structural keeps the minimum clearance
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverlapRule;

impl Rule for NoOverlapRule {
    fn id(&self) -> &'static str {
        NO_OVERLAP
    }

    fn evaluate(&self, layout: &Layout, config: &EngineConfig) -> Vec<ConstraintViolation> {
        let min = config.min_clearance.resolve(layout.room());
        let objects = layout.objects();
        let mut violations = Vec::new();

        for (i, a) in objects.iter().enumerate() {
            for b in &objects[i + 1..] {
                if a.is_structural() && b.is_structural() {
                    continue;
                }
                let gap = clearance(&a.bbox, &b.bbox);
                if gap >= min - EPSILON {
                    continue;
                }
                let description = if overlap(&a.bbox, &b.bbox) {
                    format!("{} overlaps {}", name(a), name(b))
                } else {
                    format!(
                        "{} is only {:.1} from {}; minimum clearance is {:.1}",
                        name(a),
                        gap,
                        name(b),
                        min
                    )
                };
                violations.push(ConstraintViolation::new(
                    NO_OVERLAP,
                    description,
                    vec![a.id.clone(), b.id.clone()],
                ));
            }
        }
        violations
    }
}

// ── Bounds ────────────────────────────────────────────────────────

/// Every object lies fully inside the room
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsRule;

impl Rule for BoundsRule {
    fn id(&self) -> &'static str {
        BOUNDS
    }

    fn evaluate(&self, layout: &Layout, _config: &EngineConfig) -> Vec<ConstraintViolation> {
        let room = layout.room();
        layout
            .objects()
            .iter()
            .filter(|o| !within_bounds(&o.bbox, room))
            .map(|o| {
                ConstraintViolation::new(
                    BOUNDS,
                    format!(
                        "{} extends {:.1} outside the room",
                        name(o),
                        bounds_overflow(&o.bbox, room)
                    ),
                    vec![o.id.clone()],
                )
            })
            .collect()
    }
}

// ── Door clearance ────────────────────────────────────────────────

/// Movable objects stay out of the keep-out zone around every door.
///
/// Locked furniture is checked too; the solver reports those violations
/// but has no legal move to fix them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoorClearanceRule;

impl Rule for DoorClearanceRule {
    fn id(&self) -> &'static str {
        DOOR_CLEARANCE
    }

    fn evaluate(&self, layout: &Layout, config: &EngineConfig) -> Vec<ConstraintViolation> {
        let required = config.door_clearance.resolve(layout.room());
        let objects = layout.objects();
        let mut violations = Vec::new();

        for door in objects.iter().filter(|o| o.is_door()) {
            for obj in objects.iter().filter(|o| !o.is_structural()) {
                let gap = clearance(&obj.bbox, &door.bbox);
                if gap >= required - EPSILON {
                    continue;
                }
                let description = if overlap(&obj.bbox, &door.bbox) {
                    format!("{} blocks {}", name(obj), name(door))
                } else {
                    format!(
                        "{} is {:.1} from {}; doors need {:.1} clear",
                        name(obj),
                        gap,
                        name(door),
                        required
                    )
                };
                violations.push(ConstraintViolation::new(
                    DOOR_CLEARANCE,
                    description,
                    vec![obj.id.clone(), door.id.clone()],
                ));
            }
        }
        violations
    }
}

// ── Walkway ───────────────────────────────────────────────────────

/// A straight corridor of the configured width runs from the entry door
/// to the far side of the room
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkwayRule;

impl Rule for WalkwayRule {
    fn id(&self) -> &'static str {
        WALKWAY
    }

    fn evaluate(&self, layout: &Layout, config: &EngineConfig) -> Vec<ConstraintViolation> {
        let width = config.walkway_width.resolve(layout.room());
        let Some(check) = check_walkway(layout, width) else {
            return Vec::new();
        };
        if check.is_clear() {
            return Vec::new();
        }

        // Name a blocker the solver can act on when there is one.
        let blocker = check
            .blockers
            .iter()
            .filter_map(|id| layout.get(id))
            .find(|o| !o.is_fixed())
            .or_else(|| check.blockers.first().and_then(|id| layout.get(id)));
        let door = layout.get(&check.door_id);
        let door_name = door.map(name).unwrap_or_else(|| check.door_id.clone());

        let violation = match blocker {
            Some(obj) => ConstraintViolation::new(
                WALKWAY,
                format!(
                    "no clear {:.1}-wide walkway from {} across the room; blocked by {}",
                    width,
                    door_name,
                    name(obj)
                ),
                vec![obj.id.clone(), check.door_id.clone()],
            ),
            None => ConstraintViolation::new(
                WALKWAY,
                format!(
                    "room is too narrow for a {:.1}-wide walkway from {}",
                    width, door_name
                ),
                vec![check.door_id.clone()],
            ),
        };
        vec![violation]
    }
}

// ── Adjacency ─────────────────────────────────────────────────────

/// Nightstands stay near a bed; seating stays near a desk or table
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjacencyRule;

/// One pairing requirement: members must sit within `reach` of some anchor
struct AdjacencyGroup {
    is_member: fn(&RoomObject) -> bool,
    is_anchor: fn(&RoomObject) -> bool,
    reach: f64,
    anchor_noun: &'static str,
}

fn adjacency_groups(layout: &Layout, config: &EngineConfig) -> [AdjacencyGroup; 2] {
    let room = layout.room();
    [
        AdjacencyGroup {
            is_member: RoomObject::is_nightstand,
            is_anchor: RoomObject::is_bed,
            reach: config.nightstand_reach.resolve(room),
            anchor_noun: "bed",
        },
        AdjacencyGroup {
            is_member: RoomObject::is_seating,
            is_anchor: RoomObject::is_surface,
            reach: config.seating_reach.resolve(room),
            anchor_noun: "work or dining surface",
        },
    ]
}

/// Each member of the group with its nearest anchor and the gap between them.
/// Empty when the layout has no anchor for the group.
fn member_gaps<'a>(
    layout: &'a Layout,
    group: &AdjacencyGroup,
) -> Vec<(&'a RoomObject, &'a RoomObject, f64)> {
    let anchors: Vec<&RoomObject> = layout
        .objects()
        .iter()
        .filter(|o| (group.is_anchor)(o))
        .collect();
    if anchors.is_empty() {
        return Vec::new();
    }
    layout
        .objects()
        .iter()
        .filter(|o| (group.is_member)(o))
        .filter_map(|member| nearest(member, &anchors).map(|(anchor, gap)| (member, anchor, gap)))
        .collect()
}

/// Closest anchor by clearance; the first one wins ties
fn nearest<'a>(obj: &RoomObject, anchors: &[&'a RoomObject]) -> Option<(&'a RoomObject, f64)> {
    let mut best: Option<(&'a RoomObject, f64)> = None;
    for anchor in anchors.iter().copied().filter(|a| a.id != obj.id) {
        let gap = clearance(&obj.bbox, &anchor.bbox);
        if best.map_or(true, |(_, g)| gap < g) {
            best = Some((anchor, gap));
        }
    }
    best
}

/// `(satisfied, checked)` over every adjacency pairing in the layout
pub(crate) fn adjacency_tally(layout: &Layout, config: &EngineConfig) -> (usize, usize) {
    let mut satisfied = 0;
    let mut checked = 0;
    for group in adjacency_groups(layout, config) {
        for (_, _, gap) in member_gaps(layout, &group) {
            checked += 1;
            if gap <= group.reach + EPSILON {
                satisfied += 1;
            }
        }
    }
    (satisfied, checked)
}

impl Rule for AdjacencyRule {
    fn id(&self) -> &'static str {
        ADJACENCY
    }

    fn evaluate(&self, layout: &Layout, config: &EngineConfig) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();
        for group in adjacency_groups(layout, config) {
            for (member, anchor, gap) in member_gaps(layout, &group) {
                if gap <= group.reach + EPSILON {
                    continue;
                }
                violations.push(ConstraintViolation::new(
                    ADJACENCY,
                    format!(
                        "{} is {:.1} from the nearest {} {}; keep within {:.1}",
                        name(member),
                        gap,
                        group.anchor_noun,
                        name(anchor),
                        group.reach
                    ),
                    vec![member.id.clone(), anchor.id.clone()],
                ));
            }
        }
        violations
    }
}

// ── Registry ──────────────────────────────────────────────────────

/// An ordered, open collection of rules
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    /// A rule set with no rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The built-in rules: no-overlap, bounds, door clearance, walkway, adjacency
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(NoOverlapRule)
            .with_rule(BoundsRule)
            .with_rule(DoorClearanceRule)
            .with_rule(WalkwayRule)
            .with_rule(AdjacencyRule)
    }

    /// Append a rule; it runs after every rule already registered
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.push(Box::new(rule));
        self
    }

    pub fn push(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Run every rule and concatenate the results in registration order
    pub fn evaluate(&self, layout: &Layout, config: &EngineConfig) -> Vec<ConstraintViolation> {
        self.rules
            .iter()
            .flat_map(|rule| rule.evaluate(layout, config))
            .collect()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.rule_ids())
            .finish()
    }
}

/// Run the standard rule set
pub fn check_all_hard_constraints(
    layout: &Layout,
    config: &EngineConfig,
) -> Vec<ConstraintViolation> {
    RuleSet::standard().evaluate(layout, config)
}
