//! Composite quality score for a layout
//!
//! Three sub-scores on 0..=100, combined with the configured weights:
//!
//! - constraint: 100 minus a flat penalty per active violation
//! - walkability: how generous the tightest gap is, plus whether the
//!   entry walkway is clear
//! - preference: adjacency pairings that hold, plus how well the movable
//!   furniture is balanced around the room center
//!
//! Scoring is a pure function of the layout and config.

use serde::Serialize;

use super::config::EngineConfig;
use super::geometry::clearance;
use super::rules::{adjacency_tally, check_all_hard_constraints, ConstraintViolation};
use super::types::{Layout, RoomObject};
use super::walkway::check_walkway;

const CLEARANCE_SHARE: f64 = 0.6;
const PATH_SHARE: f64 = 0.4;
const ZONING_SHARE: f64 = 0.5;
const BALANCE_SHARE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutScore {
    pub total_score: f64,
    pub constraint_score: f64,
    pub walkability_score: f64,
    pub preference_score: f64,
    /// Human-readable summary of what drove the score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Score a layout against the standard rules
pub fn score_layout(layout: &Layout, config: &EngineConfig) -> LayoutScore {
    let violations = check_all_hard_constraints(layout, config);
    score_with_violations(layout, &violations, config)
}

/// Score a layout whose violations are already known
pub fn score_with_violations(
    layout: &Layout,
    violations: &[ConstraintViolation],
    config: &EngineConfig,
) -> LayoutScore {
    let constraint = constraint_score(violations.len(), config.violation_penalty);

    let tightest = tightest_pair(layout);
    let clearance_part = clearance_component(tightest.as_ref().map(|t| t.2), layout, config);
    let walkway = check_walkway(layout, config.walkway_width.resolve(layout.room()));
    let path_part = match &walkway {
        Some(check) if !check.is_clear() => 0.0,
        _ => 100.0,
    };
    let walkability = CLEARANCE_SHARE * clearance_part + PATH_SHARE * path_part;

    let (satisfied, checked) = adjacency_tally(layout, config);
    let zoning = if checked == 0 {
        100.0
    } else {
        100.0 * satisfied as f64 / checked as f64
    };
    let preference = ZONING_SHARE * zoning + BALANCE_SHARE * balance_score(layout);

    let w = config.weights;
    let weight_sum = w.constraint + w.walkability + w.preference;
    let total = if weight_sum > 0.0 {
        (w.constraint * constraint + w.walkability * walkability + w.preference * preference)
            / weight_sum
    } else {
        0.0
    };

    let mut notes = vec![match violations.len() {
        0 => "no violations".to_string(),
        n => format!("{} violation(s)", n),
    }];
    if let Some((a, b, gap)) = &tightest {
        notes.push(format!("tightest gap {:.1} between {} and {}", gap, a, b));
    }
    notes.push(match &walkway {
        None => "no entry door".to_string(),
        Some(check) if check.is_clear() => "walkway clear".to_string(),
        Some(_) => "walkway blocked".to_string(),
    });
    if checked > 0 {
        notes.push(format!("{}/{} pairings in reach", satisfied, checked));
    }

    LayoutScore {
        total_score: total.clamp(0.0, 100.0),
        constraint_score: constraint,
        walkability_score: walkability,
        preference_score: preference,
        explanation: Some(notes.join("; ")),
    }
}

fn constraint_score(violation_count: usize, penalty: f64) -> f64 {
    (100.0 - penalty * violation_count as f64).max(0.0)
}

/// The pair with the smallest clearance, structural pairs excepted
fn tightest_pair(layout: &Layout) -> Option<(String, String, f64)> {
    let objects = layout.objects();
    let mut best: Option<(&RoomObject, &RoomObject, f64)> = None;
    for (i, a) in objects.iter().enumerate() {
        for b in &objects[i + 1..] {
            if a.is_structural() && b.is_structural() {
                continue;
            }
            let gap = clearance(&a.bbox, &b.bbox);
            if best.map_or(true, |(_, _, g)| gap < g) {
                best = Some((a, b, gap));
            }
        }
    }
    best.map(|(a, b, gap)| (a.id.clone(), b.id.clone(), gap))
}

/// Full marks once the tightest gap reaches twice the minimum clearance
fn clearance_component(tightest: Option<f64>, layout: &Layout, config: &EngineConfig) -> f64 {
    let Some(gap) = tightest else {
        return 100.0;
    };
    let target = 2.0 * config.min_clearance.resolve(layout.room());
    if target <= 0.0 {
        return if gap >= 0.0 { 100.0 } else { 0.0 };
    }
    100.0 * (gap / target).clamp(0.0, 1.0)
}

/// 100 when the area-weighted centroid of movable furniture sits at the
/// room center, falling linearly to 0 at a corner
fn balance_score(layout: &Layout) -> f64 {
    let movable: Vec<&RoomObject> = layout
        .objects()
        .iter()
        .filter(|o| !o.is_structural())
        .collect();
    let total_area: f64 = movable.iter().map(|o| o.bbox.area()).sum();
    if movable.is_empty() || total_area <= 0.0 {
        return 100.0;
    }

    let (mut cx, mut cy) = (0.0, 0.0);
    for obj in &movable {
        let c = obj.bbox.center();
        let weight = obj.bbox.area() / total_area;
        cx += c.x * weight;
        cy += c.y * weight;
    }

    let room = layout.room();
    let center = room.center();
    let half_diagonal = (room.width.powi(2) + room.height.powi(2)).sqrt() / 2.0;
    let offset = ((cx - center.x).powi(2) + (cy - center.y).powi(2)).sqrt();
    (100.0 * (1.0 - offset / half_diagonal)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::ScoreWeights;
    use crate::layout::types::{BoundingBox, RoomDimensions};

    fn bb(x: f64, y: f64, w: f64, h: f64) -> BoundingBox {
        BoundingBox::new(x, y, w, h)
    }

    fn layout(objects: Vec<RoomObject>) -> Layout {
        Layout::new(RoomDimensions::new(300.0, 400.0), objects).unwrap()
    }

    fn door() -> RoomObject {
        RoomObject::structural("door_1", "door", bb(0.0, 100.0, 20.0, 80.0))
    }

    fn in_range(score: &LayoutScore) -> bool {
        [
            score.total_score,
            score.constraint_score,
            score.walkability_score,
            score.preference_score,
        ]
        .iter()
        .all(|s| (0.0..=100.0).contains(s))
    }

    #[test]
    fn test_clean_layout_scores_high() {
        let l = layout(vec![
            door(),
            RoomObject::movable("bed_1", "bed", bb(150.0, 200.0, 100.0, 150.0)),
        ]);
        let score = score_layout(&l, &EngineConfig::default());
        assert_eq!(score.constraint_score, 100.0);
        assert!((score.walkability_score - 100.0).abs() < 1e-9);
        assert!(score.total_score > 60.0);
        assert!(in_range(&score));
    }

    #[test]
    fn test_door_blocking_bed_scores_low() {
        let l = layout(vec![
            door(),
            RoomObject::movable("bed_1", "bed", bb(25.0, 100.0, 100.0, 200.0)),
        ]);
        let score = score_layout(&l, &EngineConfig::default());
        // no_overlap, door_clearance, walkway
        assert_eq!(score.constraint_score, 40.0);
        assert!(score.total_score < 80.0);
        assert!(score.walkability_score < 50.0);
        assert!(in_range(&score));
    }

    #[test]
    fn test_constraint_score_floors_at_zero() {
        assert_eq!(constraint_score(0, 20.0), 100.0);
        assert_eq!(constraint_score(3, 20.0), 40.0);
        assert_eq!(constraint_score(9, 20.0), 0.0);
    }

    #[test]
    fn test_empty_room_is_perfect() {
        let score = score_layout(&layout(vec![]), &EngineConfig::default());
        assert!((score.total_score - 100.0).abs() < 1e-9);
        assert_eq!(
            score.explanation.as_deref(),
            Some("no violations; no entry door")
        );
    }

    #[test]
    fn test_balance_centered_object() {
        let l = layout(vec![RoomObject::movable("rug_1", "rug", bb(100.0, 150.0, 100.0, 100.0))]);
        assert!((balance_score(&l) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_balance_ignores_structural() {
        let l = layout(vec![RoomObject::structural("wall_1", "wall", bb(0.0, 0.0, 10.0, 400.0))]);
        assert_eq!(balance_score(&l), 100.0);
    }

    #[test]
    fn test_unmet_pairing_lowers_preference() {
        let near = layout(vec![
            RoomObject::movable("bed_1", "bed", bb(100.0, 100.0, 100.0, 150.0)),
            RoomObject::movable("nightstand_1", "nightstand", bb(210.0, 100.0, 30.0, 30.0)),
        ]);
        let far = layout(vec![
            RoomObject::movable("bed_1", "bed", bb(100.0, 100.0, 100.0, 150.0)),
            RoomObject::movable("nightstand_1", "nightstand", bb(260.0, 360.0, 30.0, 30.0)),
        ]);
        let config = EngineConfig::default();
        let near_score = score_layout(&near, &config).preference_score;
        let far_score = score_layout(&far, &config).preference_score;
        assert!(near_score > far_score);
    }

    #[test]
    fn test_weights_are_normalized() {
        let l = layout(vec![
            door(),
            RoomObject::movable("bed_1", "bed", bb(25.0, 100.0, 100.0, 200.0)),
        ]);
        let mut config = EngineConfig::default();
        config.weights = ScoreWeights {
            constraint: 1.0,
            walkability: 0.0,
            preference: 0.0,
        };
        let score = score_layout(&l, &config);
        assert!((score.total_score - score.constraint_score).abs() < 1e-9);
    }

    #[test]
    fn test_scoring_is_repeatable() {
        let l = layout(vec![
            door(),
            RoomObject::movable("desk_1", "desk", bb(25.0, 100.0, 80.0, 50.0)),
        ]);
        let config = EngineConfig::default();
        assert_eq!(score_layout(&l, &config), score_layout(&l, &config));
    }

    #[test]
    fn test_explanation_mentions_walkway() {
        let l = layout(vec![
            door(),
            RoomObject::movable("bed_1", "bed", bb(25.0, 100.0, 100.0, 200.0)),
        ]);
        let score = score_layout(&l, &EngineConfig::default());
        let text = score.explanation.unwrap();
        assert!(text.starts_with("3 violation(s)"));
        assert!(text.contains("walkway blocked"));
    }
}
