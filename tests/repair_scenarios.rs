//! End-to-end repair runs on small, hand-checked rooms

use pretty_assertions::assert_eq;

use pocket_planner::layout::report::pass_explanation;
use pocket_planner::layout::rules::{DOOR_CLEARANCE, NO_OVERLAP, WALKWAY};
use pocket_planner::{
    check_all_hard_constraints, clearance, optimize, optimize_request, overlap, BoundingBox,
    Decision, EngineConfig, IterationController, Layout, LayoutGraph, OptimizeRequest,
    RoomDimensions, RoomObject,
};

fn bb(x: f64, y: f64, w: f64, h: f64) -> BoundingBox {
    BoundingBox::new(x, y, w, h)
}

fn rules_hit(layout: &Layout) -> Vec<&'static str> {
    check_all_hard_constraints(layout, &EngineConfig::default())
        .iter()
        .map(|v| v.rule)
        .collect()
}

#[test]
fn test_desk_blocking_door_is_moved_clear() {
    let request = OptimizeRequest::from_json(include_str!("fixtures/desk_on_door.json")).unwrap();
    let before = request.layout().unwrap();
    assert_eq!(rules_hit(&before), vec![NO_OVERLAP, DOOR_CLEARANCE]);

    let outcome = optimize_request(&request, &EngineConfig::default()).unwrap();

    assert_eq!(outcome.decision, Decision::StopSuccess);
    assert_eq!(outcome.iterations, 1);
    assert!(outcome.violations.is_empty());

    let desk = outcome.layout.get("desk_1").unwrap();
    let door = outcome.layout.get("door_1").unwrap();
    assert_eq!(desk.bbox, bb(115.0, 100.0, 80.0, 50.0));
    assert!(!overlap(&desk.bbox, &door.bbox));
    // Door keep-out is 10% of the 300-wide side
    assert!(clearance(&desk.bbox, &door.bbox) >= 30.0);

    let explanation = pass_explanation(&outcome.passes[0]);
    assert!(explanation.starts_with("Made 1 change(s). Score: "));
    assert!(explanation.ends_with("Moved desk (desk_1) from (25, 100) to (115, 100)"));
}

#[test]
fn test_request_is_not_mutated() {
    let request = OptimizeRequest::from_json(include_str!("fixtures/desk_on_door.json")).unwrap();
    let snapshot = request.clone();
    optimize_request(&request, &EngineConfig::default()).unwrap();
    assert_eq!(request, snapshot);
}

#[test]
fn test_locked_bed_never_moves() {
    let request = OptimizeRequest::from_json(include_str!("fixtures/locked_bed.json")).unwrap();
    let outcome = optimize_request(&request, &EngineConfig::default()).unwrap();

    let bed = outcome.layout.get("bed_1").unwrap();
    assert_eq!(bed.bbox, bb(30.0, 100.0, 100.0, 200.0));

    // The bed is the only thing in the door's way and it may not move
    assert_eq!(outcome.decision, Decision::StopExhausted);
    assert_eq!(outcome.iterations, 5);
    assert!(outcome.passes.iter().all(|p| p.moves.is_empty()));
    let rules: Vec<&str> = outcome.violations.iter().map(|v| v.rule).collect();
    assert_eq!(rules, vec![NO_OVERLAP, DOOR_CLEARANCE, WALKWAY]);
}

#[test]
fn test_locked_flag_on_object_is_honoured() {
    let outcome = optimize(
        r#"{
            "room_dimensions": {"width": 300, "height": 400},
            "objects": [
                {"id": "door_1", "label": "door", "bbox": [0, 100, 20, 80], "type": "structural"},
                {"id": "desk_1", "label": "desk", "bbox": [25, 100, 80, 50], "is_locked": true}
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(
        outcome.layout.get("desk_1").map(|o| o.bbox),
        Some(bb(25.0, 100.0, 80.0, 50.0))
    );
    assert_eq!(outcome.decision, Decision::StopExhausted);
}

#[test]
fn test_clean_layout_stops_without_solver() {
    let layout = Layout::new(
        RoomDimensions::new(300.0, 400.0),
        vec![
            RoomObject::structural("door_1", "door", bb(0.0, 100.0, 20.0, 80.0)),
            RoomObject::movable("bed_1", "bed", bb(150.0, 200.0, 100.0, 150.0)),
        ],
    )
    .unwrap();

    let graph = LayoutGraph::classify::<&str>(&layout, &[]);
    let mut controller = IterationController::new(graph, EngineConfig::default()).unwrap();
    let evaluation = controller.evaluate(&layout);
    assert!(evaluation.violations.is_empty());
    assert_eq!(evaluation.score.constraint_score, 100.0);
    assert_eq!(evaluation.decision, Decision::StopSuccess);
    assert_eq!(controller.iteration_count(), 0);

    let outcome = controller.run(layout.clone());
    assert!(outcome.passes.is_empty());
    assert_eq!(outcome.layout, layout);
}

#[test]
fn test_touching_objects_do_not_overlap() {
    let left = bb(50.0, 50.0, 40.0, 40.0);
    let right = bb(90.0, 50.0, 40.0, 40.0);
    assert!(!overlap(&left, &right));
    assert_eq!(clearance(&left, &right), 0.0);

    // Touching still breaks the minimum-clearance rule
    let layout = Layout::new(
        RoomDimensions::new(300.0, 400.0),
        vec![
            RoomObject::movable("crate_1", "crate", left),
            RoomObject::movable("crate_2", "crate", right),
        ],
    )
    .unwrap();
    assert_eq!(rules_hit(&layout), vec![NO_OVERLAP]);
}

#[test]
fn test_custom_budget_from_cli_style_override() {
    let mut request = OptimizeRequest::from_json(include_str!("fixtures/locked_bed.json")).unwrap();
    request.max_iterations = Some(2);
    let outcome = optimize_request(&request, &EngineConfig::default()).unwrap();
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.decision, Decision::StopExhausted);
}
