//! Plain-text reports for people reading optimizer results

use std::collections::HashMap;

use super::controller::OptimizationOutcome;
use super::rules::ConstraintViolation;
use super::solver::{Move, PassReport};
use super::types::Layout;

/// Fraction of a room side an object must travel before it is worth mentioning
const NOTABLE_SHIFT: f64 = 0.05;
/// Degrees of rotation worth mentioning
const NOTABLE_TURN: i32 = 10;

/// Format a violation list for display
pub fn format_violations(violations: &[ConstraintViolation]) -> String {
    if violations.is_empty() {
        return "No constraint violations detected.".to_string();
    }
    let mut lines = vec![format!("Found {} issue(s):", violations.len())];
    lines.extend(violations.iter().map(|v| format!("  - {}", v.description)));
    lines.join("\n")
}

/// One decimal, without a trailing `.0`
fn coord(value: f64) -> String {
    let text = format!("{:.1}", value);
    match text.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => text,
    }
}

fn signed(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.1}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn describe_move(m: &Move) -> String {
    format!(
        "Moved {} ({}) from ({}, {}) to ({}, {})",
        m.label,
        m.object_id,
        coord(m.from.x),
        coord(m.from.y),
        coord(m.to.x),
        coord(m.to.y)
    )
}

/// What a single repair pass changed
pub fn pass_explanation(report: &PassReport) -> String {
    if report.moves.is_empty() {
        return "Could not find a better position for the furniture.".to_string();
    }
    let header = format!(
        "Made {} change(s). Score: {:.1} → {:.1} ({})",
        report.moves.len(),
        report.score_before,
        report.score_after.total_score,
        signed(report.improvement())
    );
    let moves: Vec<String> = report.moves.iter().map(describe_move).collect();
    format!("{}\n\n{}", header, moves.join("\n"))
}

/// Overview of a whole controller run
pub fn summary(outcome: &OptimizationOutcome) -> String {
    let score = &outcome.final_score;
    [
        "=== Optimization Summary ===".to_string(),
        format!(
            "Outcome: {} after {} iteration(s)",
            outcome.decision.as_str(),
            outcome.iterations
        ),
        format!(
            "Initial score: {:.1}/100",
            outcome.initial_score.total_score
        ),
        format!("Final score: {:.1}/100", score.total_score),
        format!("Improvement: {}", signed(outcome.improvement())),
        "Breakdown:".to_string(),
        format!("  - Constraints: {:.1}/100", score.constraint_score),
        format!("  - Walkability: {:.1}/100", score.walkability_score),
        format!("  - Preferences: {:.1}/100", score.preference_score),
        format_violations(&outcome.violations),
    ]
    .join("\n")
}

/// Signed rotation from `from` to `to`, in -180..180
fn turn(from: u16, to: u16) -> i32 {
    (i32::from(to) - i32::from(from) + 540).rem_euclid(360) - 180
}

/// Room-relative instructions for every movable object that moved noticeably.
///
/// Shifts are reported as a percentage of the room side; positions by
/// which third of the room the object's corner now sits in.
pub fn describe_movements(original: &Layout, updated: &Layout) -> Vec<String> {
    let before: HashMap<&str, _> = original
        .objects()
        .iter()
        .map(|o| (o.id.as_str(), o))
        .collect();
    let room = updated.room();
    let mut lines = Vec::new();

    for obj in updated.objects().iter().filter(|o| !o.is_structural()) {
        let Some(old) = before.get(obj.id.as_str()) else {
            continue;
        };
        let dx = (obj.bbox.x - old.bbox.x) / room.width;
        let dy = (obj.bbox.y - old.bbox.y) / room.height;
        let rotation = turn(old.orientation, obj.orientation);

        let shifted_x = dx.abs() > NOTABLE_SHIFT;
        let shifted_y = dy.abs() > NOTABLE_SHIFT;
        let turned = rotation.abs() >= NOTABLE_TURN;
        if !(shifted_x || shifted_y || turned) {
            continue;
        }

        let column = match obj.bbox.x / room.width {
            f if f < 1.0 / 3.0 => "left side",
            f if f < 2.0 / 3.0 => "center",
            _ => "right side",
        };
        let row = match obj.bbox.y / room.height {
            f if f < 1.0 / 3.0 => "top/front",
            f if f < 2.0 / 3.0 => "middle",
            _ => "bottom/back",
        };

        let mut steps = Vec::new();
        if shifted_x {
            let side = if dx > 0.0 { "right" } else { "left" };
            steps.push(format!("{} by {:.0}%", side, dx.abs() * 100.0));
        }
        if shifted_y {
            let side = if dy > 0.0 { "down" } else { "up" };
            steps.push(format!("{} by {:.0}%", side, dy.abs() * 100.0));
        }
        let travel = if steps.is_empty() {
            "in place".to_string()
        } else {
            steps.join(" and ")
        };

        let mut line = format!(
            "Move {} to {}, {} of room ({})",
            obj.label.to_uppercase(),
            row,
            column,
            travel
        );
        if turned {
            line.push_str(&format!(", rotated {:+}°", rotation));
        }
        lines.push(line);
    }
    lines
}
