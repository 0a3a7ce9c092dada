//! Geometry primitives on axis-aligned rectangles
//!
//! All functions are pure. They expect well-formed boxes (finite,
//! positive extents); `Layout::new` guarantees that for every object it
//! holds, so a malformed box reaching here is a caller bug.

use super::types::{BoundingBox, RoomDimensions};

/// Signed gaps between two boxes along each room axis.
///
/// Positive means separated along that axis, zero means touching,
/// negative means the projections overlap by that much.
pub fn axis_gaps(a: &BoundingBox, b: &BoundingBox) -> (f64, f64) {
    debug_assert!(a.is_well_formed(), "malformed bounding box {:?}", a);
    debug_assert!(b.is_well_formed(), "malformed bounding box {:?}", b);
    let dx = (b.x - a.right()).max(a.x - b.right());
    let dy = (b.y - a.bottom()).max(a.y - b.bottom());
    (dx, dy)
}

/// True iff the interiors of the two rectangles intersect.
///
/// Touching edges or corners are not overlap.
pub fn overlap(a: &BoundingBox, b: &BoundingBox) -> bool {
    let (dx, dy) = axis_gaps(a, b);
    dx < 0.0 && dy < 0.0
}

/// Minimum gap between the two boundaries along the room's axes.
///
/// Zero when the boxes touch, negative (the shallower penetration depth)
/// when they overlap.
pub fn clearance(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let (dx, dy) = axis_gaps(a, b);
    dx.max(dy)
}

/// True iff the box lies entirely inside `[0, width] x [0, height]`
pub fn within_bounds(bbox: &BoundingBox, room: RoomDimensions) -> bool {
    debug_assert!(bbox.is_well_formed(), "malformed bounding box {:?}", bbox);
    bbox.x >= 0.0 && bbox.y >= 0.0 && bbox.right() <= room.width && bbox.bottom() <= room.height
}

/// How far the box sticks out of the room, summed over all four walls
pub fn bounds_overflow(bbox: &BoundingBox, room: RoomDimensions) -> f64 {
    (-bbox.x).max(0.0)
        + (-bbox.y).max(0.0)
        + (bbox.right() - room.width).max(0.0)
        + (bbox.bottom() - room.height).max(0.0)
}
