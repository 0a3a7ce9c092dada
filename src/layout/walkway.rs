//! Swept-corridor check for a clear walkway from the entry door
//!
//! The entry door is the first object labeled as a door. A corridor of
//! the configured width runs from the door's wall straight across to the
//! opposite wall; it may slide sideways as long as its centerline stays
//! within the door opening. This is a free-space sweep, not pathfinding.

use super::types::{BoundingBox, Layout, RoomDimensions, RoomObject};

/// Wall of the room a door sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Left,
    Right,
    Top,
    Bottom,
}

impl Wall {
    /// Walls whose corridor runs horizontally across the room
    fn is_vertical(self) -> bool {
        matches!(self, Wall::Left | Wall::Right)
    }
}

/// Result of sweeping the corridor for one door
#[derive(Debug, Clone, PartialEq)]
pub struct WalkwayCheck {
    pub door_id: String,
    pub wall: Wall,
    /// A clear corridor, if any position works
    pub corridor: Option<BoundingBox>,
    /// Objects in the way of the corridor centered on the door, in layout order
    pub blockers: Vec<String>,
}

impl WalkwayCheck {
    pub fn is_clear(&self) -> bool {
        self.corridor.is_some()
    }
}

/// The door walkways are measured from
pub fn entry_door(layout: &Layout) -> Option<&RoomObject> {
    layout.objects().iter().find(|o| o.is_door())
}

/// The wall nearest to a box
pub fn nearest_wall(bbox: &BoundingBox, room: RoomDimensions) -> Wall {
    let distances = [
        (Wall::Left, bbox.x),
        (Wall::Right, room.width - bbox.right()),
        (Wall::Top, bbox.y),
        (Wall::Bottom, room.height - bbox.bottom()),
    ];
    let mut best = distances[0];
    for candidate in &distances[1..] {
        if candidate.1 < best.1 {
            best = *candidate;
        }
    }
    best.0
}

/// Sweep a corridor of `width` from the entry door. `None` when the room has no door.
pub fn check_walkway(layout: &Layout, width: f64) -> Option<WalkwayCheck> {
    let door = entry_door(layout)?;
    let room = layout.room();
    let wall = nearest_wall(&door.bbox, room);

    let (door_lo, door_hi, extent) = if wall.is_vertical() {
        (door.bbox.y, door.bbox.bottom(), room.height)
    } else {
        (door.bbox.x, door.bbox.right(), room.width)
    };

    let band = |offset: f64| {
        if wall.is_vertical() {
            BoundingBox::new(0.0, offset, room.width, width)
        } else {
            BoundingBox::new(offset, 0.0, width, room.height)
        }
    };

    let obstacles: Vec<&RoomObject> = layout
        .objects()
        .iter()
        .filter(|o| o.id != door.id && o.blocks_floor())
        .collect();

    let blockers_at = |corridor: &BoundingBox| -> Vec<String> {
        obstacles
            .iter()
            .filter(|o| o.bbox.intersects(corridor))
            .map(|o| o.id.clone())
            .collect()
    };

    if width.is_nan() || width <= 0.0 || width > extent {
        return Some(WalkwayCheck {
            door_id: door.id.clone(),
            wall,
            corridor: None,
            blockers: Vec::new(),
        });
    }

    let max_offset = extent - width;
    let lo = (door_lo - width / 2.0).clamp(0.0, max_offset);
    let hi = (door_hi - width / 2.0).clamp(0.0, max_offset);
    let centered = ((door_lo + door_hi) / 2.0 - width / 2.0).clamp(lo, hi);

    // A clear offset, if one exists, sits at a range end or flush against an obstacle.
    let mut offsets = vec![centered, lo, hi];
    for obstacle in &obstacles {
        let (start, end) = if wall.is_vertical() {
            (obstacle.bbox.y, obstacle.bbox.bottom())
        } else {
            (obstacle.bbox.x, obstacle.bbox.right())
        };
        for offset in [end, start - width] {
            if offset >= lo && offset <= hi {
                offsets.push(offset);
            }
        }
    }
    offsets.sort_by(|a, b| {
        (a - centered)
            .abs()
            .total_cmp(&(b - centered).abs())
            .then(a.total_cmp(b))
    });

    let corridor = offsets
        .into_iter()
        .map(&band)
        .find(|corridor| obstacles.iter().all(|o| !o.bbox.intersects(corridor)));

    let blockers = match corridor {
        Some(_) => Vec::new(),
        None => blockers_at(&band(centered)),
    };

    Some(WalkwayCheck {
        door_id: door.id.clone(),
        wall,
        corridor,
        blockers,
    })
}
