//! Core types for the layout engine

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// A 2D point in the room coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in the room's coordinate space.
///
/// Producers use either percentage space (0-100 per axis) or pixel space;
/// the engine only assumes a consistent unit. On the wire a box is the
/// array `[x, y, width, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point of the bounding box
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Check if the interiors of two boxes intersect (shared edges do not count)
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Same extents, moved by (dx, dy)
    pub fn translated(&self, dx: f64, dy: f64) -> BoundingBox {
        BoundingBox::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Same extents, placed at (x, y)
    pub fn moved_to(&self, x: f64, y: f64) -> BoundingBox {
        BoundingBox::new(x, y, self.width, self.height)
    }

    /// True when all fields are finite and the extents are positive
    pub fn is_well_formed(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Check this box on behalf of the object `id`
    pub fn validate(&self, id: &str) -> Result<(), InputError> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(InputError::invalid_size(id, self.width, self.height));
        }
        if !(self.x.is_finite() && self.y.is_finite()) {
            return Err(InputError::non_finite(id, self.x, self.y));
        }
        Ok(())
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from([x, y, width, height]: [f64; 4]) -> Self {
        Self::new(x, y, width, height)
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x, b.y, b.width, b.height]
    }
}

/// Whether the solver may ever reposition an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    #[default]
    Movable,
    /// Walls, doors, windows: fixed by the building
    Structural,
}

fn default_z_index() -> i32 {
    1
}

/// A furniture item or structural element placed in the room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomObject {
    /// Unique within a layout, e.g. `bed_1`
    pub id: String,
    /// Free-text type such as `bed`, `desk`, `door`
    pub label: String,
    pub bbox: BoundingBox,
    #[serde(rename = "type", default)]
    pub kind: ObjectKind,
    /// Degrees about the object's own center. Does not change `bbox`.
    #[serde(default)]
    pub orientation: u16,
    #[serde(default, alias = "is_locked")]
    pub locked: bool,
    /// Render-order hint, ignored by geometry
    #[serde(default = "default_z_index")]
    pub z_index: i32,
}

impl RoomObject {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        bbox: BoundingBox,
        kind: ObjectKind,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            bbox,
            kind,
            orientation: 0,
            locked: false,
            z_index: default_z_index(),
        }
    }

    /// Create a movable object
    pub fn movable(id: impl Into<String>, label: impl Into<String>, bbox: BoundingBox) -> Self {
        Self::new(id, label, bbox, ObjectKind::Movable)
    }

    /// Create a structural object
    pub fn structural(id: impl Into<String>, label: impl Into<String>, bbox: BoundingBox) -> Self {
        Self::new(id, label, bbox, ObjectKind::Structural)
    }

    /// Set the locked flag
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Set the orientation in degrees
    pub fn with_orientation(mut self, orientation: u16) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn is_structural(&self) -> bool {
        self.kind == ObjectKind::Structural
    }

    /// Structural or flagged as locked
    pub fn is_fixed(&self) -> bool {
        self.is_structural() || self.locked
    }

    fn label_has(&self, needle: &str) -> bool {
        self.label.to_lowercase().contains(needle)
    }

    /// Whole-word match, so "indoor plant" is not a door
    fn label_has_word(&self, words: &[&str]) -> bool {
        self.label
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .any(|token| words.contains(&token))
    }

    /// Only structural objects count, so a "2-door wardrobe" stays furniture
    pub fn is_door(&self) -> bool {
        self.is_structural() && self.label_has_word(&["door", "doors", "doorway", "entrance"])
    }

    pub fn is_window(&self) -> bool {
        self.is_structural() && self.label_has_word(&["window", "windows"])
    }

    pub fn is_nightstand(&self) -> bool {
        self.label_has("nightstand") || self.label_has("bedside")
    }

    pub fn is_bed(&self) -> bool {
        !self.is_nightstand()
            && self.label_has_word(&["bed", "beds", "daybed", "sofabed", "bunkbed"])
    }

    /// Chairs and stools, which belong next to a desk or table
    pub fn is_seating(&self) -> bool {
        self.label_has("chair") || self.label_has("stool")
    }

    /// Desks and tables that seating groups around
    pub fn is_surface(&self) -> bool {
        (self.label_has("desk") || self.label_has("table")) && !self.is_nightstand()
    }

    pub fn is_wall(&self) -> bool {
        self.is_structural() && self.label_has_word(&["wall", "walls"])
    }

    /// Openings, walls, and rugs leave the floor walkable
    pub fn blocks_floor(&self) -> bool {
        !(self.is_door()
            || self.is_window()
            || self.is_wall()
            || self.label_has_word(&["rug", "rugs", "mat", "carpet"]))
    }
}

/// Room size in the same unit as the object boxes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomDimensions {
    #[serde(alias = "width_estimate")]
    pub width: f64,
    #[serde(alias = "height_estimate")]
    pub height: f64,
}

impl RoomDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The smaller of width and height
    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        let ok = self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0;
        if ok {
            Ok(())
        } else {
            Err(InputError::InvalidRoom {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// A validated snapshot of a room: dimensions plus objects in producer order.
///
/// Every pass of the engine consumes one snapshot and produces another;
/// nothing is shared between snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    room: RoomDimensions,
    objects: Vec<RoomObject>,
}

impl Layout {
    /// Validate and wrap a set of objects.
    ///
    /// Objects outside the room are accepted here; the bounds rule reports them.
    pub fn new(room: RoomDimensions, objects: Vec<RoomObject>) -> Result<Self, InputError> {
        room.validate()?;

        let mut seen = HashSet::new();
        for (index, obj) in objects.iter().enumerate() {
            if obj.id.trim().is_empty() {
                return Err(InputError::MissingField { index, field: "id" });
            }
            if obj.label.trim().is_empty() {
                return Err(InputError::MissingField {
                    index,
                    field: "label",
                });
            }
            obj.bbox.validate(&obj.id)?;
            if obj.orientation >= 360 {
                return Err(InputError::InvalidOrientation {
                    id: obj.id.clone(),
                    orientation: obj.orientation,
                });
            }
            if !seen.insert(obj.id.as_str()) {
                return Err(InputError::duplicate(&obj.id));
            }
        }

        Ok(Self { room, objects })
    }

    pub fn room(&self) -> RoomDimensions {
        self.room
    }

    pub fn objects(&self) -> &[RoomObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Look up an object by id
    pub fn get(&self, id: &str) -> Option<&RoomObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    pub fn into_objects(self) -> Vec<RoomObject> {
        self.objects
    }

    /// Reposition the object at `index`, keeping its extents.
    ///
    /// Only the solver calls this, after checking the object is movable.
    pub(crate) fn move_object(&mut self, index: usize, x: f64, y: f64) {
        if let Some(obj) = self.objects.get_mut(index) {
            obj.bbox = obj.bbox.moved_to(x, y);
        }
    }
}
