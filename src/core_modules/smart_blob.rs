// THEORY:
// The `smart_blob` module holds the per-frame description of a candidate target.
// A `BoundingBox` is the raw geometric output of the blob detector; a `Blob` is a
// box that survived the size filter, paired with the centroid the controller
// steers on.
//
// Key architectural principles:
// 1.  **Stateless Data Container**: A `Blob` represents a region within a single
//     frame. It has no id and no memory of where it was before; the controller
//     deliberately keeps no tracking history.
// 2.  **Integer Geometry**: Everything is in whole pixels. The centroid uses
//     integer division, so a 41 px wide box centered on column 320 reports 320,
//     not 320.5.

use serde::Serialize;

/// A 2D pixel coordinate. Signed so offsets from the frame center can be taken directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box enclosing one connected mask region. `width` and `height` are always > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// `(x + width / 2, y + height / 2)`.
    pub fn centroid(&self) -> Point {
        Point {
            x: (self.x + self.width / 2) as i32,
            y: (self.y + self.height / 2) as i32,
        }
    }
}

/// A size-qualified region believed to be the tracked object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Blob {
    pub bounding_box: BoundingBox,
    pub centroid: Point,
}

impl From<BoundingBox> for Blob {
    fn from(bounding_box: BoundingBox) -> Self {
        Self {
            centroid: bounding_box.centroid(),
            bounding_box,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_uses_integer_halves() {
        assert_eq!(BoundingBox::new(305, 225, 40, 40).centroid(), Point::new(325, 245));
        assert_eq!(BoundingBox::new(50, 200, 40, 40).centroid(), Point::new(70, 220));
        assert_eq!(BoundingBox::new(0, 0, 41, 11).centroid(), Point::new(20, 5));
    }

    #[test]
    fn blob_carries_its_box_centroid() {
        let blob = Blob::from(BoundingBox::new(10, 20, 100, 50));
        assert_eq!(blob.centroid, Point::new(60, 45));
        assert_eq!(blob.bounding_box.width, 100);
    }
}
