// THEORY:
// Centering is pure bang-bang control. The centroid is compared with the frame
// center and a fixed dead-zone, and the result is one of five discrete zones;
// there is no notion of "how far" beyond the zone itself.
//
// The precedence of the checks is part of the contract: horizontal error is
// always corrected before vertical error. A target that is both far right and
// far up is `Right`, never `Forward`. Only one action is taken per frame, so the
// order decides which one.

use crate::core_modules::smart_blob::Point;
use serde::Serialize;

pub const DEFAULT_DEAD_ZONE: i32 = 30;

/// Where the target sits relative to the frame center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ControlZone {
    Centered,
    Right,
    Left,
    Forward,
    Backward,
}

/// Classifies `centroid` against `frame_center`.
///
/// Checks run in this order and the first match wins:
/// 1. both axes strictly inside the dead-zone: `Centered`
/// 2. `cx - cx0 > dead_zone`: `Right`
/// 3. `cx0 - cx > dead_zone`: `Left`
/// 4. `cy0 - cy > dead_zone`: `Forward` (target above center)
/// 5. `cy - cy0 > dead_zone`: `Backward`
///
/// Anything left over (an offset of exactly `dead_zone` on some axis) falls back
/// to `Centered`. Use [`is_on_target`] to tell that fallback apart from case 1.
pub fn classify(centroid: Point, frame_center: Point, dead_zone: i32) -> ControlZone {
    let dx = centroid.x - frame_center.x;
    let dy = centroid.y - frame_center.y;

    if is_on_target(centroid, frame_center, dead_zone) {
        ControlZone::Centered
    } else if dx > dead_zone {
        ControlZone::Right
    } else if -dx > dead_zone {
        ControlZone::Left
    } else if -dy > dead_zone {
        ControlZone::Forward
    } else if dy > dead_zone {
        ControlZone::Backward
    } else {
        ControlZone::Centered
    }
}

/// True when both offsets are strictly smaller than the dead-zone.
pub fn is_on_target(centroid: Point, frame_center: Point, dead_zone: i32) -> bool {
    (centroid.x - frame_center.x).abs() < dead_zone && (centroid.y - frame_center.y).abs() < dead_zone
}
