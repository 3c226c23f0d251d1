// THEORY:
// Segmentation turns a color frame into the binary `Mask` the controller works
// on: every pixel whose HSV triple lies inside an inclusive range is set.
//
// The six range bounds are live-tunable parameters. They live in a `watch`
// channel; each frame takes one owned snapshot before thresholding, so a tuning
// update landing mid-frame can never mix old and new bounds within one mask.
// Validating the bounds is the job of whoever publishes them.

use crate::core_modules::mask::Mask;
use crate::core_modules::pixel::pixel::Pixel;
use image::RgbImage;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::watch;

/// Inclusive HSV bounds, each channel on the 8-bit scale (hue 0..180).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl Default for HsvRange {
    /// Saturated reds.
    fn default() -> Self {
        Self {
            lower: [0, 115, 0],
            upper: [5, 255, 255],
        }
    }
}

impl HsvRange {
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| self.lower[i] <= hsv[i] && hsv[i] <= self.upper[i])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HsvChannel {
    Hue = 0,
    Saturation = 1,
    Value = 2,
}

/// Shared, live-tunable segmentation parameters.
#[derive(Debug, Clone)]
pub struct ParameterHandle {
    sender: Arc<watch::Sender<HsvRange>>,
}

impl ParameterHandle {
    pub fn new(initial: HsvRange) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// An owned copy of the current bounds, for one frame.
    pub fn snapshot(&self) -> HsvRange {
        *self.sender.borrow()
    }

    pub fn update(&self, range: HsvRange) {
        self.sender.send_replace(range);
    }

    /// Changes a single one of the six bounds.
    pub fn set_channel(&self, bound: Bound, channel: HsvChannel, value: u8) {
        self.sender.send_modify(|range| match bound {
            Bound::Lower => range.lower[channel as usize] = value,
            Bound::Upper => range.upper[channel as usize] = value,
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<HsvRange> {
        self.sender.subscribe()
    }
}

impl Default for ParameterHandle {
    fn default() -> Self {
        Self::new(HsvRange::default())
    }
}

/// Thresholds `frame` against `range`.
pub fn segment(frame: &RgbImage, range: &HsvRange) -> Mask {
    Mask::from_fn(frame.width(), frame.height(), |x, y| {
        range.contains(Pixel::from(frame.get_pixel(x, y)).hsv())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn default_range_picks_saturated_red() {
        let range = HsvRange::default();
        assert!(range.contains(Pixel::new(220, 10, 10).hsv()));
        assert!(!range.contains(Pixel::new(10, 220, 10).hsv()));
        assert!(!range.contains(Pixel::new(220, 200, 200).hsv()));
    }

    #[test]
    fn segment_marks_only_matching_pixels() {
        let mut frame = RgbImage::from_pixel(64, 48, Rgb([30, 120, 30]));
        for y in 10..20 {
            for x in 5..45 {
                frame.put_pixel(x, y, Rgb([230, 20, 15]));
            }
        }
        let mask = segment(&frame, &HsvRange::default());
        assert_eq!(mask.count_set(), 400);
        assert!(mask.is_set(5, 10));
        assert!(!mask.is_set(4, 10));
    }

    #[test]
    fn bounds_are_inclusive() {
        let range = HsvRange {
            lower: [10, 20, 30],
            upper: [10, 20, 30],
        };
        assert!(range.contains([10, 20, 30]));
        assert!(!range.contains([11, 20, 30]));
    }

    #[test]
    fn snapshot_is_isolated_from_later_updates() {
        let params = ParameterHandle::default();
        let before = params.snapshot();
        params.set_channel(Bound::Upper, HsvChannel::Hue, 12);
        params.set_channel(Bound::Lower, HsvChannel::Value, 40);

        assert_eq!(before, HsvRange::default());
        let after = params.snapshot();
        assert_eq!(after.upper, [12, 255, 255]);
        assert_eq!(after.lower, [0, 115, 40]);
    }

    #[test]
    fn subscribers_see_updates() {
        let params = ParameterHandle::default();
        let mut receiver = params.subscribe();
        let green = HsvRange {
            lower: [50, 100, 50],
            upper: [70, 255, 255],
        };
        params.update(green);
        assert!(receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow_and_update(), green);
    }
}
