// THEORY:
// The `Mask` is the hand-off point between segmentation and control. Whatever
// produced it (our own HSV thresholding or an external camera stack), the core
// only ever sees a binary field: a pixel is either part of the target color or
// it is not.
//
// Like `Pixel`, the `Mask` is a "dumb" data container. It is immutable once
// built; the blob detector borrows it for the duration of one frame and keeps
// nothing afterwards.

use image::{GrayImage, Luma};

/// A binary segmentation field. Any non-zero sample counts as "set".
#[derive(Debug, Clone)]
pub struct Mask {
    image: GrayImage,
}

impl Mask {
    /// Wraps an 8-bit single channel image, e.g. the output of an `inRange`-style threshold.
    pub fn from_gray(image: GrayImage) -> Self {
        Self { image }
    }

    /// An all-clear mask of the given size.
    pub fn empty(width: u32, height: u32) -> Self {
        Self { image: GrayImage::new(width, height) }
    }

    /// Builds a mask by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        let image = GrayImage::from_fn(width, height, |x, y| {
            if f(x, y) { Luma([255]) } else { Luma([0]) }
        });
        Self { image }
    }

    /// Returns a copy of this mask with the given rectangle filled in.
    /// Coordinates falling outside the mask are clipped.
    pub fn with_rect(mut self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x_end = x.saturating_add(width).min(self.width());
        let y_end = y.saturating_add(height).min(self.height());
        for py in y.min(y_end)..y_end {
            for px in x.min(x_end)..x_end {
                self.image.put_pixel(px, py, Luma([255]));
            }
        }
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Whether the pixel at (x, y) is set. Out-of-bounds reads are clear.
    #[inline]
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height() && self.image.get_pixel(x, y)[0] != 0
    }

    /// Number of set pixels.
    pub fn count_set(&self) -> usize {
        self.image.pixels().filter(|p| p[0] != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mask_has_nothing_set() {
        let mask = Mask::empty(16, 8);
        assert_eq!(mask.width(), 16);
        assert_eq!(mask.height(), 8);
        assert_eq!(mask.count_set(), 0);
    }

    #[test]
    fn with_rect_sets_exactly_the_rectangle() {
        let mask = Mask::empty(20, 20).with_rect(2, 3, 4, 5);
        assert_eq!(mask.count_set(), 20);
        assert!(mask.is_set(2, 3));
        assert!(mask.is_set(5, 7));
        assert!(!mask.is_set(6, 7));
        assert!(!mask.is_set(5, 8));
    }

    #[test]
    fn with_rect_clips_at_the_border() {
        let mask = Mask::empty(10, 10).with_rect(8, 8, 5, 5);
        assert_eq!(mask.count_set(), 4);
        assert!(!mask.is_set(10, 10));
    }

    #[test]
    fn nonzero_gray_values_count_as_set() {
        let mut gray = GrayImage::new(3, 1);
        gray.put_pixel(1, 0, Luma([1]));
        let mask = Mask::from_gray(gray);
        assert!(!mask.is_set(0, 0));
        assert!(mask.is_set(1, 0));
    }
}
