// THEORY:
// The `BlobDetector` is the spatial grouping stage of the controller. It takes the
// binary mask for one frame and turns it into an ordered list of bounding boxes,
// one per connected region of set pixels, keeping only the boxes whose size is
// plausible for the target.
//
// Algorithm steps:
// 1.  **Raster Scan (Seeding)**: Pixels are visited row by row, left to right. The
//     first unvisited set pixel met becomes the seed of a new region. This fixes
//     the discovery order: regions come out sorted by the position of their
//     top-most, then left-most, pixel. Same mask, same order, every time.
// 2.  **Region Growing**: From each seed an iterative flood fill collects every
//     8-connected set pixel (diagonal neighbours join a region, matching the
//     connectivity of an outer contour trace). Holes inside a region do not
//     produce boxes of their own.
// 3.  **Box Aggregation**: The min/max coordinates seen during the fill give the
//     region's bounding box.
// 4.  **Size Filter**: A box survives only if its width and height lie strictly
//     inside the configured bounds (30 < w < 300, 10 < h < 300 by default). Small
//     specks of noise and frame-filling false positives are dropped silently.
// 5.  **Stateless Utility**: No memory of previous frames. An empty result is a
//     normal outcome, not an error.

use crate::core_modules::mask::Mask;
use crate::core_modules::smart_blob::BoundingBox;
use serde::Deserialize;

/// Exclusive size bounds a bounding box must fall inside to qualify as a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SizeFilter {
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
}

impl Default for SizeFilter {
    fn default() -> Self {
        Self {
            min_width: 30,
            max_width: 300,
            min_height: 10,
            max_height: 300,
        }
    }
}

impl SizeFilter {
    pub fn accepts(&self, bounding_box: &BoundingBox) -> bool {
        self.min_width < bounding_box.width
            && bounding_box.width < self.max_width
            && self.min_height < bounding_box.height
            && bounding_box.height < self.max_height
    }
}

pub mod blob_detector {
    use super::*;

    /// Extracts the qualifying bounding boxes of `mask` in discovery order.
    pub fn extract(mask: &Mask, filter: &SizeFilter) -> Vec<BoundingBox> {
        find_regions(mask)
            .into_iter()
            .filter(|bounding_box| filter.accepts(bounding_box))
            .collect()
    }

    /// Every 8-connected region of `mask` as a bounding box, unfiltered, in raster discovery order.
    pub fn find_regions(mask: &Mask) -> Vec<BoundingBox> {
        let width = mask.width() as usize;
        let height = mask.height() as usize;
        let mut visited = vec![false; width * height];
        let mut regions = Vec::new();

        for y in 0..height {
            for x in 0..width {
                if visited[y * width + x] || !mask.is_set(x as u32, y as u32) {
                    continue;
                }
                regions.push(grow_region(mask, &mut visited, x, y));
            }
        }

        regions
    }

    /// Flood fills the region containing the seed and returns its bounding box.
    fn grow_region(mask: &Mask, visited: &mut [bool], seed_x: usize, seed_y: usize) -> BoundingBox {
        let width = mask.width() as i64;
        let height = mask.height() as i64;

        let mut stack = vec![(seed_x, seed_y)];
        visited[seed_y * width as usize + seed_x] = true;

        let (mut min_x, mut min_y) = (seed_x, seed_y);
        let (mut max_x, mut max_y) = (seed_x, seed_y);

        while let Some((x, y)) = stack.pop() {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);

            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= width || ny >= height {
                        continue;
                    }

                    let index = (ny * width + nx) as usize;
                    if !visited[index] && mask.is_set(nx as u32, ny as u32) {
                        visited[index] = true;
                        stack.push((nx as usize, ny as usize));
                    }
                }
            }
        }

        BoundingBox {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::blob_detector::{extract, find_regions};
    use super::*;

    #[test]
    fn empty_mask_yields_no_boxes() {
        let mask = Mask::empty(640, 480);
        assert!(extract(&mask, &SizeFilter::default()).is_empty());
    }

    #[test]
    fn single_rectangle_is_reported_exactly() {
        let mask = Mask::empty(640, 480).with_rect(305, 225, 40, 40);
        assert_eq!(
            extract(&mask, &SizeFilter::default()),
            vec![BoundingBox::new(305, 225, 40, 40)]
        );
    }

    #[test]
    fn too_narrow_boxes_are_dropped() {
        let mask = Mask::empty(640, 480)
            .with_rect(10, 10, 20, 40)
            .with_rect(200, 100, 150, 40);
        assert_eq!(find_regions(&mask).len(), 2);
        assert_eq!(
            extract(&mask, &SizeFilter::default()),
            vec![BoundingBox::new(200, 100, 150, 40)]
        );
    }

    #[test]
    fn size_bounds_are_exclusive() {
        let filter = SizeFilter::default();
        assert!(!filter.accepts(&BoundingBox::new(0, 0, 30, 20)));
        assert!(filter.accepts(&BoundingBox::new(0, 0, 31, 20)));
        assert!(!filter.accepts(&BoundingBox::new(0, 0, 300, 20)));
        assert!(filter.accepts(&BoundingBox::new(0, 0, 299, 11)));
        assert!(!filter.accepts(&BoundingBox::new(0, 0, 100, 10)));
        assert!(!filter.accepts(&BoundingBox::new(0, 0, 100, 300)));
    }

    #[test]
    fn regions_come_out_in_raster_order() {
        let mask = Mask::empty(640, 480)
            .with_rect(400, 300, 50, 50)
            .with_rect(100, 50, 50, 50)
            .with_rect(10, 300, 50, 50);
        let boxes = extract(&mask, &SizeFilter::default());
        assert_eq!(
            boxes,
            vec![
                BoundingBox::new(100, 50, 50, 50),
                BoundingBox::new(10, 300, 50, 50),
                BoundingBox::new(400, 300, 50, 50),
            ]
        );
        assert_eq!(boxes, extract(&mask, &SizeFilter::default()));
    }

    #[test]
    fn diagonal_neighbours_join_one_region() {
        let mask = Mask::from_fn(8, 8, |x, y| x == y);
        assert_eq!(find_regions(&mask), vec![BoundingBox::new(0, 0, 8, 8)]);
    }

    #[test]
    fn hollow_region_reports_only_its_outline() {
        let mask = Mask::from_fn(100, 100, |x, y| {
            let inside = (10..90).contains(&x) && (10..90).contains(&y);
            let hole = (20..80).contains(&x) && (20..80).contains(&y);
            inside && !hole
        });
        assert_eq!(find_regions(&mask), vec![BoundingBox::new(10, 10, 80, 80)]);
    }

    #[test]
    fn region_touching_the_border_is_bounded() {
        let mask = Mask::empty(64, 48).with_rect(30, 20, 100, 100);
        assert_eq!(find_regions(&mask), vec![BoundingBox::new(30, 20, 34, 28)]);
    }
}
