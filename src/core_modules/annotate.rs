// THEORY:
// Annotation is a pure side output: it draws what the controller saw onto the
// frame for a human watching along, and nothing drawn here ever feeds back into
// a control decision. Every qualifying blob gets a box and a centroid marker,
// even though only the first one is acted on.

use crate::core_modules::smart_blob::Blob;
use crate::error::Result;
use image::{ImageEncoder, Rgb, RgbImage};
use std::path::Path;

pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const CENTROID_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const BOX_THICKNESS: i64 = 2;
const CENTROID_RADIUS: i64 = 5;

/// Draws a box outline and a filled centroid disc for each blob. Clipped at the frame border.
pub fn annotate(frame: &mut RgbImage, blobs: &[Blob]) {
    for blob in blobs {
        let b = blob.bounding_box;
        draw_rect_outline(
            frame,
            b.x as i64,
            b.y as i64,
            (b.x + b.width) as i64,
            (b.y + b.height) as i64,
        );
        draw_disc(frame, blob.centroid.x as i64, blob.centroid.y as i64);
    }
}

fn put_clipped(frame: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && x < frame.width() as i64 && y < frame.height() as i64 {
        frame.put_pixel(x as u32, y as u32, color);
    }
}

/// Outline between the corners (x0, y0) and (x1, y1), both inclusive, grown inwards and outwards.
fn draw_rect_outline(frame: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64) {
    let half = BOX_THICKNESS / 2;
    for t in -half..BOX_THICKNESS - half {
        for x in x0 - half..=x1 + half {
            put_clipped(frame, x, y0 + t, BOX_COLOR);
            put_clipped(frame, x, y1 + t, BOX_COLOR);
        }
        for y in y0 - half..=y1 + half {
            put_clipped(frame, x0 + t, y, BOX_COLOR);
            put_clipped(frame, x1 + t, y, BOX_COLOR);
        }
    }
}

fn draw_disc(frame: &mut RgbImage, cx: i64, cy: i64) {
    for dy in -CENTROID_RADIUS..=CENTROID_RADIUS {
        for dx in -CENTROID_RADIUS..=CENTROID_RADIUS {
            if dx * dx + dy * dy <= CENTROID_RADIUS * CENTROID_RADIUS {
                put_clipped(frame, cx + dx, cy + dy, CENTROID_COLOR);
            }
        }
    }
}

/// Reads one still frame from disk as 8-bit RGB.
pub fn load_frame(path: impl AsRef<Path>) -> Result<RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

/// Writes `frame` as a PNG.
pub fn save_png(path: impl AsRef<Path>, frame: &RgbImage) -> Result<()> {
    let output = std::io::BufWriter::new(std::fs::File::create(path)?);
    let encoder = image::codecs::png::PngEncoder::new(output);

    encoder.write_image(
        frame.as_raw(),
        frame.width(),
        frame.height(),
        image::ExtendedColorType::Rgb8,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::smart_blob::BoundingBox;
    use crate::error::ServoError;

    #[test]
    fn draws_box_and_centroid() {
        let mut frame = RgbImage::new(100, 100);
        let blob = Blob::from(BoundingBox::new(20, 30, 40, 20));
        annotate(&mut frame, &[blob]);

        assert_eq!(*frame.get_pixel(20, 30), BOX_COLOR);
        assert_eq!(*frame.get_pixel(60, 50), BOX_COLOR);
        assert_eq!(*frame.get_pixel(40, 40), CENTROID_COLOR);
        assert_eq!(*frame.get_pixel(44, 43), CENTROID_COLOR);
        assert_eq!(*frame.get_pixel(30, 40), Rgb([0, 0, 0]));
    }

    #[test]
    fn drawing_at_the_border_is_clipped() {
        let mut frame = RgbImage::new(50, 50);
        let blob = Blob::from(BoundingBox::new(0, 0, 49, 49));
        annotate(&mut frame, &[blob]);
        assert_eq!(*frame.get_pixel(0, 0), BOX_COLOR);
        assert_eq!(*frame.get_pixel(49, 49), BOX_COLOR);
    }

    #[test]
    fn save_annotated_file() {
        let path = std::env::temp_dir().join(format!("servo_vision_annotated_{}.png", std::process::id()));
        let mut frame = RgbImage::from_pixel(64, 48, Rgb([255, 255, 255]));
        annotate(&mut frame, &[Blob::from(BoundingBox::new(10, 10, 32, 16))]);

        save_png(&path, &frame).expect("Error Saving File.");
        let reloaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(reloaded, frame);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn file_errors_surface_as_servo_errors() {
        let dir = std::env::temp_dir().join(format!("servo_vision_frames_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let garbage = dir.join("not_a_frame.png");
        std::fs::write(&garbage, b"definitely not a png").unwrap();

        assert!(matches!(load_frame(&garbage), Err(ServoError::Image(_))));
        let frame = RgbImage::new(4, 4);
        assert!(matches!(
            save_png(dir.join("missing").join("out.png"), &frame),
            Err(ServoError::Io(_))
        ));

        std::fs::remove_dir_all(dir).unwrap();
    }
}
