// THEORY (1D Pixel Heuristics):
// The `Pixel` module is the most fundamental unit of the segmentation stage. It
// is a "dumb" data container for a single RGB pixel plus the one heuristic the
// color tracker needs from it: its position in HSV space. Nothing here looks at
// neighbours or history.
//
// HSV is reported on the 8-bit scale used by common camera toolchains, so that
// thresholds tuned there carry over unchanged:
// - hue:        0..180 (degrees halved, so it fits a byte)
// - saturation: 0..=255 (chroma / value)
// - value:      0..=255 (max channel)

pub mod pixel {
    pub type Channel = u8;
    pub type Hue = u8;
    pub type Saturation = u8;
    pub type Value = u8;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        pub red: Channel,
        pub green: Channel,
        pub blue: Channel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel { red, green, blue }
        }

        fn max_channel(&self) -> Channel {
            self.red.max(self.green.max(self.blue))
        }

        fn min_channel(&self) -> Channel {
            self.red.min(self.green.min(self.blue))
        }

        /// HSV value: the brightest channel.
        pub fn value(&self) -> Value {
            self.max_channel()
        }

        /// HSV saturation scaled to 0..=255. Black has zero saturation.
        pub fn saturation(&self) -> Saturation {
            let value = self.max_channel();
            if value == 0 {
                return 0;
            }
            let chroma = (value - self.min_channel()) as f32;
            (chroma * 255.0 / value as f32).round() as Saturation
        }

        /// Hue in half-degrees, 0..180. Grays have hue 0.
        pub fn hue(&self) -> Hue {
            let maximum_channel = self.max_channel();
            let chroma = (maximum_channel - self.min_channel()) as f32;
            if chroma == 0.0 {
                return 0;
            }

            let (red, green, blue) = (self.red as f32, self.green as f32, self.blue as f32);
            let (base_difference, sector_offset) = if maximum_channel == self.red {
                (green - blue, 0.0)
            } else if maximum_channel == self.green {
                (blue - red, 2.0)
            } else {
                (red - green, 4.0)
            };

            let mut hue_degrees = (base_difference / chroma + sector_offset) * 60.0;
            if hue_degrees < 0.0 {
                hue_degrees += 360.0;
            }
            let half_degrees = (hue_degrees / 2.0).round() as u16;
            (half_degrees % 180) as Hue
        }

        /// `[hue, saturation, value]` on the 8-bit scale.
        pub fn hsv(&self) -> [u8; 3] {
            [self.hue(), self.saturation(), self.value()]
        }
    }

    impl From<&image::Rgb<u8>> for Pixel {
        fn from(rgb: &image::Rgb<u8>) -> Self {
            Pixel::new(rgb[0], rgb[1], rgb[2])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::Pixel;

    #[test]
    fn primaries_land_on_their_hues() {
        assert_eq!(Pixel::new(255, 0, 0).hsv(), [0, 255, 255]);
        assert_eq!(Pixel::new(0, 255, 0).hsv(), [60, 255, 255]);
        assert_eq!(Pixel::new(0, 0, 255).hsv(), [120, 255, 255]);
    }

    #[test]
    fn grays_have_no_hue_or_saturation() {
        assert_eq!(Pixel::new(0, 0, 0).hsv(), [0, 0, 0]);
        assert_eq!(Pixel::new(128, 128, 128).hsv(), [0, 0, 128]);
    }

    #[test]
    fn hue_wraps_below_one_eighty() {
        // Very slightly blue-ish red rounds up to 180 half-degrees and wraps to 0.
        assert_eq!(Pixel::new(255, 0, 1).hue(), 0);
        assert_eq!(Pixel::new(255, 0, 128).hue(), 165);
    }

    #[test]
    fn saturation_is_chroma_over_value() {
        assert_eq!(Pixel::new(200, 100, 100).saturation(), 128);
        assert_eq!(Pixel::new(200, 100, 100).value(), 200);
    }
}
