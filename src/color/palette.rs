//! Key colours the colour table is interpolated from.

/// An RGB triple.
pub type Rgb = [u8; 3];

/// The anchor colours of a map, from the deepest sea to snow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyColors {
    pub deep_sea: Rgb,
    pub shallow_sea: Rgb,
    pub lowland: Rgb,
    pub highland: Rgb,
    pub mountain: Rgb,
    pub peak: Rgb,
    pub snow: Rgb,
    /// Background outside the globe.
    pub space: Rgb,
    /// Gridlines and outlines.
    pub lines: Rgb,
}

impl KeyColors {
    /// Blue seas, bright green lowlands, brown peaks.
    pub const STANDARD: KeyColors = KeyColors {
        deep_sea: [0, 0, 255],
        shallow_sea: [0, 128, 255],
        lowland: [0, 255, 0],
        highland: [64, 192, 16],
        mountain: [64, 192, 16],
        peak: [128, 128, 32],
        snow: [255, 255, 255],
        space: [0, 0, 0],
        lines: [0, 0, 0],
    };

    /// Atlas conventions: dark green lowlands, brown slopes, grey peaks.
    pub const ATLAS: KeyColors = KeyColors {
        deep_sea: [0, 0, 192],
        shallow_sea: [0, 128, 255],
        lowland: [0, 96, 0],
        highland: [0, 224, 0],
        mountain: [128, 176, 0],
        peak: [128, 128, 128],
        snow: [255, 255, 255],
        space: [0, 0, 0],
        lines: [0, 0, 0],
    };

    /// Terrain anchors in ascending altitude order.
    pub fn terrain(&self) -> [Rgb; 7] {
        [
            self.deep_sea,
            self.shallow_sea,
            self.lowland,
            self.highland,
            self.mountain,
            self.peak,
            self.snow,
        ]
    }

    fn terrain_mut(&mut self) -> [&mut Rgb; 7] {
        [
            &mut self.deep_sea,
            &mut self.shallow_sea,
            &mut self.lowland,
            &mut self.highland,
            &mut self.mountain,
            &mut self.peak,
            &mut self.snow,
        ]
    }

    /// One gamma pass (square root) over the terrain colours, lifting dark
    /// tones into `16..=255`. Background and line colours are untouched.
    pub fn lightened(mut self) -> Self {
        for rgb in self.terrain_mut() {
            for c in rgb.iter_mut() {
                let x = (*c as f64 / 256.0).sqrt();
                *c = (240.0 * x + 16.0) as u8;
            }
        }
        self
    }

    /// Applies [`lightened`](Self::lightened) `passes` times.
    pub fn lightened_n(self, passes: u32) -> Self {
        (0..passes).fold(self, |colors, _| colors.lightened())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lightened_raises_dark_channels() {
        let light = KeyColors::STANDARD.lightened();
        assert_eq!(light.deep_sea[0], 16);
        assert!(light.deep_sea[2] >= 254);
        for (before, after) in KeyColors::STANDARD.terrain().iter().zip(light.terrain().iter()) {
            for c in 0..3 {
                assert!(after[c] >= before[c], "{:?} darkened to {:?}", before, after);
            }
        }
    }

    #[test]
    fn test_lightened_keeps_space_and_lines() {
        let light = KeyColors::ATLAS.lightened_n(3);
        assert_eq!(light.space, [0, 0, 0]);
        assert_eq!(light.lines, [0, 0, 0]);
    }

    #[test]
    fn test_zero_passes_is_identity() {
        assert_eq!(KeyColors::STANDARD.lightened_n(0), KeyColors::STANDARD);
    }
}
