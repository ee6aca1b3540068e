//! Altitude to colour index classification.

use glam::DVec3;

use super::table::{BandLayout, ColorBands, ColorIndex, WHITE};

/// Maps an altitude (and the point it was sampled at) to a colour index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classifier {
    bands: ColorBands,
    latitude_colors: bool,
}

/// `base + trunc(span * t)`, computed the way integer colour arithmetic expects.
#[inline]
fn offset(base: ColorIndex, span: i64, t: f64) -> i64 {
    base as i64 + (span as f64 * t) as i64
}

impl Classifier {
    pub fn new(bands: ColorBands, latitude_colors: bool) -> Self {
        Self {
            bands,
            latitude_colors,
        }
    }

    pub fn bands(&self) -> &ColorBands {
        &self.bands
    }

    /// Colour index for `alt` at point `p` on the unit sphere. Only `p.y`
    /// (the sine of the latitude) influences the result.
    pub fn classify(&self, alt: f64, p: DVec3) -> ColorIndex {
        let y = p.y;
        match self.bands.layout {
            BandLayout::Classic { blue0, blue1, land0, land2, land4, .. } => {
                self.classic(alt, y, blue0, blue1, land0, land2, land4)
            }
            BandLayout::Atlas { blue0, blue1, land0, green1, grey0, land1, .. } => {
                self.atlas(alt, y, blue0, blue1, land0, green1, grey0, land1)
            }
            BandLayout::Extended { lowest, sea, land, highest } => {
                self.extended(alt, y, lowest, sea, land, highest)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn classic(
        &self,
        alt: f64,
        y: f64,
        blue0: ColorIndex,
        blue1: ColorIndex,
        land0: ColorIndex,
        land2: ColorIndex,
        land4: ColorIndex,
    ) -> ColorIndex {
        if alt <= 0.0 {
            if self.latitude_colors && y * y + alt >= 0.98 {
                return land4;
            }
            let span = (blue1 - blue0 + 1) as i64;
            offset(blue1, span, 10.0 * alt).max(blue0 as i64) as ColorIndex
        } else {
            let alt = if self.latitude_colors { alt + 0.10204 * y * y } else { alt };
            if alt >= 0.1 {
                return land4;
            }
            let span = (land2 - land0 + 1) as i64;
            offset(land0, span, 10.0 * alt).min(land2 as i64) as ColorIndex
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn atlas(
        &self,
        alt: f64,
        y: f64,
        blue0: ColorIndex,
        blue1: ColorIndex,
        land0: ColorIndex,
        green1: ColorIndex,
        grey0: ColorIndex,
        land1: ColorIndex,
    ) -> ColorIndex {
        let mut snow = 0.125;
        let mut tree = snow * 0.5;
        let mut bare = (tree + snow) / 2.0;
        if self.latitude_colors {
            let y6 = y.powi(6);
            snow -= 0.13 * y6;
            bare -= 0.12 * y6;
            tree -= 0.11 * y6;
        }

        let grey_to_white = |alt: f64| {
            let span = (1 + land1 - grey0) as i64;
            offset(grey0, span, (alt - bare) / (snow - bare)).min(land1 as i64) as ColorIndex
        };

        if alt > 0.0 {
            if alt > snow {
                WHITE
            } else if alt > bare {
                grey_to_white(alt)
            } else if alt > tree {
                let span = (1 + grey0 - green1) as i64;
                offset(green1, span, (alt - tree) / (bare - tree)).min(grey0 as i64) as ColorIndex
            } else {
                let span = (1 + green1 - land0) as i64;
                offset(land0, span, alt / tree).min(green1 as i64) as ColorIndex
            }
        } else {
            // Sea ice only shows when the latitude shift pushes the thresholds below zero.
            let alt = alt / 2.0;
            if alt > snow {
                WHITE
            } else if alt > bare {
                grey_to_white(alt)
            } else {
                let span = (blue1 - blue0 + 1) as i64;
                offset(blue1, span, 25.0 * alt).max(blue0 as i64) as ColorIndex
            }
        }
    }

    fn extended(
        &self,
        alt: f64,
        y: f64,
        lowest: ColorIndex,
        sea: ColorIndex,
        land: ColorIndex,
        highest: ColorIndex,
    ) -> ColorIndex {
        let y4 = y.powi(4);
        if alt <= 0.0 {
            if self.latitude_colors && y4 + alt >= 0.98 {
                return highest;
            }
            let span = (sea - lowest + 1) as i64;
            offset(sea, span, 10.0 * alt).max(lowest as i64) as ColorIndex
        } else {
            let alt = if self.latitude_colors { alt + 0.1 * y4 } else { alt };
            if alt >= 0.1 {
                return highest;
            }
            let span = (highest - land + 1) as i64;
            offset(land, span, 10.0 * alt).min(highest as i64) as ColorIndex
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EQUATOR: DVec3 = DVec3::new(1.0, 0.0, 0.0);
    const POLE: DVec3 = DVec3::new(0.0, 1.0, 0.0);

    #[test]
    fn test_classic_sea_and_land() {
        let c = Classifier::new(ColorBands::classic(32), false);
        // Sea level is the shallowest blue.
        assert_eq!(c.classify(0.0, EQUATOR), 16);
        assert_eq!(c.classify(-1.0, EQUATOR), 2);
        assert_eq!(c.classify(0.001, EQUATOR), 17);
        assert_eq!(c.classify(0.0999, EQUATOR), 30);
        assert_eq!(c.classify(0.1, EQUATOR), 31);
    }

    #[test]
    fn test_classic_icecaps_need_latitude_colours() {
        let plain = Classifier::new(ColorBands::classic(32), false);
        let latic = Classifier::new(ColorBands::classic(32), true);
        assert_eq!(plain.classify(-0.01, POLE), 16);
        assert_eq!(latic.classify(-0.01, POLE), 31);
        assert_eq!(latic.classify(-0.01, EQUATOR), 16);
        // Low land near the pole is pushed to snow.
        assert_eq!(latic.classify(0.001, POLE), 31);
    }

    #[test]
    fn test_classify_stays_in_bands() {
        for bands in [ColorBands::classic(256), ColorBands::atlas(256), ColorBands::extended(4096)] {
            for latic in [false, true] {
                let c = Classifier::new(bands, latic);
                for k in -200..=200 {
                    let alt = k as f64 / 1000.0;
                    for p in [EQUATOR, POLE, DVec3::new(0.6, 0.8, 0.0)] {
                        let idx = c.classify(alt, p);
                        assert!((idx as u32) < bands.count, "{} out of range", idx);
                        assert!(idx >= WHITE);
                        if alt > 0.0 && !latic {
                            assert!(bands.is_land(idx) || idx == WHITE, "{:?} alt {} -> {}", bands.layout, alt, idx);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_atlas_thresholds() {
        let bands = ColorBands::atlas(256);
        let c = Classifier::new(bands, false);
        assert_eq!(c.classify(0.2, EQUATOR), WHITE);
        assert_eq!(c.classify(0.0001, EQUATOR), bands.land_start());
        let (_, blue1) = bands.sea_range();
        assert_eq!(c.classify(0.0, EQUATOR), blue1);
        assert!(bands.is_sea(c.classify(-0.05, EQUATOR)));
    }

    #[test]
    fn test_extended_uses_full_range() {
        let bands = ColorBands::extended(65536);
        let c = Classifier::new(bands, false);
        let (lowest, sea) = bands.sea_range();
        assert_eq!(c.classify(-5.0, EQUATOR), lowest);
        assert_eq!(c.classify(0.0, EQUATOR), sea);
        assert_eq!(c.classify(0.5, EQUATOR), 65535);
        assert!(c.classify(0.05, EQUATOR) > c.classify(0.01, EQUATOR));
    }

    #[test]
    fn test_classification_is_monotonic_in_altitude() {
        let c = Classifier::new(ColorBands::classic(64), false);
        let mut last = 0;
        for k in -100..=100 {
            let idx = c.classify(k as f64 / 500.0, EQUATOR);
            assert!(idx >= last);
            last = idx;
        }
    }
}
