//! Colour table construction.
//!
//! A table is a list of RGB entries indexed by colour index. A few leading
//! indices are reserved (black, white and, in the extended variant,
//! background, grid and outline colours); the rest form contiguous bands
//! interpolated linearly between key colours.

use crate::config::{ResolvedConfig, Variant};
use super::palette::{KeyColors, Rgb};

/// Colour index type used by the pixel buffers.
pub type ColorIndex = u16;

pub const BLACK: ColorIndex = 0;
pub const WHITE: ColorIndex = 1;

/// Band boundaries inside a table. Field names follow the band they start
/// or end; ranges are inclusive unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandLayout {
    /// Sea `blue0..=blue1`, green `land0..land1`, peaks `land1..=land2`, snow `land4`.
    Classic {
        blue0: ColorIndex,
        blue1: ColorIndex,
        land0: ColorIndex,
        land1: ColorIndex,
        land2: ColorIndex,
        land4: ColorIndex,
    },
    /// Sea `blue0..=blue1`, greens `land0..green1`, green to brown
    /// `green1..brown0`, brown to grey `brown0..grey0`, grey to white
    /// `grey0..=land1`.
    Atlas {
        blue0: ColorIndex,
        blue1: ColorIndex,
        land0: ColorIndex,
        green1: ColorIndex,
        brown0: ColorIndex,
        grey0: ColorIndex,
        land1: ColorIndex,
    },
    /// Sea `lowest..=sea`, land `land..=highest`.
    Extended {
        lowest: ColorIndex,
        sea: ColorIndex,
        land: ColorIndex,
        highest: ColorIndex,
    },
}

/// Reserved indices and band layout of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBands {
    pub count: u32,
    pub background: ColorIndex,
    pub grid: ColorIndex,
    pub outline1: ColorIndex,
    pub outline2: ColorIndex,
    pub layout: BandLayout,
}

impl ColorBands {
    /// Classic layout: roughly half sea, half land, snow on top.
    pub fn classic(count: u32) -> Self {
        let blue0: ColorIndex = 2;
        let blue1 = ((count - 4) / 2) as ColorIndex + blue0;
        let land0 = blue1 + 1;
        let land2 = (count - 2) as ColorIndex;
        let land1 = (land0 + land2 + 1) / 2;
        Self {
            count,
            background: BLACK,
            grid: BLACK,
            outline1: BLACK,
            outline2: BLACK,
            layout: BandLayout::Classic {
                blue0,
                blue1,
                land0,
                land1,
                land2,
                land4: (count - 1) as ColorIndex,
            },
        }
    }

    /// Atlas layout: a quarter sea, nearly half greens, an eighth brown and
    /// an eighth grey.
    pub fn atlas(count: u32) -> Self {
        let count = count.max(8);
        let blue0: ColorIndex = 2;
        let land0 = (count / 4).max(blue0 as u32 + 1);
        let grey0 = count - count / 8;
        let green1 = (land0 + count / 2).min(grey0 - 2);
        let brown0 = (green1 + grey0) / 2;
        Self {
            count,
            background: BLACK,
            grid: BLACK,
            outline1: BLACK,
            outline2: BLACK,
            layout: BandLayout::Atlas {
                blue0,
                blue1: (land0 - 1) as ColorIndex,
                land0: land0 as ColorIndex,
                green1: green1 as ColorIndex,
                brown0: brown0 as ColorIndex,
                grey0: grey0 as ColorIndex,
                land1: (count - 1) as ColorIndex,
            },
        }
    }

    /// Extended layout: six reserved indices, then sea and land halves.
    pub fn extended(count: u32) -> Self {
        let lowest: ColorIndex = 6;
        let highest = (count - 1) as ColorIndex;
        let sea = lowest + (highest - lowest) / 2;
        Self {
            count,
            background: 2,
            grid: 3,
            outline1: 4,
            outline2: 5,
            layout: BandLayout::Extended {
                lowest,
                sea,
                land: sea + 1,
                highest,
            },
        }
    }

    /// First and last sea index.
    pub fn sea_range(&self) -> (ColorIndex, ColorIndex) {
        match self.layout {
            BandLayout::Classic { blue0, blue1, .. } | BandLayout::Atlas { blue0, blue1, .. } => {
                (blue0, blue1)
            }
            BandLayout::Extended { lowest, sea, .. } => (lowest, sea),
        }
    }

    /// First land index; every index at or above it is land.
    pub fn land_start(&self) -> ColorIndex {
        match self.layout {
            BandLayout::Classic { land0, .. } | BandLayout::Atlas { land0, .. } => land0,
            BandLayout::Extended { land, .. } => land,
        }
    }

    pub fn is_sea(&self, index: ColorIndex) -> bool {
        let (lo, hi) = self.sea_range();
        (lo..=hi).contains(&index)
    }

    pub fn is_land(&self, index: ColorIndex) -> bool {
        index >= self.land_start()
    }

    /// The black-and-white value of an index when the map is reduced to an
    /// outline drawing.
    pub fn black_or_white(&self, index: ColorIndex) -> ColorIndex {
        match self.layout {
            BandLayout::Extended { lowest, .. } => {
                if index >= lowest {
                    WHITE
                } else {
                    BLACK
                }
            }
            _ => {
                if index != BLACK {
                    WHITE
                } else {
                    BLACK
                }
            }
        }
    }
}

/// An immutable altitude-band colour lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable {
    entries: Vec<Rgb>,
    bands: ColorBands,
}

/// Fills `lo..hi` (or `lo..=hi` when `inclusive`) with the integer ramp
/// from `c0` at `lo` to `c1` at `hi`.
fn ramp(entries: &mut [Rgb], lo: ColorIndex, hi: ColorIndex, inclusive: bool, c0: Rgb, c1: [i32; 3]) {
    let (lo, hi) = (lo as i32, hi as i32);
    if hi == lo {
        if inclusive {
            entries[lo as usize] = c0;
        }
        return;
    }
    let end = if inclusive { hi + 1 } else { hi };
    for i in lo..end {
        let mut rgb = [0u8; 3];
        for c in 0..3 {
            let v = (c0[c] as i32 * (hi - i) + c1[c] * (i - lo)) / (hi - lo);
            rgb[c] = v.clamp(0, 255) as u8;
        }
        entries[i as usize] = rgb;
    }
}

#[inline]
fn wide(rgb: Rgb) -> [i32; 3] {
    [rgb[0] as i32, rgb[1] as i32, rgb[2] as i32]
}

impl ColorTable {
    /// Builds the table for a resolved configuration.
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::build(config.color_count, config.variant, config.alt_colors, config.lighter)
    }

    /// Builds a table of `count` entries.
    ///
    /// `alt_colors` selects the atlas palette and layout (classic only);
    /// `lighter` applies that many gamma passes to the key colours first.
    pub fn build(count: u32, variant: Variant, alt_colors: bool, lighter: u32) -> Self {
        match (variant, alt_colors) {
            (Variant::Classic, false) => Self::build_classic(count, lighter),
            (Variant::Classic, true) => Self::build_atlas(count, lighter),
            (Variant::Extended, _) => Self::build_extended(count, lighter),
        }
    }

    fn build_classic(count: u32, lighter: u32) -> Self {
        let bands = ColorBands::classic(count);
        let k = KeyColors::STANDARD.lightened_n(lighter);
        let mut entries = vec![[0u8; 3]; count as usize];
        entries[BLACK as usize] = [0, 0, 0];
        entries[WHITE as usize] = [255, 255, 255];

        if let BandLayout::Classic { blue0, blue1, land0, land1, land2, land4 } = bands.layout {
            ramp(&mut entries, blue0, blue1, true, k.deep_sea, wide(k.shallow_sea));
            ramp(&mut entries, land0, land1, false, k.lowland, wide(k.highland));
            ramp(&mut entries, land1, land2, true, k.mountain, wide(k.peak));
            entries[land4 as usize] = k.snow;
        }
        Self { entries, bands }
    }

    fn build_atlas(count: u32, lighter: u32) -> Self {
        let bands = ColorBands::atlas(count);
        let k = KeyColors::ATLAS.lightened_n(lighter);
        let mut entries = vec![[0u8; 3]; bands.count as usize];
        entries[BLACK as usize] = k.space;
        entries[WHITE as usize] = k.snow;

        if let BandLayout::Atlas { blue0, blue1, land0, green1, brown0, grey0, land1 } = bands.layout {
            entries[blue0 as usize] = k.deep_sea;
            ramp(&mut entries, blue0, blue1, true, k.deep_sea, wide(k.shallow_sea));
            ramp(&mut entries, land0, green1, false, k.lowland, wide(k.highland));
            ramp(&mut entries, green1, brown0, false, k.highland, wide(k.mountain));
            ramp(&mut entries, brown0, grey0, false, k.mountain, wide(k.peak));
            // The top ramp aims one past white so the last entry stays just below it.
            let above_snow = wide(k.snow).map(|c| c + 1);
            ramp(&mut entries, grey0, land1 + 1, false, k.peak, above_snow);
        }
        Self { entries, bands }
    }

    fn build_extended(count: u32, lighter: u32) -> Self {
        let bands = ColorBands::extended(count);
        let k = KeyColors::STANDARD.lightened_n(lighter);
        let mut entries = vec![[0u8; 3]; count as usize];
        entries[BLACK as usize] = [0, 0, 0];
        entries[WHITE as usize] = [255, 255, 255];
        entries[bands.background as usize] = k.space;
        entries[bands.grid as usize] = k.lines;
        entries[bands.outline1 as usize] = k.lines;
        entries[bands.outline2 as usize] = [255, 0, 0];

        if let BandLayout::Extended { lowest, sea, land, highest } = bands.layout {
            ramp(&mut entries, lowest, sea, true, k.deep_sea, wide(k.shallow_sea));

            // Land climbs through four segments of (nearly) equal width.
            let anchors = [k.lowland, k.highland, k.mountain, k.peak, k.snow];
            let span = (highest - land) as u32;
            let stops: Vec<ColorIndex> = (0..=4u32)
                .map(|s| land + (span * s / 4) as ColorIndex)
                .collect();
            for s in 0..4 {
                let last = s == 3;
                ramp(&mut entries, stops[s], stops[s + 1], last, anchors[s], wide(anchors[s + 1]));
            }
        }
        Self { entries, bands }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn bands(&self) -> &ColorBands {
        &self.bands
    }

    /// RGB of an index. Out-of-range indices read as black.
    pub fn rgb(&self, index: ColorIndex) -> Rgb {
        self.entries.get(index as usize).copied().unwrap_or([0, 0, 0])
    }

    pub fn entries(&self) -> &[Rgb] {
        &self.entries
    }

    /// One channel as a parallel array (0 = red, 1 = green, 2 = blue).
    pub fn channel(&self, c: usize) -> Vec<u8> {
        self.entries.iter().map(|rgb| rgb[c]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_monotonic(table: &ColorTable, lo: ColorIndex, hi: ColorIndex) {
        for c in 0..3 {
            let channel = table.channel(c);
            let slice = &channel[lo as usize..=hi as usize];
            let rising = slice.windows(2).all(|w| w[0] <= w[1]);
            let falling = slice.windows(2).all(|w| w[0] >= w[1]);
            assert!(
                rising || falling,
                "channel {} not monotonic over {}..={}: {:?}",
                c,
                lo,
                hi,
                slice
            );
        }
    }

    #[test]
    fn test_classic_table_shape() {
        let table = ColorTable::build(32, Variant::Classic, false, 0);
        assert_eq!(table.len(), 32);
        assert_eq!(table.rgb(BLACK), [0, 0, 0]);
        assert_eq!(table.rgb(WHITE), [255, 255, 255]);
        assert_eq!(table.rgb(2), KeyColors::STANDARD.deep_sea);
        assert_eq!(table.rgb(31), KeyColors::STANDARD.snow);
        assert_eq!(table.bands().sea_range(), (2, 16));
        assert_eq!(table.bands().land_start(), 17);
    }

    #[test]
    fn test_classic_bands_monotonic() {
        let table = ColorTable::build(64, Variant::Classic, false, 0);
        if let BandLayout::Classic { blue0, blue1, land0, land1, land2, .. } = table.bands().layout {
            assert_monotonic(&table, blue0, blue1);
            assert_monotonic(&table, land0, land1 - 1);
            assert_monotonic(&table, land1, land2);
        } else {
            panic!("expected classic layout");
        }
    }

    #[test]
    fn test_minimum_classic_table() {
        let table = ColorTable::build(5, Variant::Classic, false, 0);
        assert_eq!(table.rgb(2), KeyColors::STANDARD.deep_sea);
        assert_eq!(table.rgb(3), KeyColors::STANDARD.mountain);
        assert_eq!(table.rgb(4), KeyColors::STANDARD.snow);
    }

    #[test]
    fn test_atlas_bands_monotonic() {
        let table = ColorTable::build(256, Variant::Classic, true, 0);
        if let BandLayout::Atlas { blue0, blue1, land0, green1, brown0, grey0, land1 } = table.bands().layout {
            assert_eq!(land0, 64);
            assert_eq!(grey0, 224);
            assert_monotonic(&table, blue0, blue1);
            assert_monotonic(&table, land0, green1 - 1);
            assert_monotonic(&table, green1, brown0 - 1);
            assert_monotonic(&table, brown0, grey0 - 1);
            assert_monotonic(&table, grey0, land1);
            assert_eq!(table.rgb(grey0), KeyColors::ATLAS.peak);
        } else {
            panic!("expected atlas layout");
        }
    }

    #[test]
    fn test_smallest_atlas_table() {
        let table = ColorTable::build(8, Variant::Classic, true, 0);
        assert_eq!(table.len(), 8);
        assert_eq!(table.rgb(2), KeyColors::ATLAS.deep_sea);
    }

    #[test]
    fn test_extended_layout() {
        let bands = ColorBands::extended(9);
        assert_eq!(bands.sea_range(), (6, 7));
        assert_eq!(bands.land_start(), 8);

        let table = ColorTable::build(1024, Variant::Extended, false, 0);
        let (lowest, sea) = table.bands().sea_range();
        assert_monotonic(&table, lowest, sea);
        assert_eq!(table.rgb(lowest), KeyColors::STANDARD.deep_sea);
        assert_eq!(table.rgb(sea), KeyColors::STANDARD.shallow_sea);
        assert_eq!(table.rgb(1023), KeyColors::STANDARD.snow);
        assert_eq!(table.rgb(table.bands().outline2), [255, 0, 0]);
    }

    #[test]
    fn test_extended_land_segments_monotonic() {
        let table = ColorTable::build(1000, Variant::Extended, false, 0);
        if let BandLayout::Extended { land, highest, .. } = table.bands().layout {
            let span = (highest - land) as u32;
            let stops: Vec<ColorIndex> = (0..=4u32).map(|s| land + (span * s / 4) as ColorIndex).collect();
            for s in 0..4 {
                assert_monotonic(&table, stops[s], stops[s + 1] - 1);
            }
        } else {
            panic!("expected extended layout");
        }
    }

    #[test]
    fn test_full_extended_table_builds() {
        let table = ColorTable::build(65536, Variant::Extended, false, 1);
        assert_eq!(table.len(), 65536);
        assert_eq!(table.bands().sea_range().1, 6 + (65535 - 6) / 2);
    }

    #[test]
    fn test_lighter_brightens_sea() {
        let plain = ColorTable::build(32, Variant::Classic, false, 0);
        let light = ColorTable::build(32, Variant::Classic, false, 1);
        assert!(light.rgb(2)[0] > plain.rgb(2)[0]);
    }

    #[test]
    fn test_black_or_white() {
        let classic = ColorBands::classic(32);
        assert_eq!(classic.black_or_white(BLACK), BLACK);
        assert_eq!(classic.black_or_white(5), WHITE);

        let extended = ColorBands::extended(64);
        assert_eq!(extended.black_or_white(extended.background), BLACK);
        assert_eq!(extended.black_or_white(40), WHITE);
    }
}
