//! Post-processing passes over finished buffers: shade smoothing and
//! coastline/contour outlines.

use crate::color::{ColorBands, ColorIndex, BLACK};
use crate::config::OutlineMode;

/// One in-place pass of a fixed 3x3-footprint blur over the shade buffer.
///
/// `s(x,y) = (4 s(x,y) + 2 s(x,y+1) + 2 s(x+1,y) + s(x+1,y+2) + 4) / 9`
/// for every pixel not in the last two rows or columns. Each pixel only
/// reads pixels that are updated after it, so the pass sees unsmoothed values.
pub fn smooth_shades(shade: &mut [u8], width: u32, height: u32) {
    let (w, h) = (width as usize, height as usize);
    if w < 3 || h < 3 || shade.len() < w * h {
        return;
    }
    for y in 0..h - 2 {
        for x in 0..w - 2 {
            let at = |xx: usize, yy: usize| shade[yy * w + xx] as u32;
            let v = (4 * at(x, y) + 2 * at(x, y + 1) + 2 * at(x + 1, y) + at(x + 1, y + 2) + 4) / 9;
            shade[y * w + x] = v as u8;
        }
    }
}

/// Indices (row-major) of interior pixels on a coastline: sea pixels with
/// land among their eight neighbours. With `contour_step > 0` pixels whose
/// land band (every `contour_step` indices above the first land colour) is
/// below a four-neighbour's band follow, in a second scan.
pub fn find_outline(
    colors: &[ColorIndex],
    width: u32,
    height: u32,
    bands: &ColorBands,
    contour_step: u32,
) -> Vec<usize> {
    let (w, h) = (width as usize, height as usize);
    let mut marked = Vec::new();
    if w < 3 || h < 3 {
        return marked;
    }
    let land = bands.land_start();
    let at = |x: usize, y: usize| colors[y * w + x];

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            if !bands.is_sea(at(x, y)) {
                continue;
            }
            let coast = [
                at(x - 1, y),
                at(x + 1, y),
                at(x, y - 1),
                at(x, y + 1),
                at(x - 1, y - 1),
                at(x - 1, y + 1),
                at(x + 1, y - 1),
                at(x + 1, y + 1),
            ]
            .iter()
            .any(|&n| n >= land);
            if coast {
                marked.push(y * w + x);
            }
        }
    }

    if contour_step > 0 {
        let step = contour_step as i64;
        let band = |c: ColorIndex| (c as i64 - land as i64) / step;
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let t = band(at(x, y));
                if t < 0 {
                    continue;
                }
                let higher = [at(x - 1, y), at(x + 1, y), at(x, y - 1), at(x, y + 1)]
                    .iter()
                    .any(|&n| band(n) > t);
                if higher {
                    marked.push(y * w + x);
                }
            }
        }
    }
    marked
}

/// Stamps coastlines (and contours) into the colour buffer.
///
/// [`OutlineMode::BlackAndWhite`] first collapses every colour to black or
/// white and draws the lines in black. [`OutlineMode::Edges`] keeps the
/// colours; lines over sea or on odd contour bands use the primary outline
/// colour and even bands the secondary one.
pub fn outline(
    colors: &mut [ColorIndex],
    width: u32,
    height: u32,
    bands: &ColorBands,
    mode: OutlineMode,
    contour_step: u32,
) -> usize {
    if mode == OutlineMode::None {
        return 0;
    }
    let marked = find_outline(colors, width, height, bands, contour_step);
    let black_and_white = mode == OutlineMode::BlackAndWhite;
    if black_and_white {
        for c in colors.iter_mut() {
            *c = bands.black_or_white(*c);
        }
    }
    let land = bands.land_start();
    // Stamped in reverse discovery order.
    for &idx in marked.iter().rev() {
        let c = colors[idx];
        colors[idx] = if black_and_white {
            BLACK
        } else if contour_step == 0 || c < land || ((c - land) as u32 / contour_step) % 2 == 1 {
            bands.outline1
        } else {
            bands.outline2
        };
    }
    marked.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::WHITE;

    #[test]
    fn test_smoothing_uniform_buffer_is_identity() {
        for value in [0u8, 10, 128, 255] {
            let mut shade = vec![value; 7 * 5];
            smooth_shades(&mut shade, 7, 5);
            assert!(shade.iter().all(|&s| s == value), "uniform {} changed", value);
        }
    }

    #[test]
    fn test_smoothing_weights() {
        // 4x4, a single bright pixel at (1, 1).
        let mut shade = vec![0u8; 16];
        shade[5] = 90;
        smooth_shades(&mut shade, 4, 4);
        // (1,1) keeps 4/9 of itself, (0,1) and (1,0) pick up 2/9 each.
        assert_eq!(shade[5], ((4 * 90 + 4) / 9) as u8);
        assert_eq!(shade[4], ((2 * 90 + 4) / 9) as u8);
        assert_eq!(shade[1], ((2 * 90 + 4) / 9) as u8);
        assert_eq!(shade[0], (4 / 9) as u8);
        // The last two rows and columns are untouched.
        assert_eq!(shade[15], 0);
    }

    #[test]
    fn test_smoothing_small_buffers_untouched() {
        let mut shade = vec![1u8, 200, 3, 4];
        smooth_shades(&mut shade, 2, 2);
        assert_eq!(shade, vec![1, 200, 3, 4]);
    }

    #[test]
    fn test_single_sea_pixel_in_land_is_coast() {
        let bands = ColorBands::classic(32);
        let land = bands.land_start() + 3;
        let mut colors = vec![land; 9];
        colors[4] = 10;
        let marked = find_outline(&colors, 3, 3, &bands, 0);
        assert_eq!(marked, vec![4]);

        let n = outline(&mut colors, 3, 3, &bands, OutlineMode::Edges, 0);
        assert_eq!(n, 1);
        assert_eq!(colors[4], bands.outline1);
    }

    #[test]
    fn test_all_sea_has_no_outline() {
        let bands = ColorBands::extended(64);
        let colors = vec![bands.sea_range().0 + 2; 6 * 6];
        assert!(find_outline(&colors, 6, 6, &bands, 0).is_empty());
        assert!(find_outline(&colors, 6, 6, &bands, 4).is_empty());
    }

    #[test]
    fn test_border_pixels_never_marked() {
        let bands = ColorBands::classic(32);
        let land = bands.land_start();
        let mut colors = vec![land; 16];
        colors[0] = 5;
        colors[3] = 5;
        assert!(find_outline(&colors, 4, 4, &bands, 0).is_empty());
    }

    #[test]
    fn test_black_and_white_collapse() {
        let bands = ColorBands::classic(32);
        let land = bands.land_start() + 1;
        let mut colors = vec![land; 9];
        colors[4] = 8;
        colors[0] = BLACK;
        outline(&mut colors, 3, 3, &bands, OutlineMode::BlackAndWhite, 0);
        assert_eq!(colors[4], BLACK);
        assert_eq!(colors[0], BLACK);
        assert!(colors.iter().enumerate().all(|(i, &c)| i == 0 || i == 4 || c == WHITE));
    }

    #[test]
    fn test_contours_mark_lower_side_of_band_edge() {
        let bands = ColorBands::extended(64);
        let land = bands.land_start();
        // Columns 0..2 in band 0, columns 3..5 in band 1 (step 4).
        let w = 6;
        let mut colors = vec![land; w * 3];
        for y in 0..3 {
            for x in 3..w {
                colors[y * w + x] = land + 5;
            }
        }
        let marked = find_outline(&colors, w as u32, 3, &bands, 4);
        assert_eq!(marked, vec![w + 2]);

        outline(&mut colors, w as u32, 3, &bands, OutlineMode::Edges, 4);
        // Band 0 is even: secondary outline colour.
        assert_eq!(colors[w + 2], bands.outline2);
    }

    #[test]
    fn test_outline_mode_none_is_noop() {
        let bands = ColorBands::classic(32);
        let mut colors = vec![bands.land_start(); 9];
        colors[4] = 3;
        let before = colors.clone();
        assert_eq!(outline(&mut colors, 3, 3, &bands, OutlineMode::None, 0), 0);
        assert_eq!(colors, before);
    }
}
