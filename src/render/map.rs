//! Pixel buffers of a rendered map.

use crate::color::ColorIndex;

/// Everything known about one output pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixel {
    pub color: ColorIndex,
    /// Light intensity; 255 off the globe, 0 when shading is disabled.
    pub shade: u8,
    /// Terrain altitude; 0 off the globe.
    pub altitude: f32,
}

/// Row-major altitude, colour index and shade buffers of one map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapBuffers {
    pub width: u32,
    pub height: u32,
    pub altitude: Vec<f32>,
    pub color: Vec<ColorIndex>,
    /// Empty unless shading is enabled.
    pub shade: Vec<u8>,
}

impl MapBuffers {
    /// Allocates zeroed buffers.
    pub fn new(width: u32, height: u32, shaded: bool) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            altitude: vec![0.0; size],
            color: vec![0; size],
            shade: if shaded { vec![0; size] } else { Vec::new() },
        }
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_shaded(&self) -> bool {
        !self.shade.is_empty()
    }

    /// Reads a pixel. Panics if `(x, y)` is outside the map.
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        let idx = self.index(x, y);
        Pixel {
            color: self.color[idx],
            shade: self.shade.get(idx).copied().unwrap_or(0),
            altitude: self.altitude[idx],
        }
    }

    /// Writes a pixel. The shade is dropped when shading is disabled.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Pixel) {
        let idx = self.index(x, y);
        self.color[idx] = pixel.color;
        self.altitude[idx] = pixel.altitude;
        if let Some(shade) = self.shade.get_mut(idx) {
            *shade = pixel.shade;
        }
    }

    /// Copies one finished scanline into place.
    pub fn write_row(&mut self, y: u32, row: &[Pixel]) {
        debug_assert_eq!(row.len(), self.width as usize);
        for (x, &pixel) in row.iter().enumerate() {
            self.set_pixel(x as u32, y, pixel);
        }
    }

    /// Minimum and maximum altitude over the map.
    pub fn altitude_range(&self) -> (f32, f32) {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for &a in &self.altitude {
            min = min.min(a);
            max = max.max(a);
        }
        (min, max)
    }

    /// Approximate heap size of the buffers in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.altitude.len() * std::mem::size_of::<f32>()
            + self.color.len() * std::mem::size_of::<ColorIndex>()
            + self.shade.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffers() {
        let map = MapBuffers::new(8, 4, false);
        assert_eq!(map.len(), 32);
        assert_eq!(map.color.len(), 32);
        assert!(!map.is_shaded());
        assert_eq!(map.memory_bytes(), 32 * 4 + 32 * 2);

        let shaded = MapBuffers::new(8, 4, true);
        assert!(shaded.is_shaded());
        assert_eq!(shaded.shade.len(), 32);
    }

    #[test]
    fn test_pixel_round_trip() {
        let mut map = MapBuffers::new(5, 3, true);
        let p = Pixel {
            color: 17,
            shade: 200,
            altitude: 0.05,
        };
        map.set_pixel(4, 2, p);
        assert_eq!(map.pixel(4, 2), p);
        assert_eq!(map.index(4, 2), 14);
        assert_eq!(map.pixel(0, 0).color, 0);
    }

    #[test]
    fn test_unshaded_pixel_reads_zero_shade() {
        let mut map = MapBuffers::new(2, 2, false);
        map.set_pixel(
            1,
            1,
            Pixel {
                color: 3,
                shade: 99,
                altitude: -0.1,
            },
        );
        assert_eq!(map.pixel(1, 1).shade, 0);
    }

    #[test]
    fn test_altitude_range() {
        let mut map = MapBuffers::new(3, 1, false);
        map.altitude.copy_from_slice(&[-0.2, 0.0, 0.3]);
        assert_eq!(map.altitude_range(), (-0.2, 0.3));
    }
}
