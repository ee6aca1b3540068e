//! 16-bit grayscale PNG export of the altitude buffer.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageBuffer, ImageEncoder, Luma};

use crate::render::MapBuffers;
use super::{check_len, normalize_u16, ExportError};

/// Options for altitude PNG export.
#[derive(Debug, Clone)]
pub struct AltitudePngOptions {
    /// Altitude mapped to black.
    pub min_altitude: f32,
    /// Altitude mapped to white.
    pub max_altitude: f32,
    pub compression: CompressionType,
    pub filter: FilterType,
}

impl Default for AltitudePngOptions {
    fn default() -> Self {
        // Altitudes beyond ±0.1 already saturate the colour table.
        Self {
            min_altitude: -0.1,
            max_altitude: 0.1,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

impl AltitudePngOptions {
    /// Options spanning the altitude range actually present in `map`.
    pub fn auto_range(map: &MapBuffers) -> Self {
        let (min, max) = map.altitude_range();
        Self {
            min_altitude: min,
            max_altitude: max,
            ..Default::default()
        }
    }
}

/// Writes a row-major altitude buffer as a 16-bit grayscale PNG.
pub fn export_altitude_png(
    altitude: &[f32],
    width: u32,
    height: u32,
    path: &Path,
    options: &AltitudePngOptions,
) -> Result<(), ExportError> {
    let (min, max) = (options.min_altitude, options.max_altitude);
    if min.is_nan() || max.is_nan() || min >= max {
        return Err(ExportError::InvalidRange(min, max));
    }
    check_len(altitude.len(), width, height)?;

    let range = max - min;
    let img: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_fn(width, height, |x, y| {
            Luma([normalize_u16(altitude[(y * width + x) as usize], min, range)])
        });

    let writer = BufWriter::new(File::create(path)?);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);
    let bytes: &[u8] = bytemuck::cast_slice(img.as_raw());
    encoder.write_image(bytes, width, height, image::ExtendedColorType::L16)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_export_altitude_png() {
        let (w, h) = (32u32, 16u32);
        let altitude: Vec<f32> = (0..w * h)
            .map(|i| ((i % w) as f32 / (w - 1) as f32) * 0.2 - 0.1)
            .collect();
        let dir = tempdir().unwrap();
        let path = dir.path().join("altitude.png");
        export_altitude_png(&altitude, w, h, &path, &AltitudePngOptions::default()).unwrap();

        let back = image::open(&path).unwrap().into_luma16();
        assert_eq!(back.dimensions(), (w, h));
        assert_eq!(back.get_pixel(0, 3).0[0], 0, "lowest column should be black");
        assert!(back.get_pixel(w - 1, 3).0[0] >= 65534, "highest column should be white");
        assert!(back.get_pixel(10, 0).0[0] < back.get_pixel(20, 0).0[0]);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.png");
        let options = AltitudePngOptions {
            min_altitude: 0.5,
            max_altitude: 0.5,
            ..Default::default()
        };
        let err = export_altitude_png(&[0.0; 4], 2, 2, &path, &options).unwrap_err();
        assert!(matches!(err, ExportError::InvalidRange(..)));
        assert!(!path.exists());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.png");
        let err = export_altitude_png(&[0.0; 5], 2, 3, &path, &AltitudePngOptions::default()).unwrap_err();
        assert!(matches!(err, ExportError::DimensionMismatch(5, 2, 3)));
    }

    #[test]
    fn test_auto_range() {
        let mut map = MapBuffers::new(3, 1, false);
        map.altitude.copy_from_slice(&[-0.03, 0.01, 0.07]);
        let options = AltitudePngOptions::auto_range(&map);
        assert_eq!(options.min_altitude, -0.03);
        assert_eq!(options.max_altitude, 0.07);
    }
}
