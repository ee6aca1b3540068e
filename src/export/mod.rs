//! Export of rendered maps.
//!
//! The coloured map is written as PNG, JPEG or GIF depending on the file
//! extension. The altitude buffer can be written as a 16-bit grayscale PNG
//! or as a RAW heightfield for external tools.

mod map_image;
mod png;
mod raw;

use thiserror::Error;

pub use map_image::{save_map, ImageFormat};
pub use png::{export_altitude_png, AltitudePngOptions};
pub use raw::{export_altitude_raw, RawFormat};

/// Errors raised while writing output files.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Unsupported image extension: '{0}' (expected png, jpg, jpeg or gif)")]
    UnsupportedExtension(String),
    #[error("Invalid altitude range: min ({0}) >= max ({1})")]
    InvalidRange(f32, f32),
    #[error("Buffer length {0} does not match {1}x{2}")]
    DimensionMismatch(usize, u32, u32),
}

/// Checks that a row-major buffer holds exactly `width * height` values.
fn check_len(len: usize, width: u32, height: u32) -> Result<(), ExportError> {
    if len != width as usize * height as usize {
        return Err(ExportError::DimensionMismatch(len, width, height));
    }
    Ok(())
}

/// Maps `v` from `min..max` to the full `u16` range.
#[inline]
fn normalize_u16(v: f32, min: f32, range: f32) -> u16 {
    (((v - min) / range).clamp(0.0, 1.0) * 65535.0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_u16_clamps() {
        assert_eq!(normalize_u16(-1.0, -1.0, 2.0), 0);
        assert_eq!(normalize_u16(1.0, -1.0, 2.0), 65535);
        assert_eq!(normalize_u16(5.0, -1.0, 2.0), 65535);
        assert_eq!(normalize_u16(-5.0, -1.0, 2.0), 0);
    }

    #[test]
    fn test_check_len() {
        assert!(check_len(12, 4, 3).is_ok());
        assert!(matches!(check_len(11, 4, 3), Err(ExportError::DimensionMismatch(11, 4, 3))));
    }
}
