//! Colour map output, container chosen by file extension.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbImage};

use super::ExportError;

/// JPEG quality used for map output.
const JPEG_QUALITY: u8 = 95;

/// Supported map containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    /// Picks the container from the (case-insensitive) extension of `path`.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "gif" => Ok(ImageFormat::Gif),
            _ => Err(ExportError::UnsupportedExtension(ext)),
        }
    }
}

/// Writes an RGB map to `path`, returning the container used.
///
/// The extension is checked before the file is created, so an unsupported
/// name leaves nothing behind.
pub fn save_map(path: &Path, map: &RgbImage) -> Result<ImageFormat, ExportError> {
    let format = ImageFormat::from_path(path)?;
    let (width, height) = map.dimensions();
    match format {
        ImageFormat::Png => {
            let writer = BufWriter::new(File::create(path)?);
            let encoder = PngEncoder::new_with_quality(writer, CompressionType::Default, FilterType::Adaptive);
            encoder.write_image(map.as_raw(), width, height, ExtendedColorType::Rgb8)?;
        }
        ImageFormat::Jpeg => {
            let writer = BufWriter::new(File::create(path)?);
            let encoder = JpegEncoder::new_with_quality(writer, JPEG_QUALITY);
            encoder.write_image(map.as_raw(), width, height, ExtendedColorType::Rgb8)?;
        }
        ImageFormat::Gif => {
            map.save_with_format(path, image::ImageFormat::Gif)?;
        }
    }
    tracing::debug!(path = %path.display(), ?format, width, height, "map saved");
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::tempdir;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 128]))
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ImageFormat::from_path(Path::new("a.png")).unwrap(), ImageFormat::Png);
        assert_eq!(ImageFormat::from_path(Path::new("a.JPG")).unwrap(), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_path(Path::new("dir/a.jpeg")).unwrap(), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_path(Path::new("a.gif")).unwrap(), ImageFormat::Gif);
        assert!(matches!(
            ImageFormat::from_path(Path::new("a.bmp")),
            Err(ExportError::UnsupportedExtension(ref e)) if e == "bmp"
        ));
        assert!(ImageFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_png_round_trip_is_lossless() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.png");
        let img = gradient(16, 12);
        assert_eq!(save_map(&path, &img).unwrap(), ImageFormat::Png);

        let back = image::open(&path).unwrap().to_rgb8();
        assert_eq!(back, img);
    }

    #[test]
    fn test_jpeg_and_gif_are_written() {
        let dir = tempdir().unwrap();
        let img = gradient(16, 12);
        for name in ["map.jpg", "map.gif"] {
            let path = dir.path().join(name);
            save_map(&path, &img).unwrap();
            let back = image::open(&path).unwrap();
            assert_eq!((back.width(), back.height()), (16, 12), "{} has wrong size", name);
        }
    }

    #[test]
    fn test_unsupported_extension_creates_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.tiff");
        assert!(save_map(&path, &gradient(4, 4)).is_err());
        assert!(!path.exists());
    }
}
