//! RAW heightfield export of the altitude buffer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{check_len, normalize_u16, ExportError};

/// RAW sample layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RawFormat {
    /// 16-bit unsigned, little-endian, normalized to the given range.
    #[default]
    R16,
    /// 16-bit unsigned, big-endian, normalized to the given range.
    R16Be,
    /// 32-bit float, little-endian, raw altitudes.
    R32,
}

impl RawFormat {
    pub fn bytes_per_sample(&self) -> u64 {
        match self {
            RawFormat::R16 | RawFormat::R16Be => 2,
            RawFormat::R32 => 4,
        }
    }

    /// File size of a `width * height` export.
    pub fn file_size(&self, width: u32, height: u32) -> u64 {
        width as u64 * height as u64 * self.bytes_per_sample()
    }
}

/// Writes a row-major altitude buffer as headerless samples.
///
/// `min`/`max` are only used by the 16-bit layouts.
pub fn export_altitude_raw(
    altitude: &[f32],
    width: u32,
    height: u32,
    path: &Path,
    format: RawFormat,
    min: f32,
    max: f32,
) -> Result<(), ExportError> {
    if format != RawFormat::R32 && (min.is_nan() || max.is_nan() || min >= max) {
        return Err(ExportError::InvalidRange(min, max));
    }
    check_len(altitude.len(), width, height)?;

    let mut writer = BufWriter::new(File::create(path)?);
    let range = max - min;
    match format {
        RawFormat::R16 => {
            for &a in altitude {
                writer.write_all(&normalize_u16(a, min, range).to_le_bytes())?;
            }
        }
        RawFormat::R16Be => {
            for &a in altitude {
                writer.write_all(&normalize_u16(a, min, range).to_be_bytes())?;
            }
        }
        RawFormat::R32 => {
            for &a in altitude {
                writer.write_all(&a.to_le_bytes())?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}
