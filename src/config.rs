//! Render configuration.
//!
//! [`RenderConfig`] is the user-facing option set (CLI flags or a JSON file).
//! Before any pixel is computed it is turned into a [`ResolvedConfig`]: angles
//! in radians, colour count clamped to what the variant supports, degenerate
//! conical views replaced by their limit projections, and the base
//! subdivision depth computed.

use std::f64::consts::PI;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::terrain::base_depth;

/// Degrees to radians.
pub const DEG2RAD: f64 = PI / 180.0;

/// Errors raised while validating or loading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown projection selector: '{0}'")]
    UnknownProjection(String),
    #[error("Invalid image dimensions: {0}x{1}")]
    InvalidDimensions(u32, u32),
    #[error("Invalid magnification: {0} (must be finite and > 0)")]
    InvalidScale(f64),
    #[error("Invalid seed: {0} (must be finite)")]
    InvalidSeed(f64),
    #[error("Invalid view centre: longitude {0}, latitude {1}")]
    InvalidView(f64, f64),
    #[error("Invalid grid spacing: {0} (must be finite and >= 0)")]
    InvalidGrid(f64),
    #[error("Atlas colours are only available with the classic variant")]
    AltColorsUnsupported,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The ten supported sphere-to-plane projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// Cylindrical, conformal.
    Mercator,
    /// Cylindrical, area preserving.
    Peters,
    /// Cylindrical, equidistant latitudes.
    Square,
    /// Pseudo-cylindrical, area preserving.
    Mollweide,
    /// Pseudo-cylindrical, area preserving, twelve gores.
    Sinusoid,
    /// Azimuthal, conformal.
    Stereographic,
    /// Azimuthal, the globe seen from infinitely far away.
    Orthographic,
    /// Azimuthal, great circles are straight lines.
    Gnomonic,
    /// Azimuthal, area preserving.
    Azimuthal,
    /// Conic, conformal.
    Conical,
}

impl Projection {
    /// All projections in selector order.
    pub fn all() -> [Projection; 10] {
        [
            Projection::Mercator,
            Projection::Peters,
            Projection::Square,
            Projection::Mollweide,
            Projection::Sinusoid,
            Projection::Stereographic,
            Projection::Orthographic,
            Projection::Gnomonic,
            Projection::Azimuthal,
            Projection::Conical,
        ]
    }

    /// Single-letter selector accepted on the command line.
    pub fn selector(&self) -> char {
        match self {
            Projection::Mercator => 'm',
            Projection::Peters => 'p',
            Projection::Square => 'q',
            Projection::Mollweide => 'M',
            Projection::Sinusoid => 'S',
            Projection::Stereographic => 's',
            Projection::Orthographic => 'o',
            Projection::Gnomonic => 'g',
            Projection::Azimuthal => 'a',
            Projection::Conical => 'c',
        }
    }

    /// Lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Projection::Mercator => "mercator",
            Projection::Peters => "peters",
            Projection::Square => "square",
            Projection::Mollweide => "mollweide",
            Projection::Sinusoid => "sinusoid",
            Projection::Stereographic => "stereographic",
            Projection::Orthographic => "orthographic",
            Projection::Gnomonic => "gnomonic",
            Projection::Azimuthal => "azimuthal",
            Projection::Conical => "conical",
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Projection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // Single letters are case sensitive: 's' is stereographic, 'S' sinusoid.
        if s.chars().count() == 1 {
            return Projection::all()
                .into_iter()
                .find(|p| s.starts_with(p.selector()))
                .ok_or_else(|| ConfigError::UnknownProjection(s.to_string()));
        }
        match s.to_ascii_lowercase().as_str() {
            "mercator" => Ok(Projection::Mercator),
            "peters" => Ok(Projection::Peters),
            "square" | "equirectangular" => Ok(Projection::Square),
            "mollweide" => Ok(Projection::Mollweide),
            "sinusoid" | "sinusoidal" => Ok(Projection::Sinusoid),
            "stereo" | "stereographic" => Ok(Projection::Stereographic),
            "orthographic" => Ok(Projection::Orthographic),
            "gnomonic" => Ok(Projection::Gnomonic),
            "azimuthal" | "azimuth" => Ok(Projection::Azimuthal),
            "conical" | "conic" => Ok(Projection::Conical),
            _ => Err(ConfigError::UnknownProjection(s.to_string())),
        }
    }
}

/// Generation rules. Both share the evaluator and projection code and differ
/// in subdivision constants, outer tetrahedron and colour table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Midpoint splits, up to 256 colours, black background and gridlines.
    #[default]
    Classic,
    /// Seed-biased splits, up to 65536 colours, reserved outline/grid colours.
    Extended,
}

impl Variant {
    pub fn default_altitude_weight(&self) -> f64 {
        match self {
            Variant::Classic => 0.4,
            Variant::Extended => 0.45,
        }
    }

    pub fn default_distance_weight(&self) -> f64 {
        match self {
            Variant::Classic => 0.03,
            Variant::Extended => 0.035,
        }
    }

    pub fn default_color_count(&self) -> u32 {
        match self {
            Variant::Classic => 32,
            Variant::Extended => 65536,
        }
    }

    /// Inclusive bounds on the colour table size.
    pub fn color_count_range(&self) -> (u32, u32) {
        match self {
            Variant::Classic => (5, 256),
            Variant::Extended => (9, 65536),
        }
    }
}

/// How the evaluator derives a shade value at each leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ShadeMode {
    #[default]
    None,
    /// Bump map everywhere.
    Bump,
    /// Bump map on land, flat shade on sea.
    BumpLand,
    /// Directional light from `shade_angle`/`shade_angle2`.
    Daylight,
}

impl ShadeMode {
    pub fn is_enabled(&self) -> bool {
        *self != ShadeMode::None
    }
}

/// Coastline extraction mode for the post-processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutlineMode {
    #[default]
    None,
    /// Stamp coastlines (and contours) over the coloured map.
    Edges,
    /// Collapse the map to black and white, then stamp outlines.
    BlackAndWhite,
}

/// User-facing render options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Master seed; the same seed always yields the same planet.
    pub seed: f64,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Magnification.
    pub scale: f64,
    /// Longitude of the view centre in degrees.
    pub longitude_deg: f64,
    /// Latitude of the view centre in degrees.
    pub latitude_deg: f64,
    pub projection: Projection,
    pub variant: Variant,
    /// Altitude of the outer tetrahedron's vertices (slightly below sea level).
    pub initial_altitude: f64,
    /// Weight of the altitude difference term; variant default if `None`.
    pub altitude_weight: Option<f64>,
    /// Weight of the edge length term; variant default if `None`.
    pub distance_weight: Option<f64>,
    /// Colour table size; variant default if `None`.
    pub color_count: Option<u32>,
    /// Atlas-style colours (classic only).
    pub alt_colors: bool,
    /// Number of lightening passes applied to the key colours.
    pub lighter: u32,
    /// Push icecaps toward the poles.
    pub latitude_colors: bool,
    pub outline: OutlineMode,
    /// Contour line spacing in colour indices (0 = coastline only).
    pub contour_step: u32,
    pub shading: ShadeMode,
    /// Light direction in degrees.
    pub shade_angle: f64,
    /// Light elevation in degrees (daylight shading).
    pub shade_angle2: f64,
    /// Spacing of latitude lines in degrees (0 = none).
    pub hgrid: f64,
    /// Spacing of longitude lines in degrees (0 = none).
    pub vgrid: f64,
    /// Subdivision depth used for every pixel; derived from scale and
    /// height (per row for cylindrical maps) if `None`.
    pub depth: Option<u32>,
    /// Render scanlines on the rayon thread pool.
    pub parallel: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            seed: 0.123,
            width: 512,
            height: 384,
            scale: 1.0,
            longitude_deg: 0.0,
            latitude_deg: 0.0,
            projection: Projection::Mercator,
            variant: Variant::Classic,
            initial_altitude: -0.015,
            altitude_weight: None,
            distance_weight: None,
            color_count: None,
            alt_colors: false,
            lighter: 0,
            latitude_colors: false,
            outline: OutlineMode::None,
            contour_step: 0,
            shading: ShadeMode::None,
            shade_angle: 150.0,
            shade_angle2: 20.0,
            hgrid: 0.0,
            vgrid: 0.0,
            depth: None,
            parallel: true,
        }
    }
}

impl RenderConfig {
    /// Creates a default configuration with the given seed.
    pub fn with_seed(seed: f64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// A whole-world overview: square projection, atlas colours, 30° grid.
    pub fn world_atlas(seed: f64) -> Self {
        Self {
            seed,
            width: 1024,
            height: 512,
            longitude_deg: 180.0,
            projection: Projection::Square,
            alt_colors: true,
            color_count: Some(256),
            hgrid: 30.0,
            vgrid: 30.0,
            ..Default::default()
        }
    }

    /// A shaded globe seen from space using the extended rules.
    pub fn globe(seed: f64) -> Self {
        Self {
            seed,
            width: 768,
            height: 768,
            projection: Projection::Orthographic,
            variant: Variant::Extended,
            shading: ShadeMode::Daylight,
            latitude_colors: true,
            ..Default::default()
        }
    }

    /// Loads a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Checks the options without resolving them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions(self.width, self.height));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::InvalidScale(self.scale));
        }
        if !self.seed.is_finite() {
            return Err(ConfigError::InvalidSeed(self.seed));
        }
        if !self.longitude_deg.is_finite() || !self.latitude_deg.is_finite() {
            return Err(ConfigError::InvalidView(self.longitude_deg, self.latitude_deg));
        }
        for grid in [self.hgrid, self.vgrid] {
            if !grid.is_finite() || grid < 0.0 {
                return Err(ConfigError::InvalidGrid(grid));
            }
        }
        if self.alt_colors && self.variant == Variant::Extended {
            return Err(ConfigError::AltColorsUnsupported);
        }
        Ok(())
    }

    /// Validates and resolves the options into the form the renderer uses.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        self.validate()?;

        let variant = self.variant;
        let (lo, hi) = variant.color_count_range();
        let lo = if self.alt_colors { lo.max(8) } else { lo };
        let requested = self.color_count.unwrap_or_else(|| variant.default_color_count());
        let color_count = requested.clamp(lo, hi);
        if color_count != requested {
            tracing::warn!(requested, color_count, "colour count clamped");
        }

        let mut longitude_deg = self.longitude_deg;
        if longitude_deg > 180.0 {
            longitude_deg -= 360.0;
        }
        let longitude = longitude_deg * DEG2RAD;
        let latitude = self.latitude_deg * DEG2RAD;

        let mut projection = self.projection;
        if projection == Projection::Conical {
            // The cone degenerates to a cylinder at the equator and to a plane at the poles.
            if latitude == 0.0 {
                projection = Projection::Mercator;
            }
            if latitude.abs() >= PI - 0.000001 {
                projection = Projection::Stereographic;
            }
            if projection != Projection::Conical {
                tracing::debug!(%projection, "conical view replaced by its limit projection");
            }
        }

        let fixed_depth = self.depth.map(|d| d.min(i32::MAX as u32) as i32);

        Ok(ResolvedConfig {
            seed: self.seed,
            width: self.width,
            height: self.height,
            scale: self.scale,
            longitude,
            latitude,
            projection,
            variant,
            initial_altitude: self.initial_altitude,
            altitude_weight: self.altitude_weight.unwrap_or_else(|| variant.default_altitude_weight()),
            distance_weight: self.distance_weight.unwrap_or_else(|| variant.default_distance_weight()),
            color_count,
            alt_colors: self.alt_colors,
            lighter: self.lighter,
            latitude_colors: self.latitude_colors,
            outline: self.outline,
            contour_step: self.contour_step,
            shading: self.shading,
            shade_angle: self.shade_angle,
            shade_angle2: self.shade_angle2,
            hgrid: self.hgrid,
            vgrid: self.vgrid,
            parallel: self.parallel,
            depth: fixed_depth.unwrap_or_else(|| base_depth(self.scale, self.height)),
            fixed_depth,
        })
    }
}

/// Fully resolved, immutable parameters of one render.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub seed: f64,
    pub width: u32,
    pub height: u32,
    pub scale: f64,
    /// View centre longitude in radians, in (-π, π].
    pub longitude: f64,
    /// View centre latitude in radians.
    pub latitude: f64,
    pub projection: Projection,
    pub variant: Variant,
    pub initial_altitude: f64,
    pub altitude_weight: f64,
    pub distance_weight: f64,
    pub color_count: u32,
    pub alt_colors: bool,
    pub lighter: u32,
    pub latitude_colors: bool,
    pub outline: OutlineMode,
    pub contour_step: u32,
    pub shading: ShadeMode,
    pub shade_angle: f64,
    pub shade_angle2: f64,
    pub hgrid: f64,
    pub vgrid: f64,
    pub parallel: bool,
    /// Subdivision depth for projections that do not vary it per row.
    pub depth: i32,
    /// User override applied to every row of every projection.
    pub fixed_depth: Option<i32>,
}
