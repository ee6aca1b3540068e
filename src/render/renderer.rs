//! The render driver: projection, evaluation and classification of every
//! pixel, then gridlines, outlines and shade smoothing.

use std::time::Instant;

use image::{Rgb, RgbImage};
use rayon::prelude::*;

use crate::color::{Classifier, ColorTable};
use crate::config::{ConfigError, RenderConfig, ResolvedConfig};
use crate::projection::{self, GridCanvas, LatitudeExtent, MapProjection};
use crate::terrain::Evaluator;
use super::map::{MapBuffers, Pixel};
use super::post::{outline, smooth_shades};

/// Shade divisor used when composing the final image.
const SHADE_UNIT: u32 = 150;

/// A configured map render.
///
/// Configuration is validated once in [`Renderer::configure`]; afterwards
/// [`Renderer::render`] cannot fail.
pub struct Renderer {
    config: ResolvedConfig,
    table: ColorTable,
    classifier: Classifier,
    projection: Box<dyn MapProjection>,
    /// Template cloned by every worker. Never evaluated directly, so its
    /// cache stays empty.
    evaluator: Evaluator,
    map: MapBuffers,
    rendered: bool,
}

impl Renderer {
    /// Resolves `config` and prepares the colour table, projection and
    /// buffers. Every configuration error surfaces here.
    pub fn configure(config: &RenderConfig) -> Result<Self, ConfigError> {
        let resolved = config.resolve()?;
        Ok(Self::from_resolved(resolved))
    }

    pub fn from_resolved(config: ResolvedConfig) -> Self {
        let table = ColorTable::from_config(&config);
        let classifier = Classifier::new(*table.bands(), config.latitude_colors);
        let projection = projection::build(&config);
        let evaluator = Evaluator::new(&config);
        let map = MapBuffers::new(config.width, config.height, config.shading.is_enabled());
        Self {
            config,
            table,
            classifier,
            projection,
            evaluator,
            map,
            rendered: false,
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn color_table(&self) -> &ColorTable {
        &self.table
    }

    pub fn projection(&self) -> &dyn MapProjection {
        self.projection.as_ref()
    }

    pub fn buffers(&self) -> &MapBuffers {
        &self.map
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    /// Renders the map into the buffers, replacing any previous render.
    pub fn render(&mut self) -> &MapBuffers {
        let start = Instant::now();
        let (width, height) = (self.config.width, self.config.height);
        tracing::info!(
            projection = %self.config.projection,
            variant = ?self.config.variant,
            width,
            height,
            depth = self.config.depth,
            parallel = self.config.parallel,
            "rendering map"
        );

        let extent = if self.config.parallel {
            self.render_parallel()
        } else {
            self.render_sequential()
        };

        if self.config.hgrid > 0.0 || self.config.vgrid > 0.0 {
            let mut canvas = GridCanvas::new(&mut self.map.color, width, height, self.table.bands().grid);
            self.projection.draw_grid(&mut canvas, extent);
        }

        let marked = outline(
            &mut self.map.color,
            width,
            height,
            self.table.bands(),
            self.config.outline,
            self.config.contour_step,
        );

        if self.map.is_shaded() {
            smooth_shades(&mut self.map.shade, width, height);
        }

        self.rendered = true;
        let (min_alt, max_alt) = self.map.altitude_range();
        tracing::info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            outline_pixels = marked,
            min_alt,
            max_alt,
            "map rendered"
        );
        &self.map
    }

    fn render_sequential(&mut self) -> LatitudeExtent {
        let height = self.config.height;
        let tick = (height / 10).max(1);
        let mut evaluator = self.evaluator.clone();
        let mut extent = LatitudeExtent::default();
        for j in 0..height {
            let row = self.render_row(&mut evaluator, j, &mut extent);
            self.map.write_row(j, &row);
            if (j + 1) % tick == 0 {
                tracing::debug!(row = j + 1, percent = (j + 1) * 100 / height, "rendering");
            }
        }
        extent
    }

    fn render_parallel(&mut self) -> LatitudeExtent {
        let height = self.config.height;
        let this = &*self;
        let rows: Vec<(Vec<Pixel>, LatitudeExtent)> = (0..height)
            .into_par_iter()
            .map_init(
                || this.evaluator.clone(),
                |evaluator, j| {
                    let mut extent = LatitudeExtent::default();
                    let row = this.render_row(evaluator, j, &mut extent);
                    (row, extent)
                },
            )
            .collect();

        let mut extent = LatitudeExtent::default();
        for (j, (row, row_extent)) in rows.into_iter().enumerate() {
            self.map.write_row(j as u32, &row);
            extent = extent.merge(row_extent);
        }
        extent
    }

    /// Evaluates one scanline. Off-globe pixels never reach the evaluator.
    fn render_row(&self, evaluator: &mut Evaluator, j: u32, extent: &mut LatitudeExtent) -> Vec<Pixel> {
        let background = Pixel {
            color: self.table.bands().background,
            shade: 255,
            altitude: 0.0,
        };
        let depth = self.projection.depth(j);
        (0..self.config.width)
            .map(|i| match self.projection.project(i, j) {
                Some(p) => {
                    extent.include(p.y);
                    let sample = evaluator.sample(p, depth);
                    Pixel {
                        color: self.classifier.classify(sample.altitude, p),
                        shade: sample.shade.unwrap_or(0),
                        altitude: sample.altitude as f32,
                    }
                }
                None => background,
            })
            .collect()
    }

    /// Pixel at `(x, y)`, or `None` outside the map.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        (x < self.map.width && y < self.map.height).then(|| self.map.pixel(x, y))
    }

    /// Composes the RGB image: table colour, scaled by `shade / 150` and
    /// clamped when shading is enabled.
    pub fn to_rgb_image(&self) -> RgbImage {
        let map = &self.map;
        RgbImage::from_fn(map.width, map.height, |x, y| {
            let idx = map.index(x, y);
            let rgb = self.table.rgb(map.color[idx]);
            match map.shade.get(idx) {
                Some(&s) => Rgb(rgb.map(|c| (s as u32 * c as u32 / SHADE_UNIT).min(255) as u8)),
                None => Rgb(rgb),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Projection, ShadeMode, Variant};

    fn golden_config(parallel: bool) -> RenderConfig {
        RenderConfig {
            seed: 0.6,
            width: 64,
            height: 48,
            scale: 1.0,
            longitude_deg: 0.0,
            latitude_deg: 0.0,
            projection: Projection::Square,
            alt_colors: false,
            depth: Some(32),
            parallel,
            ..Default::default()
        }
    }

    fn render(config: &RenderConfig) -> Renderer {
        let mut renderer = Renderer::configure(config).unwrap();
        renderer.render();
        renderer
    }

    #[test]
    fn test_golden_scenario_is_deterministic() {
        let a = render(&golden_config(false));
        let b = render(&golden_config(false));
        assert_eq!(a.buffers(), b.buffers(), "repeated renders differ");
        assert_eq!(a.buffers().color.len(), 64 * 48);
        let count = a.color_table().len();
        assert!(a.buffers().color.iter().all(|&c| (c as usize) < count));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = render(&golden_config(false));
        let parallel = render(&golden_config(true));
        assert_eq!(sequential.buffers(), parallel.buffers(), "parallel render diverged");
    }

    #[test]
    fn test_unknown_projection_fails_before_rendering() {
        let err = "z".parse::<Projection>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProjection(_)));
        let bad = RenderConfig {
            width: 0,
            ..Default::default()
        };
        assert!(Renderer::configure(&bad).is_err());
    }

    #[test]
    fn test_orthographic_background_outside_disk() {
        let config = RenderConfig {
            seed: 0.3,
            width: 40,
            height: 40,
            projection: Projection::Orthographic,
            shading: ShadeMode::Bump,
            ..Default::default()
        };
        let renderer = render(&config);
        let background = renderer.color_table().bands().background;
        let view = *renderer.projection().view();
        for y in 0..40 {
            for x in 0..40 {
                let (px, py) = view.plane(x, y);
                if px * px + py * py > 1.0 {
                    let pixel = renderer.pixel(x, y).unwrap();
                    assert_eq!(pixel.color, background, "({}, {}) not background", x, y);
                    assert_eq!(pixel.altitude, 0.0);
                }
            }
        }
        // Corner pixels sit outside the smoothing footprint of any globe pixel.
        assert_eq!(renderer.pixel(39, 39).unwrap().shade, 255);
        assert!(renderer.pixel(20, 20).unwrap().altitude != 0.0);
    }

    #[test]
    fn test_pixel_outside_map_is_none() {
        let renderer = Renderer::configure(&golden_config(false)).unwrap();
        assert!(!renderer.is_rendered());
        assert!(renderer.pixel(64, 0).is_none());
        assert!(renderer.pixel(0, 48).is_none());
        assert!(renderer.pixel(63, 47).is_some());
    }

    #[test]
    fn test_gridlines_use_grid_colour() {
        let config = RenderConfig {
            seed: 0.25,
            width: 72,
            height: 36,
            projection: Projection::Square,
            variant: Variant::Extended,
            color_count: Some(64),
            hgrid: 30.0,
            vgrid: 30.0,
            ..Default::default()
        };
        let renderer = render(&config);
        let grid = renderer.color_table().bands().grid;
        let drawn = renderer.buffers().color.iter().filter(|&&c| c == grid).count();
        assert!(drawn >= 72, "expected at least the equator, got {} grid pixels", drawn);
        // The equator sits on row 18.
        assert!((0..72).all(|x| renderer.pixel(x, 18).unwrap().color == grid));
    }

    #[test]
    fn test_rgb_image_uses_table_colours() {
        let renderer = render(&golden_config(false));
        let image = renderer.to_rgb_image();
        assert_eq!(image.dimensions(), (64, 48));
        for (x, y, rgb) in image.enumerate_pixels() {
            let idx = renderer.pixel(x, y).unwrap().color;
            assert_eq!(rgb.0, renderer.color_table().rgb(idx));
        }
    }

    #[test]
    fn test_shaded_image_scales_by_shade() {
        let config = RenderConfig {
            seed: 0.8,
            width: 32,
            height: 24,
            projection: Projection::Mercator,
            shading: ShadeMode::Daylight,
            variant: Variant::Extended,
            color_count: Some(256),
            ..Default::default()
        };
        let renderer = render(&config);
        assert!(renderer.buffers().is_shaded());
        let image = renderer.to_rgb_image();
        let pixel = renderer.pixel(5, 7).unwrap();
        let base = renderer.color_table().rgb(pixel.color);
        let expected = base.map(|c| (pixel.shade as u32 * c as u32 / 150).min(255) as u8);
        assert_eq!(image.get_pixel(5, 7).0, expected);
    }
}
