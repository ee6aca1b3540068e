//! Map projections.
//!
//! Every projection maps an output pixel to a point on the unit sphere (or
//! reports it as off the globe) and knows how to burn latitude/longitude
//! gridlines into a finished colour buffer.
//!
//! The sphere frame has `y` on the polar axis with north at negative `y`,
//! so that image row 0 is the northern edge.

mod azimuthal;
mod conical;
mod cylindrical;
mod pseudo;

use std::f64::consts::PI;

use glam::DVec3;

use crate::color::ColorIndex;
use crate::config::{Projection, ResolvedConfig, DEG2RAD};
use crate::terrain::row_depth;

pub use azimuthal::{Azimuthal, Gnomonic, Orthographic, Stereographic};
pub use conical::Conical;
pub use cylindrical::{Mercator, Peters, Square};
pub use pseudo::{Mollweide, Sinusoid};

/// Viewing parameters shared by all projections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
    /// View centre longitude in radians.
    pub longitude: f64,
    /// View centre latitude in radians.
    pub latitude: f64,
    pub sin_lat: f64,
    pub cos_lat: f64,
    pub sin_lon: f64,
    pub cos_lon: f64,
    /// Latitude gridline spacing in degrees (0 = none).
    pub hgrid: f64,
    /// Longitude gridline spacing in degrees (0 = none).
    pub vgrid: f64,
    base_depth: i32,
    fixed_depth: Option<i32>,
}

impl View {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            scale: config.scale,
            longitude: config.longitude,
            latitude: config.latitude,
            sin_lat: config.latitude.sin(),
            cos_lat: config.latitude.cos(),
            sin_lon: config.longitude.sin(),
            cos_lon: config.longitude.cos(),
            hgrid: config.hgrid,
            vgrid: config.vgrid,
            base_depth: config.depth,
            fixed_depth: config.fixed_depth,
        }
    }

    #[inline]
    pub fn w(&self) -> f64 {
        self.width as f64
    }

    #[inline]
    pub fn h(&self) -> f64 {
        self.height as f64
    }

    /// Depth used by projections with uniform magnification.
    pub fn base_depth(&self) -> i32 {
        self.base_depth
    }

    /// Depth for a scanline at parallel radius `cos2`: the local
    /// magnification grows as the parallel shrinks.
    pub fn scanline_depth(&self, cos2: f64) -> i32 {
        match self.fixed_depth {
            Some(depth) => depth,
            None => row_depth(self.scale * self.w() / self.h() / cos2 / PI, self.height),
        }
    }

    /// Plane coordinates of a pixel for the azimuthal family, one unit being
    /// half the image height at scale 1.
    #[inline]
    pub fn plane(&self, i: u32, j: u32) -> (f64, f64) {
        (
            (2.0 * i as f64 - self.w()) / self.h() / self.scale,
            (2.0 * j as f64 - self.h()) / self.h() / self.scale,
        )
    }

    /// Rotates a point from the view frame (looking down `+z`) to the globe
    /// frame, putting the view centre at the configured longitude/latitude.
    #[inline]
    pub fn rotate(&self, x: f64, y: f64, z: f64) -> DVec3 {
        let (sla, cla, slo, clo) = (self.sin_lat, self.cos_lat, self.sin_lon, self.cos_lon);
        DVec3::new(
            clo * x + slo * sla * y + slo * cla * z,
            cla * y - sla * z,
            -slo * x + clo * sla * y + clo * cla * z,
        )
    }

    /// Inverse of [`View::rotate`]: globe frame back to the view frame.
    #[inline]
    pub fn unrotate(&self, p: DVec3) -> DVec3 {
        let (sla, cla, slo, clo) = (self.sin_lat, self.cos_lat, self.sin_lon, self.cos_lon);
        DVec3::new(
            clo * p.x - slo * p.z,
            slo * sla * p.x + cla * p.y + clo * sla * p.z,
            slo * cla * p.x - sla * p.y + clo * cla * p.z,
        )
    }

    /// Pixel of a plane point on the azimuthal family; inverse of [`View::plane`].
    #[inline]
    pub fn plane_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (0.5 * (self.h() * self.scale * x + self.w())).trunc(),
            (0.5 * (self.h() * self.scale * y + self.h())).trunc(),
        )
    }

    /// Longitude of column `i` on the cylindrical family.
    #[inline]
    pub fn column_longitude(&self, i: u32) -> f64 {
        self.longitude - 0.5 * PI + PI * (2.0 * i as f64 - self.w()) / self.w() / self.scale
    }

    /// Column of the meridian at `deg` degrees on the cylindrical family.
    #[inline]
    pub fn meridian_column(&self, deg: f64) -> f64 {
        (0.5 * self.w() * (1.0 + self.scale * (DEG2RAD * deg - self.longitude) / PI)).trunc()
    }
}

/// Range of polar coordinates actually drawn, used to skip gridlines that
/// cannot appear on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatitudeExtent {
    pub min: f64,
    pub max: f64,
}

impl Default for LatitudeExtent {
    fn default() -> Self {
        Self { min: 2.0, max: -2.0 }
    }
}

impl LatitudeExtent {
    pub fn include(&mut self, y: f64) {
        if y < self.min {
            self.min = y;
        }
        if y > self.max {
            self.max = y;
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn contains(&self, y: f64) -> bool {
        self.min <= y && y <= self.max
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

/// Bounds-checked writer for gridline pixels.
pub struct GridCanvas<'a> {
    colors: &'a mut [ColorIndex],
    width: u32,
    height: u32,
    color: ColorIndex,
}

impl<'a> GridCanvas<'a> {
    /// Wraps a row-major colour buffer of `width * height` entries.
    pub fn new(colors: &'a mut [ColorIndex], width: u32, height: u32, color: ColorIndex) -> Self {
        debug_assert_eq!(colors.len(), width as usize * height as usize);
        Self {
            colors,
            width,
            height,
            color,
        }
    }

    #[inline]
    fn in_bounds(&self, i: f64, j: f64) -> bool {
        i >= 0.0 && i < self.width as f64 && j >= 0.0 && j < self.height as f64
    }

    /// Marks pixel `(trunc(i), trunc(j))` if it lies on the image.
    /// Non-finite coordinates are ignored.
    pub fn mark(&mut self, i: f64, j: f64) {
        let (i, j) = (i.trunc(), j.trunc());
        if self.in_bounds(i, j) {
            let idx = j as usize * self.width as usize + i as usize;
            self.colors[idx] = self.color;
        }
    }

    /// Marks a whole row.
    pub fn mark_row(&mut self, j: f64) {
        if j >= 0.0 && j < self.height as f64 {
            let start = j as usize * self.width as usize;
            self.colors[start..start + self.width as usize].fill(self.color);
        }
    }

    /// Marks column `i` for rows `from..to`, clipped to the image.
    pub fn mark_column(&mut self, i: f64, from: f64, to: f64) {
        if i < 0.0 || i >= self.width as f64 {
            return;
        }
        let from = from.max(0.0);
        let to = to.min(self.height as f64);
        let mut j = from.trunc();
        while j < to {
            self.mark(i, j);
            j += 1.0;
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// `start, start + step, ...` while below `end`, accumulated in floating
/// point so gridlines land where repeated addition puts them.
pub(crate) fn float_steps(start: f64, end: f64, step: f64) -> impl Iterator<Item = f64> {
    std::iter::successors(Some(start), move |&t| Some(t + step)).take_while(move |&t| t < end)
}

/// Gridline angles in degrees: the multiples of `step` reachable by stepping
/// down from 0 past `-limit`, then up to (but excluding) `limit`.
pub(crate) fn grid_angles(step: f64, limit: f64) -> impl Iterator<Item = f64> {
    let mut t = 0.0;
    while t > -limit {
        t -= step;
    }
    float_steps(t, limit, step)
}

/// A sphere-to-plane projection.
pub trait MapProjection: Send + Sync {
    fn kind(&self) -> Projection;

    fn view(&self) -> &View;

    /// Subdivision depth for pixels on row `j`.
    fn depth(&self, j: u32) -> i32;

    /// Sphere point seen at pixel `(i, j)`, or `None` when the pixel is off
    /// the globe and must be painted as background.
    fn project(&self, i: u32, j: u32) -> Option<DVec3>;

    /// Burns latitude lines every `step` degrees.
    fn draw_parallels(&self, canvas: &mut GridCanvas<'_>, extent: LatitudeExtent, step: f64);

    /// Burns longitude lines every `step` degrees.
    fn draw_meridians(&self, canvas: &mut GridCanvas<'_>, extent: LatitudeExtent, step: f64);

    /// Burns the configured gridlines. `extent` is the range of polar
    /// coordinates seen while rendering.
    fn draw_grid(&self, canvas: &mut GridCanvas<'_>, extent: LatitudeExtent) {
        let view = *self.view();
        if view.hgrid > 0.0 {
            self.draw_parallels(canvas, extent, view.hgrid);
        }
        if view.vgrid > 0.0 {
            self.draw_meridians(canvas, extent, view.vgrid);
        }
    }
}

/// Builds the projection selected by a resolved configuration.
pub fn build(config: &ResolvedConfig) -> Box<dyn MapProjection> {
    let view = View::from_config(config);
    match config.projection {
        Projection::Mercator => Box::new(Mercator::new(view)),
        Projection::Peters => Box::new(Peters::new(view)),
        Projection::Square => Box::new(Square::new(view)),
        Projection::Mollweide => Box::new(Mollweide::new(view)),
        Projection::Sinusoid => Box::new(Sinusoid::new(view)),
        Projection::Stereographic => Box::new(Stereographic::new(view)),
        Projection::Orthographic => Box::new(Orthographic::new(view)),
        Projection::Gnomonic => Box::new(Gnomonic::new(view)),
        Projection::Azimuthal => Box::new(Azimuthal::new(view)),
        Projection::Conical => Box::new(Conical::new(view)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;

    pub(crate) fn view_for(projection: Projection, width: u32, height: u32) -> View {
        let config = RenderConfig {
            projection,
            width,
            height,
            latitude_deg: if projection == Projection::Conical { 40.0 } else { 0.0 },
            ..Default::default()
        }
        .resolve()
        .unwrap();
        View::from_config(&config)
    }

    #[test]
    fn test_every_projection_yields_unit_points() {
        for projection in Projection::all() {
            let config = RenderConfig {
                projection,
                width: 40,
                height: 30,
                latitude_deg: 30.0,
                longitude_deg: 20.0,
                ..Default::default()
            }
            .resolve()
            .unwrap();
            let proj = build(&config);
            assert_eq!(proj.kind(), projection);
            let mut on_globe = 0;
            for j in 0..30 {
                for i in 0..40 {
                    if let Some(p) = proj.project(i, j) {
                        on_globe += 1;
                        assert!(
                            (p.length() - 1.0).abs() < 1e-9,
                            "{} produced non-unit point {:?} at ({}, {})",
                            projection,
                            p,
                            i,
                            j
                        );
                    }
                }
            }
            assert!(on_globe > 0, "{} drew nothing", projection);
        }
    }

    #[test]
    fn test_rotation_preserves_length_and_centre() {
        let config = RenderConfig {
            longitude_deg: 45.0,
            latitude_deg: 30.0,
            ..Default::default()
        }
        .resolve()
        .unwrap();
        let view = View::from_config(&config);
        let p = view.rotate(0.3, -0.4, (1.0f64 - 0.25).sqrt());
        assert!((p.length() - 1.0).abs() < 1e-12);
        let centre = view.rotate(0.0, 0.0, 1.0);
        assert!((centre.y - -config.latitude.sin()).abs() < 1e-12);
        let back = view.unrotate(p);
        assert!((back - DVec3::new(0.3, -0.4, (1.0f64 - 0.25).sqrt())).length() < 1e-12);
    }

    #[test]
    fn test_grid_angles_cover_symmetric_range() {
        let angles: Vec<f64> = grid_angles(30.0, 90.0).collect();
        assert_eq!(angles, vec![-90.0, -60.0, -30.0, 0.0, 30.0, 60.0]);
        let angles: Vec<f64> = grid_angles(45.0, 360.0).collect();
        assert_eq!(angles.len(), 16);
        assert_eq!(angles[0], -360.0);
    }

    #[test]
    fn test_canvas_ignores_out_of_bounds() {
        let mut colors = vec![9u16; 12];
        let mut canvas = GridCanvas::new(&mut colors, 4, 3, 0);
        canvas.mark(-1.0, 0.0);
        canvas.mark(4.0, 0.0);
        canvas.mark(0.0, 3.0);
        canvas.mark(f64::NAN, 1.0);
        canvas.mark(f64::INFINITY, 1.0);
        canvas.mark_row(-1.0);
        canvas.mark_row(3.0);
        canvas.mark_column(7.0, 0.0, 3.0);
        assert!(colors.iter().all(|&c| c == 9));
    }

    #[test]
    fn test_canvas_marks_rows_and_columns() {
        let mut colors = vec![9u16; 12];
        let mut canvas = GridCanvas::new(&mut colors, 4, 3, 0);
        canvas.mark_row(1.0);
        canvas.mark_column(2.0, -5.0, 10.0);
        canvas.mark(0.9, 2.9);
        let expected = [
            9, 9, 0, 9, //
            0, 0, 0, 0, //
            0, 9, 0, 9,
        ];
        assert_eq!(colors, expected);
    }

    #[test]
    fn test_latitude_extent() {
        let mut extent = LatitudeExtent::default();
        assert!(extent.is_empty());
        extent.include(-0.5);
        extent.include(0.25);
        assert!(extent.contains(0.0));
        assert!(!extent.contains(0.3));
        let merged = extent.merge(LatitudeExtent { min: 0.0, max: 0.9 });
        assert!(merged.contains(0.8));
        assert!(merged.contains(-0.5));
    }

    #[test]
    fn test_fixed_depth_applies_to_every_row() {
        let config = RenderConfig {
            projection: Projection::Square,
            width: 64,
            height: 48,
            depth: Some(32),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        let proj = build(&config);
        for j in 0..48 {
            assert_eq!(proj.depth(j), 32);
        }
    }

    #[test]
    fn test_view_helper() {
        let view = view_for(Projection::Mercator, 100, 50);
        assert_eq!(view.plane(50, 25), (0.0, 0.0));
        assert_eq!(view.meridian_column(0.0), 50.0);
    }
}
