//! Cylindrical projections: Mercator, Peters and square (equirectangular).
//!
//! All three share the column-to-longitude mapping and differ only in how a
//! row maps to latitude. The view latitude shifts the map vertically by `k`
//! rows instead of rotating the globe.

use std::f64::consts::PI;

use glam::DVec3;

use crate::config::{Projection, DEG2RAD};
use super::{grid_angles, GridCanvas, LatitudeExtent, MapProjection, View};

/// Point on the parallel of polar coordinate `y` (radius `cos2`) at longitude `theta`.
#[inline]
fn on_parallel(theta: f64, y: f64, cos2: f64) -> DVec3 {
    DVec3::new(theta.cos() * cos2, y, -theta.sin() * cos2)
}

/// Row of the parallel whose vertical map coordinate is `y`.
#[inline]
fn parallel_row(view: &View, y: f64, k: i64) -> f64 {
    (view.height / 2) as f64 + (0.5 * y * view.w() * view.scale / PI).trunc() + k as f64
}

/// Conformal cylindrical projection. No pixel is off the globe; the poles
/// are simply never reached.
#[derive(Debug, Clone)]
pub struct Mercator {
    view: View,
    k: i64,
}

impl Mercator {
    pub fn new(view: View) -> Self {
        let k = (0.5 * Self::stretch(view.sin_lat) * view.w() * view.scale / PI) as i64;
        Self { view, k }
    }

    /// Mercator ordinate of a parallel given its sine.
    fn stretch(sin_lat: f64) -> f64 {
        0.5 * ((1.0 + sin_lat) / (1.0 - sin_lat)).ln()
    }

    /// Polar coordinate of row `j`.
    fn row_y(&self, j: u32) -> f64 {
        let v = &self.view;
        let y = PI * (2.0 * (j as f64 - self.k as f64) - v.h()) / v.w() / v.scale;
        let y = (2.0 * y).exp();
        (y - 1.0) / (y + 1.0)
    }
}

impl MapProjection for Mercator {
    fn kind(&self) -> Projection {
        Projection::Mercator
    }

    fn view(&self) -> &View {
        &self.view
    }

    fn depth(&self, j: u32) -> i32 {
        let y = self.row_y(j);
        self.view.scanline_depth((1.0 - y * y).sqrt())
    }

    fn project(&self, i: u32, j: u32) -> Option<DVec3> {
        let y = self.row_y(j);
        let cos2 = (1.0 - y * y).sqrt();
        // Only reachable through float overflow far beyond the poles.
        if cos2.is_nan() || cos2 <= 0.0 {
            return None;
        }
        Some(on_parallel(self.view.column_longitude(i), y, cos2))
    }

    fn draw_parallels(&self, canvas: &mut GridCanvas<'_>, _extent: LatitudeExtent, step: f64) {
        for theta in grid_angles(step, 90.0) {
            let y = Self::stretch((DEG2RAD * theta).sin());
            canvas.mark_row(parallel_row(&self.view, y, self.k));
        }
    }

    fn draw_meridians(&self, canvas: &mut GridCanvas<'_>, _extent: LatitudeExtent, step: f64) {
        for theta in grid_angles(step, 360.0) {
            let i = self.view.meridian_column(theta);
            canvas.mark_column(i, 0.0, self.view.h());
        }
    }
}

/// Area-preserving cylindrical projection.
#[derive(Debug, Clone)]
pub struct Peters {
    view: View,
    k: i64,
}

impl Peters {
    pub fn new(view: View) -> Self {
        let y = 2.0 * view.sin_lat;
        let k = (0.5 * y * view.w() * view.scale / PI) as i64;
        Self { view, k }
    }

    fn row_y(&self, j: u32) -> f64 {
        let v = &self.view;
        0.5 * PI * (2.0 * (j as f64 - self.k as f64) - v.h()) / v.w() / v.scale
    }

    /// Vertical half-extent of the map in rows.
    fn half_rows(&self) -> f64 {
        (self.view.w() * self.view.scale / PI).trunc()
    }
}

impl MapProjection for Peters {
    fn kind(&self) -> Projection {
        Projection::Peters
    }

    fn view(&self) -> &View {
        &self.view
    }

    fn depth(&self, j: u32) -> i32 {
        let y = self.row_y(j);
        if y.abs() > 1.0 {
            return self.view.base_depth();
        }
        self.view.scanline_depth((1.0 - y * y).sqrt())
    }

    fn project(&self, i: u32, j: u32) -> Option<DVec3> {
        let y = self.row_y(j);
        if y.abs() > 1.0 {
            return None;
        }
        let cos2 = (1.0 - y * y).sqrt();
        if cos2 <= 0.0 {
            return None;
        }
        Some(on_parallel(self.view.column_longitude(i), y, cos2))
    }

    fn draw_parallels(&self, canvas: &mut GridCanvas<'_>, _extent: LatitudeExtent, step: f64) {
        for theta in grid_angles(step, 90.0) {
            let y = 2.0 * (DEG2RAD * theta).sin();
            canvas.mark_row(parallel_row(&self.view, y, self.k));
        }
    }

    fn draw_meridians(&self, canvas: &mut GridCanvas<'_>, _extent: LatitudeExtent, step: f64) {
        let mid = (self.view.height / 2) as f64 + self.k as f64;
        let half = self.half_rows();
        for theta in grid_angles(step, 360.0) {
            let i = self.view.meridian_column(theta);
            canvas.mark_column(i, mid - half, mid + half);
        }
    }
}

/// Square projection: latitude proportional to row, equidistant parallels.
#[derive(Debug, Clone)]
pub struct Square {
    view: View,
    k: i64,
}

impl Square {
    pub fn new(view: View) -> Self {
        let k = (view.latitude * view.w() * view.scale / PI) as i64;
        Self { view, k }
    }

    /// Latitude (in radians, north negative) of row `j`.
    fn row_angle(&self, j: u32) -> f64 {
        let v = &self.view;
        (2.0 * (j as f64 - self.k as f64) - v.h()) / v.w() / v.scale * PI
    }
}

impl MapProjection for Square {
    fn kind(&self) -> Projection {
        Projection::Square
    }

    fn view(&self) -> &View {
        &self.view
    }

    fn depth(&self, j: u32) -> i32 {
        let y = self.row_angle(j);
        if y.abs() >= 0.5 * PI {
            return self.view.base_depth();
        }
        self.view.scanline_depth(y.cos())
    }

    fn project(&self, i: u32, j: u32) -> Option<DVec3> {
        let y = self.row_angle(j);
        if y.abs() >= 0.5 * PI {
            return None;
        }
        let cos2 = y.cos();
        if cos2 <= 0.0 {
            return None;
        }
        Some(on_parallel(self.view.column_longitude(i), y.sin(), cos2))
    }

    fn draw_parallels(&self, canvas: &mut GridCanvas<'_>, _extent: LatitudeExtent, step: f64) {
        for theta in grid_angles(step, 90.0) {
            canvas.mark_row(parallel_row(&self.view, DEG2RAD * theta, self.k));
        }
    }

    fn draw_meridians(&self, canvas: &mut GridCanvas<'_>, _extent: LatitudeExtent, step: f64) {
        let v = &self.view;
        let mid = (v.height / 2) as f64 + self.k as f64;
        let half = (0.25 * PI * v.w() * v.scale / PI).trunc();
        for theta in grid_angles(step, 360.0) {
            canvas.mark_column(v.meridian_column(theta), mid - half, mid + half);
        }
    }
}
