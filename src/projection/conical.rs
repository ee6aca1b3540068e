//! Conformal conic projection.
//!
//! The cone touches the globe along the parallel of the view latitude and is
//! unrolled with its apex towards the nearer pole. Zero and polar view
//! latitudes are replaced by Mercator and stereographic during
//! configuration, so the cone constant here is always finite.

use std::f64::consts::PI;

use glam::DVec3;

use crate::config::{Projection, DEG2RAD};
use super::{float_steps, grid_angles, GridCanvas, LatitudeExtent, MapProjection, View};

#[derive(Debug, Clone)]
pub struct Conical {
    view: View,
    /// Inverse cone constant, `1 / sin(latitude)`. Negative in the south.
    k1: f64,
    /// `k1²`.
    c: f64,
    /// Distance from the apex to the view centre on the map.
    y2: f64,
}

impl Conical {
    pub fn new(view: View) -> Self {
        let k1 = 1.0 / view.sin_lat;
        let c = k1 * k1;
        let s = (view.latitude / k1).sin();
        let y2 = (c * (1.0 - s) / (1.0 + s)).sqrt();
        Self { view, k1, c, y2 }
    }

    fn northern(&self) -> bool {
        self.view.latitude > 0.0
    }

    /// Map radius (from the apex) of the parallel at `lat` radians.
    fn parallel_radius(&self, lat: f64) -> f64 {
        let s = (lat / self.k1).sin();
        (self.c * (1.0 + s) / (1.0 - s)).sqrt()
    }

    /// Marks the map point at `radius` from the apex and `rel_lon` radians
    /// from the central meridian.
    fn mark(&self, canvas: &mut GridCanvas<'_>, radius: f64, rel_lon: f64) {
        let v = &self.view;
        let sign = if self.northern() { 1.0 } else { -1.0 };
        let x1 = sign * radius * (rel_lon / self.k1).sin();
        let y1 = sign * radius * (rel_lon / self.k1).cos();
        let i = 0.5 * (v.h() * v.scale * x1 + v.w());
        let j = 0.5 * (v.h() * v.scale * (y1 - sign * self.y2) + v.h());
        canvas.mark(i, j);
    }
}

impl MapProjection for Conical {
    fn kind(&self) -> Projection {
        Projection::Conical
    }

    fn view(&self) -> &View {
        &self.view
    }

    fn depth(&self, _j: u32) -> i32 {
        self.view.base_depth()
    }

    fn project(&self, i: u32, j: u32) -> Option<DVec3> {
        let v = &self.view;
        let (x, plane_y) = v.plane(i, j);
        let (y, theta1) = if self.northern() {
            let y = plane_y + self.y2;
            (y, self.k1 * x.atan2(y))
        } else {
            let y = plane_y - self.y2;
            (y, -self.k1 * x.atan2(-y))
        };
        let zz = x * x + y * y;
        let theta1 = if zz == 0.0 { 0.0 } else { theta1 };
        if theta1.is_nan() || theta1.abs() > PI {
            return None;
        }
        let lon = theta1 + v.longitude - 0.5 * PI;
        let lat = self.k1 * ((zz - self.c) / (zz + self.c)).asin();
        if lat.is_nan() || lat.abs() > 0.5 * PI {
            return None;
        }
        let cos2 = lat.cos();
        Some(DVec3::new(lon.cos() * cos2, lat.sin(), -lon.sin() * cos2))
    }

    fn draw_parallels(&self, canvas: &mut GridCanvas<'_>, extent: LatitudeExtent, step: f64) {
        let v = &self.view;
        let sample = 0.5 / v.w() / v.scale;
        for theta in grid_angles(step, 90.0) {
            let lat = DEG2RAD * theta;
            if !extent.contains(lat.sin()) {
                continue;
            }
            let radius = self.parallel_radius(lat);
            for t in float_steps(-PI + v.longitude, PI + v.longitude, sample) {
                self.mark(canvas, radius, t - v.longitude);
            }
        }
    }

    fn draw_meridians(&self, canvas: &mut GridCanvas<'_>, extent: LatitudeExtent, step: f64) {
        let v = &self.view;
        let sample = 0.5 / v.w() / v.scale;
        let centre_deg = v.longitude / DEG2RAD;
        for lat in float_steps(-0.5 * PI, 0.5 * PI, sample) {
            if !extent.contains(lat.sin()) {
                continue;
            }
            let radius = self.parallel_radius(lat);
            let mut theta = 0.0;
            while theta > -180.0 + centre_deg {
                theta -= step;
            }
            for theta in float_steps(theta, 180.0 + centre_deg, step) {
                self.mark(canvas, radius, DEG2RAD * theta - v.longitude);
            }
        }
    }
}
