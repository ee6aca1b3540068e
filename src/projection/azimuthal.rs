//! Azimuthal projections: stereographic, orthographic, gnomonic and
//! area-preserving azimuthal.
//!
//! The image plane is tangent to the globe at the view centre. Pixels are
//! mapped to the plane, lifted onto the sphere in the view frame (looking
//! down `+z`) and rotated to the view centre.

use std::f64::consts::PI;

use glam::DVec3;

use crate::config::{Projection, DEG2RAD};
use super::{float_steps, grid_angles, GridCanvas, LatitudeExtent, MapProjection, View};

/// Plane position of a view-frame sphere point, if it is drawn.
type ToPlane = fn(DVec3) -> Option<(f64, f64)>;

fn mark_on_plane(view: &View, canvas: &mut GridCanvas<'_>, p: DVec3, to_plane: ToPlane) {
    if let Some((x, y)) = to_plane(view.unrotate(p)) {
        let (i, j) = view.plane_to_pixel(x, y);
        canvas.mark(i, j);
    }
}

/// Samples each latitude line densely enough to leave no gaps at this
/// resolution and marks the pixels it lands on.
fn draw_parallels(view: &View, canvas: &mut GridCanvas<'_>, extent: LatitudeExtent, step: f64, to_plane: ToPlane) {
    let sample = 0.5 / view.w() / view.scale;
    for theta in grid_angles(step, 90.0) {
        let y = (DEG2RAD * theta).sin();
        if !extent.contains(y) {
            continue;
        }
        let zz = (1.0 - y * y).sqrt();
        for t in float_steps(-PI, PI, sample) {
            let p = DVec3::new(t.sin() * zz, y, t.cos() * zz);
            mark_on_plane(view, canvas, p, to_plane);
        }
    }
}

fn draw_meridians(view: &View, canvas: &mut GridCanvas<'_>, extent: LatitudeExtent, step: f64, to_plane: ToPlane) {
    let sample = 0.5 / view.w() / view.scale;
    for t in float_steps(-PI, PI, sample) {
        let y = t.sin();
        if !extent.contains(y) {
            continue;
        }
        let cos_t = t.cos();
        for theta in float_steps(0.0, 360.0, step) {
            let lon = DEG2RAD * theta;
            let p = DVec3::new(lon.sin() * cos_t, y, lon.cos() * cos_t);
            mark_on_plane(view, canvas, p, to_plane);
        }
    }
}

macro_rules! azimuthal_projection {
    ($name:ident, $kind:expr) => {
        impl MapProjection for $name {
            fn kind(&self) -> Projection {
                $kind
            }

            fn view(&self) -> &View {
                &self.view
            }

            fn depth(&self, _j: u32) -> i32 {
                self.view.base_depth()
            }

            fn project(&self, i: u32, j: u32) -> Option<DVec3> {
                let (x, y) = self.view.plane(i, j);
                Self::lift(x, y).map(|p| self.view.rotate(p.x, p.y, p.z))
            }

            fn draw_parallels(&self, canvas: &mut GridCanvas<'_>, extent: LatitudeExtent, step: f64) {
                draw_parallels(&self.view, canvas, extent, step, Self::to_plane);
            }

            fn draw_meridians(&self, canvas: &mut GridCanvas<'_>, extent: LatitudeExtent, step: f64) {
                draw_meridians(&self.view, canvas, extent, step, Self::to_plane);
            }
        }
    };
}

/// Conformal azimuthal projection from the antipode of the view centre.
/// Covers the whole plane; distortion grows without bound.
#[derive(Debug, Clone)]
pub struct Stereographic {
    view: View,
}

impl Stereographic {
    pub fn new(view: View) -> Self {
        Self { view }
    }

    fn lift(x: f64, y: f64) -> Option<DVec3> {
        let z = x * x + y * y;
        let zz = 0.25 * (4.0 + z);
        Some(DVec3::new(x / zz, y / zz, (1.0 - 0.25 * z) / zz))
    }

    fn to_plane(p: DVec3) -> Option<(f64, f64)> {
        if p.z <= -1.0 {
            return None;
        }
        let k = 2.0 / (1.0 + p.z);
        Some((k * p.x, k * p.y))
    }
}

azimuthal_projection!(Stereographic, Projection::Stereographic);

/// The globe as seen from infinitely far away: a disk of radius 1.
#[derive(Debug, Clone)]
pub struct Orthographic {
    view: View,
}

impl Orthographic {
    pub fn new(view: View) -> Self {
        Self { view }
    }

    fn lift(x: f64, y: f64) -> Option<DVec3> {
        if x * x + y * y > 1.0 {
            return None;
        }
        Some(DVec3::new(x, y, (1.0 - x * x - y * y).sqrt()))
    }

    fn to_plane(p: DVec3) -> Option<(f64, f64)> {
        (p.z >= 0.0).then_some((p.x, p.y))
    }
}

azimuthal_projection!(Orthographic, Projection::Orthographic);

/// Central projection: every great circle is a straight line. Only the
/// near hemisphere is representable.
#[derive(Debug, Clone)]
pub struct Gnomonic {
    view: View,
}

impl Gnomonic {
    pub fn new(view: View) -> Self {
        Self { view }
    }

    fn lift(x: f64, y: f64) -> Option<DVec3> {
        let zz = (1.0 / (1.0 + x * x + y * y)).sqrt();
        let (x, y) = (x * zz, y * zz);
        Some(DVec3::new(x, y, (1.0 - x * x - y * y).sqrt()))
    }

    fn to_plane(p: DVec3) -> Option<(f64, f64)> {
        (p.z > 0.0).then(|| (p.x / p.z, p.y / p.z))
    }
}

azimuthal_projection!(Gnomonic, Projection::Gnomonic);

/// Lambert area-preserving azimuthal projection: the whole sphere fits in a
/// disk of radius 2.
#[derive(Debug, Clone)]
pub struct Azimuthal {
    view: View,
}

impl Azimuthal {
    pub fn new(view: View) -> Self {
        Self { view }
    }

    fn lift(x: f64, y: f64) -> Option<DVec3> {
        let zz = x * x + y * y;
        let z = 1.0 - 0.5 * zz;
        if z < -1.0 {
            return None;
        }
        let zz = (1.0 - 0.25 * zz).sqrt();
        Some(DVec3::new(x * zz, y * zz, z))
    }

    fn to_plane(p: DVec3) -> Option<(f64, f64)> {
        if p.z <= -1.0 {
            return None;
        }
        let k = (0.5 + 0.5 * p.z).sqrt();
        Some((p.x / k, p.y / k))
    }
}

azimuthal_projection!(Azimuthal, Projection::Azimuthal);
