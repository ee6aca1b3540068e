//! Pseudo-cylindrical projections: Mollweide and the twelve-gore sinusoid.

use std::f64::consts::PI;

use glam::DVec3;

use crate::config::{Projection, DEG2RAD};
use super::{grid_angles, GridCanvas, LatitudeExtent, MapProjection, View};

/// Mollweide ordinate (in units of the semi-minor axis) of parallels every
/// 5 degrees from the equator to the pole.
const MOLL_TABLE: [f64; 19] = [
    0.0,
    0.0685055811,
    0.1368109534,
    0.2047150027,
    0.2720147303,
    0.3385041213,
    0.4039727534,
    0.4682040106,
    0.5309726991,
    0.5920417499,
    0.6511575166,
    0.7080428038,
    0.7623860881,
    0.8138239166,
    0.8619100185,
    0.9060553621,
    0.9453925506,
    0.9783738403,
    1.0,
];

/// Interpolated Mollweide ordinate of the parallel at `deg` degrees.
fn moll_ordinate(deg: f64) -> f64 {
    let t = deg.abs() / 5.0;
    let x = t.floor();
    let f = t - x;
    let lo = (x as usize).min(MOLL_TABLE.len() - 1);
    let hi = (lo + 1).min(MOLL_TABLE.len() - 1);
    let y = (1.0 - f) * MOLL_TABLE[lo] + f * MOLL_TABLE[hi];
    if deg < 0.0 {
        -y
    } else {
        y
    }
}

/// Area-preserving elliptical projection.
#[derive(Debug, Clone)]
pub struct Mollweide {
    view: View,
}

/// Per-row terms of the Mollweide inverse.
struct MollRow {
    /// Half-width of the ellipse at this row, relative to the equator.
    zz: f64,
    y: f64,
    cos2: f64,
}

impl Mollweide {
    pub fn new(view: View) -> Self {
        Self { view }
    }

    /// Ellipse ordinate of row `j`, in `[-1, 1]` on the map.
    fn ordinate(&self, j: u32) -> f64 {
        let v = &self.view;
        2.0 * (2.0 * j as f64 - v.h()) / v.w() / v.scale
    }

    fn row(&self, j: u32) -> Option<MollRow> {
        let y1 = self.ordinate(j);
        if y1.abs() >= 1.0 {
            return None;
        }
        let zz = (1.0 - y1 * y1).sqrt();
        let y = 2.0 / PI * (y1 * zz + y1.asin());
        let cos2 = (1.0 - y * y).sqrt();
        if cos2 <= 0.0 {
            return None;
        }
        Some(MollRow { zz, y, cos2 })
    }
}

impl MapProjection for Mollweide {
    fn kind(&self) -> Projection {
        Projection::Mollweide
    }

    fn view(&self) -> &View {
        &self.view
    }

    fn depth(&self, j: u32) -> i32 {
        match self.row(j) {
            Some(row) => self.view.scanline_depth(row.cos2),
            None => self.view.base_depth(),
        }
    }

    fn project(&self, i: u32, j: u32) -> Option<DVec3> {
        let row = self.row(j)?;
        let v = &self.view;
        let theta = PI / row.zz * (2.0 * i as f64 - v.w()) / v.w() / v.scale;
        if theta.abs() > PI {
            return None;
        }
        let theta = theta + v.longitude - 0.5 * PI;
        Some(DVec3::new(theta.cos() * row.cos2, row.y, -theta.sin() * row.cos2))
    }

    fn draw_parallels(&self, canvas: &mut GridCanvas<'_>, _extent: LatitudeExtent, step: f64) {
        let v = &self.view;
        for theta in grid_angles(step, 90.0) {
            let y = moll_ordinate(theta);
            let j = (v.height / 2) as f64 + (0.25 * y * v.w() * v.scale).trunc();
            if j < 0.0 || j >= v.h() {
                continue;
            }
            let half = (0.5 * v.w() * v.scale * (1.0 - y * y).sqrt()).trunc();
            let from = ((v.width / 2) as f64 - half).max(0.0);
            let to = ((v.width / 2) as f64 + half).min(v.w());
            let mut i = from;
            while i < to {
                canvas.mark(i, j);
                i += 1.0;
            }
        }
    }

    fn draw_meridians(&self, canvas: &mut GridCanvas<'_>, _extent: LatitudeExtent, step: f64) {
        let v = &self.view;
        let (width, height) = (v.width as i64, v.height as i64);
        let half_rows = (0.25 * v.w() * v.scale) as i64;
        let ordinate = |j: i64| 2.0 * (2.0 * j as f64 - v.h()) / v.w() / v.scale;
        // Column of the previous row, carried so each row joins the one above.
        let mut i1: i64 = 1;
        for theta in grid_angles(step, 360.0) {
            let offset = DEG2RAD * theta - v.longitude + 0.5 * PI;
            if offset <= -PI || offset > PI {
                continue;
            }
            let x = 0.5 * offset * v.w() * v.scale / PI;
            let mut j = (height / 2 - half_rows).max(0);
            let mut y = ordinate(j);
            let mut i = (v.w() / 2.0 + x * (1.0 - y * y).sqrt()) as i64;
            let last = height.min(height / 2 + half_rows);
            while j <= last {
                let y1 = ordinate(j);
                if y1.abs() <= 1.0 {
                    i1 = ((width / 2) as f64 + x * (1.0 - y1 * y1).sqrt()) as i64;
                    canvas.mark(i1 as f64, j as f64);
                }
                if y.abs() <= 1.0 {
                    if i < i1 {
                        for k in (i + 1)..i1 {
                            canvas.mark(k as f64, j as f64);
                        }
                    } else if i > i1 {
                        for k in ((i1 + 1)..i).rev() {
                            canvas.mark(k as f64, j as f64);
                        }
                    }
                }
                y = y1;
                i = i1;
                j += 1;
            }
        }
    }
}

/// Sinusoidal projection interrupted into twelve 30-degree gores.
#[derive(Debug, Clone)]
pub struct Sinusoid {
    view: View,
    k: i64,
}

impl Sinusoid {
    pub fn new(view: View) -> Self {
        let k = (view.latitude * view.w() * view.scale / PI) as i64;
        Self { view, k }
    }

    fn row_angle(&self, j: u32) -> f64 {
        let v = &self.view;
        (2.0 * (j as f64 - self.k as f64) - v.h()) / v.w() / v.scale * PI
    }

    /// Left edge of the gore containing column `i`, and `i`'s offset from it.
    fn gore(&self, i: u32) -> (f64, f64) {
        let width = self.view.width as u64;
        let l = i as u64 * 12 / width;
        let l1 = (l * width) as f64 / 12.0;
        (l1, i as f64 - l1)
    }

    /// Longitude offset of column `i` from its gore's central meridian,
    /// on a parallel of radius `cos2`.
    fn gore_offset(&self, i1: f64, cos2: f64) -> f64 {
        let v = &self.view;
        (PI * (2.0 * i1 - (v.width / 12) as f64) / v.w() / v.scale) / cos2
    }
}

impl MapProjection for Sinusoid {
    fn kind(&self) -> Projection {
        Projection::Sinusoid
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
        let v = &self.view;
        let y = self.row_angle(j);
        if y.abs() >= 0.5 * PI {
            return None;
        }
        let cos2 = y.cos();
        if cos2 <= 0.0 {
            return None;
        }
        let (l1, i1) = self.gore(i);
        let theta2 = v.longitude - 0.5 * PI + PI * (2.0 * l1 - v.w()) / v.w() / v.scale;
        let theta1 = self.gore_offset(i1, cos2);
        if theta1.abs() > PI / 12.0 {
            return None;
        }
        let lon = theta1 + theta2;
        Some(DVec3::new(lon.cos() * cos2, y.sin(), -lon.sin() * cos2))
    }

    fn draw_parallels(&self, canvas: &mut GridCanvas<'_>, _extent: LatitudeExtent, step: f64) {
        let v = &self.view;
        for theta in grid_angles(step, 90.0) {
            let y = DEG2RAD * theta;
            let cos2 = y.cos();
            let j = (v.height / 2) as f64 + (0.5 * y * v.w() * v.scale / PI).trunc() + self.k as f64;
            if j < 0.0 || j >= v.h() {
                continue;
            }
            for i in 0..v.width {
                let (_, i1) = self.gore(i);
                if self.gore_offset(i1, cos2).abs() <= PI / 12.0 {
                    canvas.mark(i as f64, j);
                }
            }
        }
    }

    fn draw_meridians(&self, canvas: &mut GridCanvas<'_>, _extent: LatitudeExtent, step: f64) {
        let v = &self.view;
        let half = (0.25 * PI * v.w() * v.scale / PI).trunc();
        let mid = (v.height / 2) as f64 + self.k as f64;
        let from = (mid - half).max(0.0);
        let to = (mid + half).min(v.h());
        for theta in grid_angles(step, 360.0) {
            let i = v.meridian_column(theta);
            if i < 0.0 || i >= v.w() {
                continue;
            }
            let (gore_left, _) = self.gore(i as u32);
            // Meridians bend towards their gore's centre line.
            let centre = gore_left + v.w() / 24.0;
            let i1 = i - centre;
            let mut j = from.trunc();
            while j < to {
                let y = (2.0 * (j - self.k as f64) - v.h()) / v.w() / v.scale * PI;
                canvas.mark((centre + i1 * y.cos()).trunc(), j);
                j += 1.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::tests::view_for;

    #[test]
    fn test_moll_table_interpolation() {
        assert_eq!(moll_ordinate(0.0), 0.0);
        assert_eq!(moll_ordinate(90.0), 1.0);
        assert_eq!(moll_ordinate(-90.0), -1.0);
        let mid = moll_ordinate(2.5);
        assert!((mid - 0.5 * MOLL_TABLE[1]).abs() < 1e-12);
    }

    #[test]
    fn test_mollweide_ellipse_boundary() {
        // At scale 1 the ellipse spans the full width and half of it vertically.
        let proj = Mollweide::new(view_for(Projection::Mollweide, 80, 40));
        assert!(proj.project(40, 20).is_some());
        assert!(proj.project(1, 20).is_some());
        assert!(proj.project(0, 0).is_none(), "corner is outside the ellipse");
        assert!(proj.project(2, 3).is_none());
    }

    #[test]
    fn test_mollweide_grid_stays_in_bounds() {
        let mut view = view_for(Projection::Mollweide, 60, 30);
        view.hgrid = 30.0;
        view.vgrid = 30.0;
        let proj = Mollweide::new(view);
        let mut colors = vec![5u16; 60 * 30];
        {
            let mut canvas = GridCanvas::new(&mut colors, 60, 30, 0);
            proj.draw_grid(&mut canvas, LatitudeExtent::default());
        }
        assert!(colors.iter().any(|&c| c == 0));
        // Equator line.
        assert_eq!(colors[15 * 60 + 30], 0);
    }

    #[test]
    fn test_sinusoid_gores_leave_gaps() {
        let proj = Sinusoid::new(view_for(Projection::Sinusoid, 120, 60));
        // Gore centres are always on the globe.
        for gore in 0..12 {
            assert!(proj.project(gore * 10 + 5, 30).is_some());
        }
        // Near the poles the gores narrow to points; gore edges fall off.
        assert!(proj.project(0, 2).is_none());
        assert!(proj.project(0, 0).is_none());
    }

    #[test]
    fn test_sinusoid_equator_gore_edges_meet() {
        let proj = Sinusoid::new(view_for(Projection::Sinusoid, 120, 60));
        let a = proj.project(9, 30).unwrap();
        let b = proj.project(10, 30).unwrap();
        // Adjacent columns across a gore boundary are adjacent on the equator.
        assert!(a.distance(b) < 0.1);
    }
}
