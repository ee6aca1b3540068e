//! Recursive tetrahedron subdivision evaluator.
//!
//! The globe sits inside a large tetrahedron. To find the altitude at a point
//! the tetrahedron is repeatedly cut across its longest edge, the new vertex
//! getting a perturbed average of the edge's endpoint altitudes, and the half
//! containing the point is kept. After `depth` cuts the mean of the four
//! corner altitudes is the answer.
//!
//! Neighbouring pixels share most of their descent, so the evaluator keeps the
//! tetrahedron reached with [`CACHE_LEVEL`] cuts remaining and restarts from it
//! whenever the next point lies strictly inside.

use std::f64::consts::PI;

use glam::DVec3;

use crate::config::{ResolvedConfig, ShadeMode, Variant, DEG2RAD};
use super::seed::{mix, SeedSet};
use super::tetra::{same_side, Tetrahedron, Vertex};

/// Levels remaining at which the descent is cached.
pub const CACHE_LEVEL: i32 = 11;

/// Shade used on the sea by [`ShadeMode::BumpLand`].
const FLAT_SEA_SHADE: u8 = 150;

/// Result of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub altitude: f64,
    /// Light intensity in `10..=255`, present when shading is enabled.
    pub shade: Option<u8>,
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    tetra: Tetrahedron,
    /// Depth of the descent that produced the entry. Resuming is only
    /// equivalent to a fresh descent of the same depth.
    depth: i32,
}

/// Light direction terms precomputed from the shade angles.
#[derive(Debug, Clone, Copy)]
struct Light {
    sin_angle: f64,
    cos_angle: f64,
    daylight: DVec3,
}

impl Light {
    fn new(shade_angle: f64, shade_angle2: f64) -> Self {
        let angle = PI * shade_angle / 180.0;
        let elevation = PI * shade_angle2 / 180.0;
        Self {
            sin_angle: angle.sin(),
            cos_angle: angle.cos(),
            daylight: DVec3::new(
                (angle - 0.5 * PI).cos() * elevation.cos(),
                -elevation.sin(),
                -(angle - 0.5 * PI).sin() * elevation.cos(),
            ),
        }
    }
}

/// Fractal height function over the unit sphere.
///
/// Owns its cache, so one evaluator must not be shared between concurrent
/// workers; clone it instead.
#[derive(Debug, Clone)]
pub struct Evaluator {
    root: Tetrahedron,
    variant: Variant,
    altitude_weight: f64,
    distance_weight: f64,
    shading: ShadeMode,
    light: Light,
    cache: Option<CacheEntry>,
    cache_enabled: bool,
}

/// Corners of the classic outer tetrahedron.
fn classic_corners() -> [DVec3; 4] {
    [
        DVec3::new(0.0, 0.0, 3.01),
        DVec3::new(0.0, 8f64.sqrt() + 0.01, -1.01),
        DVec3::new(-6f64.sqrt() - 0.01, -2f64.sqrt() - 0.01, -1.01),
        DVec3::new(6f64.sqrt() - 0.005, -2f64.sqrt() - 0.005, -1.005),
    ]
}

/// Corners of the extended outer tetrahedron, slightly irregular so that no
/// two edges have equal length.
fn extended_corners() -> [DVec3; 4] {
    let s = 3f64.sqrt();
    [
        DVec3::new(-s - 0.20, -s - 0.22, -s - 0.23),
        DVec3::new(-s - 0.19, s + 0.18, s + 0.17),
        DVec3::new(s + 0.21, -s - 0.24, s + 0.15),
        DVec3::new(s + 0.24, s + 0.22, -s - 0.25),
    ]
}

impl Evaluator {
    /// Creates an evaluator for the configured seed and variant.
    pub fn new(config: &ResolvedConfig) -> Self {
        let seeds = SeedSet::from_master(config.seed);
        let corners = match config.variant {
            Variant::Classic => classic_corners(),
            Variant::Extended => extended_corners(),
        };
        let m = config.initial_altitude;
        let [r1, r2, r3, r4] = seeds.lineages;
        let root = Tetrahedron::new(
            Vertex::new(corners[0], m, r1),
            Vertex::new(corners[1], m, r2),
            Vertex::new(corners[2], m, r3),
            Vertex::new(corners[3], m, r4),
        );
        Self {
            root,
            variant: config.variant,
            altitude_weight: config.altitude_weight,
            distance_weight: config.distance_weight,
            shading: config.shading,
            light: Light::new(config.shade_angle, config.shade_angle2),
            cache: None,
            cache_enabled: true,
        }
    }

    /// Disables the descent cache. Output is unchanged; only speed differs.
    pub fn without_cache(mut self) -> Self {
        self.cache_enabled = false;
        self.cache = None;
        self
    }

    /// The fixed outer tetrahedron.
    pub fn root(&self) -> &Tetrahedron {
        &self.root
    }

    /// Altitude at `p` after `depth` subdivisions.
    pub fn height(&mut self, p: DVec3, depth: i32) -> f64 {
        self.sample(p, depth).altitude
    }

    /// Altitude and, if enabled, shade at `p` after `depth` subdivisions.
    pub fn sample(&mut self, p: DVec3, depth: i32) -> Sample {
        let (start, level) = match self.cache {
            Some(entry) if self.cache_enabled && entry.depth == depth && entry.tetra.contains(p) => {
                (entry.tetra, CACHE_LEVEL)
            }
            _ => (self.root, depth),
        };
        self.descend(start, level, depth, p)
    }

    fn descend(&mut self, mut tetra: Tetrahedron, mut level: i32, depth: i32, p: DVec3) -> Sample {
        while level > 0 {
            let (ordered, lab) = tetra.with_longest_edge_first();
            if level == CACHE_LEVEL && self.cache_enabled {
                self.cache = Some(CacheEntry { tetra: ordered, depth });
            }
            tetra = self.split(ordered, lab, p);
            level -= 1;
        }
        self.leaf(&tetra, p)
    }

    /// Cuts edge `ab` (the longest, squared length `lab`) and returns the half
    /// containing `p`.
    fn split(&self, t: Tetrahedron, lab: f64, p: DVec3) -> Tetrahedron {
        let Tetrahedron { a, b, c, d } = t;
        let e = match self.variant {
            Variant::Classic => {
                let es = mix(a.seed, b.seed);
                let lab = if lab > 1.0 { lab.powf(0.75) } else { lab };
                let alt = 0.5 * (a.alt + b.alt)
                    + es * (self.altitude_weight * (a.alt - b.alt).abs()
                        + self.distance_weight * lab.powf(0.45));
                Vertex::new(0.5 * (a.pos + b.pos), alt, es)
            }
            Variant::Extended => {
                let es = mix(a.seed, b.seed);
                let es1 = mix(es, es);
                let es2 = 0.5 + 0.1 * mix(es1, es1);
                let es3 = 1.0 - es2;
                // The bias direction depends on vertex order; x breaks the symmetry.
                let pos = if a.pos.x < b.pos.x {
                    es2 * a.pos + es3 * b.pos
                } else if a.pos.x > b.pos.x {
                    es3 * a.pos + es2 * b.pos
                } else {
                    0.5 * a.pos + 0.5 * b.pos
                };
                // Damp the length term on coarse levels.
                let lab = if lab > 1.0 { lab.sqrt() } else { lab };
                let alt = 0.5 * (a.alt + b.alt)
                    + es * self.altitude_weight * (a.alt - b.alt).abs()
                    + es1 * self.distance_weight * lab.powf(0.47);
                Vertex::new(pos, alt, es)
            }
        };

        if same_side(e.pos, c.pos, d.pos, a.pos, p) {
            Tetrahedron::new(c, d, a, e)
        } else {
            Tetrahedron::new(c, d, b, e)
        }
    }

    fn leaf(&self, t: &Tetrahedron, p: DVec3) -> Sample {
        let altitude = t.mean_altitude();
        let shade = match self.shading {
            ShadeMode::None => None,
            ShadeMode::Bump => Some(self.bump_shade(t, p)),
            ShadeMode::BumpLand => {
                if t.a.alt + t.b.alt + t.c.alt + t.d.alt < 0.0 {
                    Some(FLAT_SEA_SHADE)
                } else {
                    Some(self.bump_shade(t, p))
                }
            }
            ShadeMode::Daylight => Some(self.daylight_shade(t, p)),
        };
        Sample { altitude, shade }
    }

    /// Bump mapping: the altitude gradient expressed in the local
    /// east/north frame at `p`, lit from `shade_angle`.
    fn bump_shade(&self, t: &Tetrahedron, p: DVec3) -> u8 {
        let g = t.altitude_gradient();
        let mut l1 = g.length();
        if l1 == 0.0 {
            l1 = 1.0;
        }
        let mut tmp = (1.0 - p.y * p.y).sqrt();
        if tmp < 0.0001 {
            tmp = 0.0001;
        }
        let y2 = -p.x * p.y / tmp * g.x + tmp * g.y - p.z * p.y / tmp * g.z;
        let z2 = -p.z / tmp * g.x + p.x / tmp * g.z;
        let shade = (-self.light.sin_angle * y2 - self.light.cos_angle * z2) / l1 * 48.0 + 128.0;
        clamp_shade(shade)
    }

    /// Directional daylight: the surface normal perturbed by the gradient,
    /// dotted with the light vector. Sea is lit as a smooth sphere.
    fn daylight_shade(&self, t: &Tetrahedron, p: DVec3) -> u8 {
        let normal = if t.a.alt + t.b.alt + t.c.alt + t.d.alt < 0.0 {
            p
        } else {
            let k = 50.0 / t.squared_edge_sum().sqrt();
            k * t.altitude_gradient() + p
        };
        let mut l1 = normal.length();
        if l1 == 0.0 {
            l1 = 1.0;
        }
        let shade = normal.dot(self.light.daylight) / l1 * 300.0 + 10.0;
        clamp_shade(shade)
    }
}

#[inline]
fn clamp_shade(v: f64) -> u8 {
    (v as i32).clamp(10, 255) as u8
}

/// Subdivision depth for projections with a uniform scale.
pub fn base_depth(scale: f64, height: u32) -> i32 {
    depth_from_magnification(scale * height as f64, 6)
}

/// Subdivision depth for a scanline whose local magnification is `local_scale`.
pub fn row_depth(local_scale: f64, height: u32) -> i32 {
    depth_from_magnification(local_scale * height as f64, 3)
}

/// `3 * trunc(log2(m)) + offset`. Saturates for an infinite magnification
/// (a scanline on a pole).
fn depth_from_magnification(m: f64, offset: i32) -> i32 {
    let octaves = m.log2() as i32;
    octaves.saturating_mul(3).saturating_add(offset)
}

/// Converts a longitude/latitude pair in degrees to a unit vector in the
/// evaluator's frame (y is the polar axis).
pub fn lon_lat_to_point(lon_deg: f64, lat_deg: f64) -> DVec3 {
    let (lon, lat) = (lon_deg * DEG2RAD, lat_deg * DEG2RAD);
    let cos_lat = lat.cos();
    DVec3::new(lon.cos() * cos_lat, lat.sin(), -lon.sin() * cos_lat)
}
