//! Tetrahedron geometry used by the subdivision evaluator.

use glam::DVec3;

/// A tetrahedron corner: position, altitude and seed lineage value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub pos: DVec3,
    pub alt: f64,
    pub seed: f64,
}

impl Vertex {
    pub fn new(pos: DVec3, alt: f64, seed: f64) -> Self {
        Self { pos, alt, seed }
    }
}

/// Four vertices. Only ever lives on the stack during a descent or in the
/// evaluator cache; the subdivision tree itself is never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tetrahedron {
    pub a: Vertex,
    pub b: Vertex,
    pub c: Vertex,
    pub d: Vertex,
}

/// True if `w` and `p` lie strictly on the same side of the plane through
/// `o`, `u` and `v`. Points on the plane are on neither side.
#[inline]
pub fn same_side(o: DVec3, u: DVec3, v: DVec3, w: DVec3, p: DVec3) -> bool {
    let n = (u - o).cross(v - o);
    n.dot(w - o) * n.dot(p - o) > 0.0
}

impl Tetrahedron {
    pub fn new(a: Vertex, b: Vertex, c: Vertex, d: Vertex) -> Self {
        Self { a, b, c, d }
    }

    /// Strict point-in-tetrahedron test: `p` must be on the inner side of all
    /// four faces.
    pub fn contains(&self, p: DVec3) -> bool {
        let (a, b, c, d) = (self.a.pos, self.b.pos, self.c.pos, self.d.pos);
        same_side(a, b, c, d, p)
            && same_side(a, b, d, c, p)
            && same_side(a, c, d, b, p)
            && same_side(b, c, d, a, p)
    }

    /// Reorders the vertices until `ab` is the longest edge and returns the
    /// reordered tetrahedron with the squared length of `ab`.
    ///
    /// Edges are compared against `ab` in the fixed order ac, ad, bc, bd, cd
    /// and the first strictly longer one is swapped in. Exact ties keep the
    /// earlier edge. The chosen edge determines the terrain for a given seed,
    /// so this order must not change.
    pub fn with_longest_edge_first(self) -> (Self, f64) {
        let mut t = self;
        loop {
            let Tetrahedron { a, b, c, d } = t;
            let lab = a.pos.distance_squared(b.pos);
            t = if lab < a.pos.distance_squared(c.pos) {
                Tetrahedron::new(a, c, b, d)
            } else if lab < a.pos.distance_squared(d.pos) {
                Tetrahedron::new(a, d, b, c)
            } else if lab < b.pos.distance_squared(c.pos) {
                Tetrahedron::new(b, c, a, d)
            } else if lab < b.pos.distance_squared(d.pos) {
                Tetrahedron::new(b, d, a, c)
            } else if lab < c.pos.distance_squared(d.pos) {
                Tetrahedron::new(c, d, a, b)
            } else {
                return (t, lab);
            };
        }
    }

    /// Arithmetic mean of the four altitudes.
    pub fn mean_altitude(&self) -> f64 {
        (self.a.alt + self.b.alt + self.c.alt + self.d.alt) / 4.0
    }

    pub fn centroid(&self) -> DVec3 {
        0.25 * (self.a.pos + self.b.pos + self.c.pos + self.d.pos)
    }

    /// Altitude-weighted sum of the vertex-to-centroid offsets; points uphill.
    pub fn altitude_gradient(&self) -> DVec3 {
        let m = self.centroid();
        self.a.alt * (m - self.a.pos)
            + self.b.alt * (m - self.b.pos)
            + self.c.alt * (m - self.c.pos)
            + self.d.alt * (m - self.d.pos)
    }

    /// Sum of the squared lengths of all six edges.
    pub fn squared_edge_sum(&self) -> f64 {
        let (a, b, c, d) = (self.a.pos, self.b.pos, self.c.pos, self.d.pos);
        a.distance_squared(b)
            + a.distance_squared(c)
            + a.distance_squared(d)
            + b.distance_squared(c)
            + b.distance_squared(d)
            + c.distance_squared(d)
    }
}
