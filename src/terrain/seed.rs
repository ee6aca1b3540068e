//! Deterministic seed mixing.
//!
//! All randomness in a planet comes from repeatedly mixing seed values with
//! [`mix`]. No random number generator is consulted after the master seed is
//! chosen, so a seed fully determines the terrain.

use serde::{Deserialize, Serialize};

/// Offset added to both inputs before multiplying. Close to, but not exactly, π.
#[allow(clippy::approx_constant)]
const MIX_OFFSET: f64 = 3.14159265;

/// Mixes two seeds into a new value in `[-1, 1)`.
///
/// Takes the fractional part of `(p + c)(q + c)` and maps it to a symmetric
/// range. The result is only sensitive to floating point semantics, not to
/// any external state.
#[inline]
pub fn mix(p: f64, q: f64) -> f64 {
    let r = (p + MIX_OFFSET) * (q + MIX_OFFSET);
    2.0 * (r - r.trunc()) - 1.0
}

/// The four seed lineages assigned to the vertices of the outer tetrahedron.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedSet {
    pub lineages: [f64; 4],
}

impl SeedSet {
    /// Derives the four lineages from a master seed.
    pub fn from_master(seed: f64) -> Self {
        let r1 = mix(seed, seed);
        let r2 = mix(r1, r1);
        let r3 = mix(r1, r2);
        let r4 = mix(r2, r3);
        Self {
            lineages: [r1, r2, r3, r4],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_range() {
        let mut p = 0.6;
        let mut q = -0.3;
        for _ in 0..10_000 {
            let r = mix(p, q);
            assert!((-1.0..1.0).contains(&r), "mix({}, {}) = {} out of range", p, q, r);
            q = p;
            p = r;
        }
    }

    #[test]
    fn test_mix_is_deterministic() {
        assert_eq!(mix(0.25, 0.75), mix(0.25, 0.75));
        assert_ne!(mix(0.25, 0.75), mix(0.25, 0.76));
    }

    #[test]
    fn test_mix_symmetric_in_arguments() {
        assert_eq!(mix(0.1, -0.4), mix(-0.4, 0.1));
    }

    #[test]
    fn test_seed_set_lineages_distinct() {
        let seeds = SeedSet::from_master(0.6);
        let l = seeds.lineages;
        for i in 0..4 {
            assert!((-1.0..1.0).contains(&l[i]));
            for j in (i + 1)..4 {
                assert_ne!(l[i], l[j], "lineages {} and {} collide", i, j);
            }
        }
    }

    #[test]
    fn test_large_master_seed_still_in_range() {
        for seed in [-1000.0, -3.5, 0.0, 12345.678] {
            for l in SeedSet::from_master(seed).lineages {
                assert!((-1.0..1.0).contains(&l), "seed {} produced {}", seed, l);
            }
        }
    }
}
