//! Fractal terrain: seed mixing, tetrahedron geometry and the subdivision
//! evaluator that answers "what is the altitude at this point of the sphere".

mod evaluator;
mod seed;
mod tetra;

pub use evaluator::{base_depth, lon_lat_to_point, row_depth, Evaluator, Sample, CACHE_LEVEL};
pub use seed::{mix, SeedSet};
pub use tetra::{same_side, Tetrahedron, Vertex};
