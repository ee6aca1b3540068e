//! Fractal planet map generator.
//!
//! Terrain comes from recursive subdivision of a tetrahedron enclosing the
//! globe: every cut perturbs the altitude of a new vertex with a random
//! offset derived from the seeds of the cut edge, so the same seed always
//! yields the same planet at any resolution. Maps are rendered through one of
//! ten projections, coloured by altitude and optionally shaded, outlined and
//! overlaid with a latitude/longitude grid.

pub mod color;
pub mod config;
pub mod export;
pub mod projection;
pub mod render;
pub mod terrain;

pub use color::{ColorBands, ColorIndex, ColorTable};
pub use config::{ConfigError, OutlineMode, Projection, RenderConfig, ResolvedConfig, ShadeMode, Variant};
pub use export::{save_map, ExportError};
pub use projection::MapProjection;
pub use render::{MapBuffers, Pixel, Renderer};
pub use terrain::{Evaluator, Sample};
