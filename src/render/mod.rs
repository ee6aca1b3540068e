//! Rendering: per-pixel evaluation into map buffers and the passes that
//! run over the finished map.

mod map;
mod post;
mod renderer;

pub use map::{MapBuffers, Pixel};
pub use post::{find_outline, outline, smooth_shades};
pub use renderer::Renderer;
