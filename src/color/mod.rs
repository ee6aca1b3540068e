//! Colour tables and altitude classification.
//!
//! - [`palette`]: key colours and the lightening pass
//! - [`table`]: band layout and the interpolated RGB table
//! - [`classify`]: altitude to colour index

mod classify;
mod palette;
mod table;

pub use classify::Classifier;
pub use palette::{KeyColors, Rgb};
pub use table::{BandLayout, ColorBands, ColorIndex, ColorTable, BLACK, WHITE};
