//! Map generation from a projection and a source image.

pub mod engine;
pub mod value;

pub use engine::{make_grid, make_map, MapOptions, GRID_BACKGROUND, GRID_LINE};
pub use value::{MapValue, SourceImage};
