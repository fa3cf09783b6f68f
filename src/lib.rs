//! Viewing geometry and map projections for planetary imagery.
//!
//! A body is described by a [`body::BodyData`] shape model, usually an
//! [`body::OblateSpheroid`] shared through an `Arc`. A
//! [`viewing::ViewingGeometry`] relates photograph pixels to body
//! latitude and longitude; a [`proj::MapProjection`] lays body
//! coordinates out on a map grid, and [`map::make_map`] fills that grid
//! from any [`map::SourceImage`].
//!
//! Angles are radians everywhere except at configuration boundaries
//! (constructors and setters), which take degrees. Latitudes are
//! planetocentric and longitudes are east longitudes in `[0, 2π)`.

pub mod angles;
pub mod body;
pub mod error;
pub mod linalg;
pub mod map;
pub mod progress;
pub mod proj;
pub mod root_find;
pub mod viewing;
