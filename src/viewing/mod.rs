//! Camera ↔ body viewing geometry for photographic images.

pub mod correction;
pub mod geometry;

pub use correction::{GeometricCorrection, IdentityCorrection};
pub use geometry::{CenterSpec, ViewingGeometry, ViewingGeometryBuilder};
