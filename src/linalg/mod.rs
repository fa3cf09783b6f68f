//! 3-D linear algebra used by the body model and viewing geometry.
//!
//! Vectors and matrices are `nalgebra`'s fixed-size `f64` types; this
//! module adds the rotation builders and the overflow-safe length used
//! throughout the crate.

pub mod matrix;
pub mod vector;

pub use matrix::{rot_x, rot_y, rot_z, rotation_x, rotation_y, rotation_z};
pub use vector::{hypot3, magnitude, to_unit, unit};

/// 3-vector of `f64`.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3×3 matrix of `f64`, row-major in its `new` constructor.
pub type Matrix3 = nalgebra::Matrix3<f64>;
