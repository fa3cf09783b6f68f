//! Vector length and normalization.
//!
//! `nalgebra`'s `norm` squares the components before the square root; the
//! body-frame vectors here mix planetary ranges with unit directions, so
//! lengths go through nested `hypot` instead.

use super::Vector3;

/// `sqrt(x² + y² + z²)` without intermediate overflow or underflow.
pub fn hypot3(x: f64, y: f64, z: f64) -> f64 {
    x.hypot(y).hypot(z)
}

/// Euclidean length of `v`.
pub fn magnitude(v: &Vector3) -> f64 {
    hypot3(v.x, v.y, v.z)
}

/// Scale `v` in place to unit length. A zero vector has no direction and
/// is left untouched.
pub fn to_unit(v: &mut Vector3) {
    let mag = magnitude(v);
    debug_assert!(mag > 0.0, "cannot normalize a zero-length vector");
    if mag > 0.0 {
        *v /= mag;
    }
}

/// Unit-length copy of `v`.
pub fn unit(mut v: Vector3) -> Vector3 {
    to_unit(&mut v);
    v
}
