//! Right-handed rotations about the body and observer frame axes.
//!
//! `rotation_*` give the matrix, `rot_*` rotate a vector directly. A
//! positive angle turns counter-clockwise looking down the axis toward the
//! origin, so quarter turns carry x→y→z→x.

use nalgebra::Rotation3;

use super::{Matrix3, Vector3};

/// Rotation matrix about the X axis.
pub fn rotation_x(angle: f64) -> Matrix3 {
    Rotation3::from_axis_angle(&Vector3::x_axis(), angle).into_inner()
}

/// Rotation matrix about the Y axis.
pub fn rotation_y(angle: f64) -> Matrix3 {
    Rotation3::from_axis_angle(&Vector3::y_axis(), angle).into_inner()
}

/// Rotation matrix about the Z axis.
pub fn rotation_z(angle: f64) -> Matrix3 {
    Rotation3::from_axis_angle(&Vector3::z_axis(), angle).into_inner()
}

/// Rotate `v` about the X axis by `angle` radians.
pub fn rot_x(angle: f64, v: &Vector3) -> Vector3 {
    let (s, c) = angle.sin_cos();
    Vector3::new(v.x, v.y * c - v.z * s, v.y * s + v.z * c)
}

/// Rotate `v` about the Y axis by `angle` radians.
pub fn rot_y(angle: f64, v: &Vector3) -> Vector3 {
    let (s, c) = angle.sin_cos();
    Vector3::new(v.x * c + v.z * s, v.y, -v.x * s + v.z * c)
}

/// Rotate `v` about the Z axis by `angle` radians.
pub fn rot_z(angle: f64, v: &Vector3) -> Vector3 {
    let (s, c) = angle.sin_cos();
    Vector3::new(v.x * c - v.y * s, v.x * s + v.y * c, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_ulps_eq};
    use std::f64::consts::FRAC_PI_2;

    fn sample_vectors() -> [Vector3; 4] {
        [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.3, -2.0, 5.5),
            Vector3::new(-71492.0, 1211230.0, 66854.0),
            Vector3::new(1e-3, 4e-3, -2e-3),
        ]
    }

    #[test]
    fn test_matrix_and_vector_rotations_agree() {
        for &angle in &[0.0, 0.25, -1.3, 2.9, -3.1] {
            for v in &sample_vectors() {
                let scale = v.amax();
                assert_abs_diff_eq!(rotation_x(angle) * v, rot_x(angle, v), epsilon = 4e-16 * scale);
                assert_abs_diff_eq!(rotation_y(angle) * v, rot_y(angle, v), epsilon = 4e-16 * scale);
                assert_abs_diff_eq!(rotation_z(angle) * v, rot_z(angle, v), epsilon = 4e-16 * scale);
            }
        }
    }

    #[test]
    fn test_right_handed() {
        let x = Vector3::x();
        let y = Vector3::y();
        let z = Vector3::z();
        assert_abs_diff_eq!(rot_z(FRAC_PI_2, &x), y, epsilon = 1e-15);
        assert_abs_diff_eq!(rot_x(FRAC_PI_2, &y), z, epsilon = 1e-15);
        assert_abs_diff_eq!(rot_y(FRAC_PI_2, &z), x, epsilon = 1e-15);
    }

    #[test]
    fn test_transpose_is_inverse() {
        let m = rotation_z(0.7) * rotation_x(-0.3) * rotation_y(1.1);
        assert_abs_diff_eq!(m * m.transpose(), Matrix3::identity(), epsilon = 1e-14);
        assert_abs_diff_eq!(m.transpose() * m, Matrix3::identity(), epsilon = 1e-14);
    }

    #[test]
    fn test_matrix_product_order() {
        // (A·B)·v applies B first.
        let v = Vector3::new(0.2, 0.4, -0.9);
        let a = rotation_x(0.4);
        let b = rotation_z(-1.2);
        assert_abs_diff_eq!((a * b) * v, a * (b * v), epsilon = 1e-14);
    }

    #[test]
    fn test_rotation_x_entries() {
        let m = rotation_x(0.5);
        let (s, c) = 0.5_f64.sin_cos();
        assert_ulps_eq!(m, Matrix3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c), max_ulps = 4);
        assert_eq!(m.transpose()[(2, 1)], m[(1, 2)]);
    }
}
