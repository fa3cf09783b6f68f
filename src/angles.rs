//! Angle validation and normalization shared by the viewing geometry and
//! the map projections.
//!
//! Configuration angles arrive in degrees and leave in radians.

use std::f64::consts::TAU;

use crate::error::GeometryError;

/// Wrap a longitude in radians into `[0, 2π)`.
pub fn normalize_longitude(lon: f64) -> f64 {
    let l = lon.rem_euclid(TAU);
    // rem_euclid may round a tiny negative input up to exactly 2π.
    if l >= TAU {
        0.0
    } else {
        l
    }
}

/// Validate a latitude in degrees (`[-90, 90]`), returning radians.
pub fn latitude_from_degrees(name: &str, lat: f64) -> Result<f64, GeometryError> {
    if !lat.is_finite() {
        return Err(GeometryError::InvalidArgument(format!("{name} is not finite")));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(GeometryError::Range(format!(
            "{name} {lat}° outside [-90°, 90°]"
        )));
    }
    Ok(lat.to_radians())
}

/// Validate an azimuthal angle in degrees (`[-360, 360]`), returning
/// radians in `[0, 2π)`.
pub fn longitude_from_degrees(name: &str, lon: f64) -> Result<f64, GeometryError> {
    if !lon.is_finite() {
        return Err(GeometryError::InvalidArgument(format!("{name} is not finite")));
    }
    if !(-360.0..=360.0).contains(&lon) {
        return Err(GeometryError::Range(format!(
            "{name} {lon}° outside [-360°, 360°]"
        )));
    }

    let mut l = lon;
    if l < 0.0 {
        l += 360.0;
    }
    if l >= 360.0 {
        l -= 360.0;
    }
    Ok(l.to_radians())
}
