//! Body shape models.
//!
//! A body is immutable once constructed, so it is shared between the
//! viewing geometry and any number of map projections through an `Arc`.
//!
//! # Body-fixed frame
//!
//! `+z` is the rotation axis (north). Longitude is east longitude
//! measured from the `-y` axis, so a surface point at planetocentric
//! latitude `φ`, longitude `λ` and radius `r` sits at
//! `(r·cosφ·sinλ, -r·cosφ·cosλ, r·sinφ)`.

pub mod oblate_spheroid;

pub use oblate_spheroid::OblateSpheroid;

use std::fmt::Debug;

use crate::linalg::Vector3;

/// Outcome of intersecting a line with the body surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Intersection {
    /// Planetocentric latitude and longitude (radians) of the
    /// intersection facing the direction vector.
    Hit { lat: f64, lon: f64 },
    /// The line does not meet the surface.
    Miss,
    /// The direction vector is null.
    BadDirection,
}

/// Shape and photometric-angle capability of a planetary body.
///
/// All latitudes are planetocentric radians unless a method says
/// otherwise. Implementations are pure functions of their arguments.
pub trait BodyData: Debug + Send + Sync {
    /// `true` if the body rotates prograde.
    fn prograde(&self) -> bool;

    /// Distance from the body centre to the surface at latitude `lat`.
    fn centric_radius(&self, lat: f64) -> f64;

    /// Planetographic → planetocentric latitude.
    fn centric_latitude(&self, latg: f64) -> f64;

    /// Planetocentric → planetographic latitude.
    fn graphic_latitude(&self, lat: f64) -> f64;

    /// Cosine of the emission angle at (`lat`, `lon`) seen by an observer
    /// at `range` above (`sub_observ_lat`, `sub_observ_lon`).
    fn mu(&self, sub_observ_lat: f64, sub_observ_lon: f64, lat: f64, lon: f64, range: f64)
        -> f64;

    /// Cosine of the incidence angle at (`lat`, `lon`) for a Sun at
    /// infinite distance above (`sub_solar_lat`, `sub_solar_lon`).
    fn mu0(&self, sub_solar_lat: f64, sub_solar_lon: f64, lat: f64, lon: f64) -> f64;

    /// Cosine of the phase angle (Sun–point–observer) at (`lat`, `lon`).
    #[allow(clippy::too_many_arguments)]
    fn cos_phase(
        &self,
        sub_observ_lat: f64,
        sub_observ_lon: f64,
        sub_solar_lat: f64,
        sub_solar_lon: f64,
        lat: f64,
        lon: f64,
        range: f64,
    ) -> f64;

    /// Intersect the line `origin + k·direction` with the surface.
    ///
    /// When the line crosses the surface twice, the intersection with the
    /// larger `k` is returned: with `direction` pointing toward a viewer,
    /// that is the point on the side facing the viewer.
    fn ellipse_intersection(&self, origin: &Vector3, direction: &Vector3) -> Intersection;

    /// Body-fixed position of the surface point at (`lat`, `lon`).
    fn surface_point(&self, lat: f64, lon: f64) -> Vector3 {
        let r = self.centric_radius(lat);
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();
        Vector3::new(r * cos_lat * sin_lon, -r * cos_lat * cos_lon, r * sin_lat)
    }
}
