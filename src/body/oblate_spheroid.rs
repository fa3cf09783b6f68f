//! Oblate spheroid (biaxial ellipsoid of revolution) body model.
//!
//! centric_radius(φ) = 1 / hypot(cosφ/a, sinφ/c)
//! centric ↔ graphic: tanφ = (c/a)²·tanφg
//! M(φg) = a(1-e²) / (1-e²sin²φg)^(3/2),  N(φg) = a / √(1-e²sin²φg)

use crate::body::{BodyData, Intersection};
use crate::error::BodyError;
use crate::linalg::Vector3;
use crate::root_find::quadratic_roots;

/// Ellipsoid of revolution with equatorial radius `a >= c`, the polar radius.
#[derive(Clone, Debug, PartialEq)]
pub struct OblateSpheroid {
    prograde: bool,
    /// Equatorial radius (km)
    eq_rad: f64,
    /// Polar radius (km)
    pol_rad: f64,
    /// First eccentricity: sqrt(1 - (c/a)²)
    first_eccentricity: f64,
}

impl OblateSpheroid {
    pub fn new(prograde: bool, eq_rad: f64, pol_rad: f64) -> Result<Self, BodyError> {
        // Written so that NaN fails too.
        if !(eq_rad > 0.0 && pol_rad > 0.0) || !eq_rad.is_finite() {
            return Err(BodyError::InvalidArgument(format!(
                "radii must be positive: equatorial {eq_rad}, polar {pol_rad}"
            )));
        }
        if eq_rad < pol_rad {
            return Err(BodyError::InvalidArgument(format!(
                "equatorial radius {eq_rad} smaller than polar radius {pol_rad}"
            )));
        }

        let ratio = pol_rad / eq_rad;
        Ok(Self {
            prograde,
            eq_rad,
            pol_rad,
            first_eccentricity: (1.0 - ratio * ratio).sqrt(),
        })
    }

    pub fn eq_rad(&self) -> f64 {
        self.eq_rad
    }

    pub fn pol_rad(&self) -> f64 {
        self.pol_rad
    }

    pub fn first_eccentricity(&self) -> f64 {
        self.first_eccentricity
    }

    /// Flattening: (a - c) / a
    pub fn flattening(&self) -> f64 {
        (self.eq_rad - self.pol_rad) / self.eq_rad
    }

    /// Meridional radius of curvature `M` at planetographic latitude `latg`.
    pub fn meridional_radius(&self, latg: f64) -> f64 {
        let e2 = self.first_eccentricity * self.first_eccentricity;
        let s = latg.sin();
        let w = 1.0 - e2 * s * s;
        self.eq_rad * (1.0 - e2) / (w * w.sqrt())
    }

    /// Prime-vertical radius of curvature `N` at planetographic latitude `latg`.
    pub fn prime_vertical_radius(&self, latg: f64) -> f64 {
        let e2 = self.first_eccentricity * self.first_eccentricity;
        let s = latg.sin();
        self.eq_rad / (1.0 - e2 * s * s).sqrt()
    }

    /// Square of the ratio of polar to equatorial radius.
    fn axis_ratio_sq(&self) -> f64 {
        let r = self.pol_rad / self.eq_rad;
        r * r
    }
}

impl BodyData for OblateSpheroid {
    fn prograde(&self) -> bool {
        self.prograde
    }

    fn centric_radius(&self, lat: f64) -> f64 {
        let (s, c) = lat.sin_cos();
        1.0 / (c / self.eq_rad).hypot(s / self.pol_rad)
    }

    fn centric_latitude(&self, latg: f64) -> f64 {
        (latg.tan() * self.axis_ratio_sq()).atan()
    }

    fn graphic_latitude(&self, lat: f64) -> f64 {
        (lat.tan() / self.axis_ratio_sq()).atan()
    }

    fn mu(
        &self,
        sub_observ_lat: f64,
        sub_observ_lon: f64,
        lat: f64,
        lon: f64,
        range: f64,
    ) -> f64 {
        let radius = self.centric_radius(lat);
        let latg = self.graphic_latitude(lat);

        let (sin_so, cos_so) = sub_observ_lat.sin_cos();
        let cos_dlon = (sub_observ_lon - lon).cos();

        // Surface normal dotted with the observer position and with the
        // surface point position.
        let n_dot_obs = range * (latg.cos() * cos_so * cos_dlon + latg.sin() * sin_so);
        let n_dot_pt = radius * (lat - latg).cos();

        let cos_sep = sin_so * lat.sin() + cos_so * lat.cos() * cos_dlon;
        (n_dot_obs - n_dot_pt) / separation(range, radius, cos_sep)
    }

    fn mu0(&self, sub_solar_lat: f64, sub_solar_lon: f64, lat: f64, lon: f64) -> f64 {
        let latg = self.graphic_latitude(lat);
        let (sin_ss, cos_ss) = sub_solar_lat.sin_cos();
        latg.cos() * cos_ss * (sub_solar_lon - lon).cos() + latg.sin() * sin_ss
    }

    fn cos_phase(
        &self,
        sub_observ_lat: f64,
        sub_observ_lon: f64,
        sub_solar_lat: f64,
        sub_solar_lon: f64,
        lat: f64,
        lon: f64,
        range: f64,
    ) -> f64 {
        let radius = self.centric_radius(lat);

        let (sin_so, cos_so) = sub_observ_lat.sin_cos();
        let (sin_ss, cos_ss) = sub_solar_lat.sin_cos();
        let (sin_lat, cos_lat) = lat.sin_cos();

        // Observer and surface point positions dotted with the Sun direction.
        let obs_dot_sun =
            range * (cos_so * cos_ss * (sub_observ_lon - sub_solar_lon).cos() + sin_so * sin_ss);
        let pt_dot_sun = radius * (cos_lat * cos_ss * (lon - sub_solar_lon).cos() + sin_lat * sin_ss);

        let cos_sep = sin_so * sin_lat + cos_so * cos_lat * (sub_observ_lon - lon).cos();
        (obs_dot_sun - pt_dot_sun) / separation(range, radius, cos_sep)
    }

    fn ellipse_intersection(&self, origin: &Vector3, direction: &Vector3) -> Intersection {
        let a2 = self.eq_rad * self.eq_rad;
        let c2 = self.pol_rad * self.pol_rad;

        let (ox, oy, oz) = (origin[0], origin[1], origin[2]);
        let (dx, dy, dz) = (direction[0], direction[1], direction[2]);

        let a = c2 * (dx * dx + dy * dy) + a2 * dz * dz;
        let b = 2.0 * (c2 * (ox * dx + oy * dy) + a2 * oz * dz);
        let c = c2 * (ox * ox + oy * oy) + a2 * oz * oz - a2 * c2;

        if !(a > 0.0) {
            return Intersection::BadDirection;
        }

        let Some(k) = quadratic_roots(a, b, c) else {
            return Intersection::Miss;
        };

        let k = if k.1 < k.0 { k.0 } else { k.1 };
        let p = *origin + *direction * k;

        Intersection::Hit {
            lat: p[2].atan2(p[0].hypot(p[1])),
            lon: p[0].atan2(-p[1]),
        }
    }
}

/// Distance between two points at distances `r1` and `r2` from the origin
/// whose directions make an angle with cosine `cos_sep` (law of cosines).
fn separation(r1: f64, r2: f64, cos_sep: f64) -> f64 {
    (r1 * r1 + r2 * r2 - 2.0 * r1 * r2 * cos_sep).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq, assert_ulps_eq};
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    fn jupiter() -> OblateSpheroid {
        OblateSpheroid::new(true, 71492.0, 66854.0).unwrap()
    }

    #[test]
    fn test_invalid_radii() {
        assert!(OblateSpheroid::new(true, 0.0, 1.0).is_err());
        assert!(OblateSpheroid::new(true, 1.0, -1.0).is_err());
        assert!(OblateSpheroid::new(true, f64::NAN, 1.0).is_err());
        // Prolate bodies are not oblate spheroids.
        assert!(OblateSpheroid::new(true, 1.0, 2.0).is_err());
        // A sphere is a valid degenerate case.
        assert!(OblateSpheroid::new(false, 1.0, 1.0).is_ok());
    }

    #[test]
    fn test_eccentricity() {
        let body = jupiter();
        let ratio: f64 = 66854.0 / 71492.0;
        assert_ulps_eq!(body.first_eccentricity(), (1.0 - ratio * ratio).sqrt());
        assert_relative_eq!(body.flattening(), (71492.0 - 66854.0) / 71492.0);
    }

    #[test]
    fn test_centric_radius_extremes() {
        for &(a, c) in &[(71492.0, 66854.0), (6378.137, 6356.752), (1.0, 1.0), (60268.0, 54364.0)] {
            let body = OblateSpheroid::new(true, a, c).unwrap();
            assert_ulps_eq!(body.centric_radius(0.0), a, max_ulps = 4);
            assert_ulps_eq!(body.centric_radius(FRAC_PI_2), c, max_ulps = 4);
            assert_ulps_eq!(body.centric_radius(-FRAC_PI_2), c, max_ulps = 4);
        }
    }

    #[test]
    fn test_latitude_round_trip() {
        let body = jupiter();
        for i in -89..=89 {
            let lat = (i as f64).to_radians();
            assert_relative_eq!(
                body.centric_latitude(body.graphic_latitude(lat)),
                lat,
                epsilon = 1e-15,
                max_relative = 1e-14
            );
        }
    }

    #[test]
    fn test_graphic_latitude_is_steeper() {
        let body = jupiter();
        let lat = FRAC_PI_4;
        assert!(body.graphic_latitude(lat) > lat);
        assert!(body.centric_latitude(lat) < lat);
        assert_eq!(body.graphic_latitude(0.0), 0.0);
    }

    #[test]
    fn test_radii_of_curvature() {
        let body = jupiter();
        let a = body.eq_rad();
        let c = body.pol_rad();
        // Equator: N = a, M = c²/a. Pole: M = N = a²/c.
        assert_relative_eq!(body.prime_vertical_radius(0.0), a);
        assert_relative_eq!(body.meridional_radius(0.0), c * c / a, max_relative = 1e-14);
        assert_relative_eq!(body.meridional_radius(FRAC_PI_2), a * a / c, max_relative = 1e-14);
        assert_relative_eq!(body.prime_vertical_radius(FRAC_PI_2), a * a / c, max_relative = 1e-14);
    }

    #[test]
    fn test_mu_at_sub_observer_point() {
        let body = jupiter();
        let lat = 0.3;
        let lon = 1.2;
        let latg = body.graphic_latitude(lat);
        // Looking straight down the radius vector; the normal is tilted from
        // it by the centric/graphic latitude difference.
        assert_relative_eq!(body.mu(lat, lon, lat, lon, 1e6), (lat - latg).cos(), max_relative = 1e-12);
    }

    #[test]
    fn test_mu_limb_and_far_side() {
        let body = OblateSpheroid::new(true, 1.0, 1.0).unwrap();
        // Opposite side of a sphere faces away.
        assert!(body.mu(0.0, 0.0, 0.0, std::f64::consts::PI, 10.0) < 0.0);
        // From range d the limb of a unit sphere is at angle acos(1/d).
        let d: f64 = 4.0;
        let limb = (1.0 / d).acos();
        assert_abs_diff_eq!(body.mu(0.0, 0.0, 0.0, limb, d), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mu0_and_phase_on_sphere() {
        let body = OblateSpheroid::new(true, 1.0, 1.0).unwrap();
        assert_relative_eq!(body.mu0(0.0, 0.0, 0.0, 0.5), 0.5_f64.cos());
        assert_relative_eq!(body.mu0(FRAC_PI_2, 0.0, 0.2, 0.0), 0.2_f64.sin(), max_relative = 1e-14);

        // Sun directly behind a very distant observer: zero phase angle.
        let cp = body.cos_phase(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1e12);
        assert_relative_eq!(cp, 1.0, max_relative = 1e-12);

        // Sun 90° away from a distant observer, seen at the sub-observer point.
        let cp = body.cos_phase(0.0, 0.0, 0.0, FRAC_PI_2, 0.0, 0.0, 1e12);
        assert_abs_diff_eq!(cp, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_ellipse_intersection_on_axis() {
        let body = jupiter();
        // From the observer at lon 0 (on -y), looking along +y: the point
        // facing the observer is at lat 0, lon 0.
        let origin = Vector3::new(0.0, 0.0, 0.0);
        let toward_viewer = Vector3::new(0.0, -1.0, 0.0);
        match body.ellipse_intersection(&origin, &toward_viewer) {
            Intersection::Hit { lat, lon } => {
                assert_abs_diff_eq!(lat, 0.0, epsilon = 1e-15);
                assert_abs_diff_eq!(lon, 0.0, epsilon = 1e-15);
            }
            other => panic!("expected a hit, got {other:?}"),
        }

        // Viewer on +x sees east longitude 90°.
        let toward_viewer = Vector3::new(1.0, 0.0, 0.0);
        match body.ellipse_intersection(&origin, &toward_viewer) {
            Intersection::Hit { lon, .. } => assert_ulps_eq!(lon, FRAC_PI_2),
            other => panic!("expected a hit, got {other:?}"),
        }
    }

    #[test]
    fn test_ellipse_intersection_recovers_surface_point() {
        let body = jupiter();
        let (lat, lon) = (0.4, -0.7);
        let p = body.surface_point(lat, lon);
        let viewer = Vector3::new(2e5, -9e5, 3e5);
        let direction = viewer - p;
        // Start the line behind the point, inside the body.
        let origin = p - direction * 0.01;
        match body.ellipse_intersection(&origin, &direction) {
            Intersection::Hit { lat: l, lon: n } => {
                assert_relative_eq!(l, lat, max_relative = 1e-10);
                assert_relative_eq!(n, lon, max_relative = 1e-10);
            }
            other => panic!("expected a hit, got {other:?}"),
        }
    }

    #[test]
    fn test_ellipse_intersection_miss_and_bad_direction() {
        let body = jupiter();
        let origin = Vector3::new(2e5, 0.0, 0.0);
        assert_eq!(
            body.ellipse_intersection(&origin, &Vector3::new(0.0, 1.0, 0.0)),
            Intersection::Miss
        );
        assert_eq!(
            body.ellipse_intersection(&origin, &Vector3::zeros()),
            Intersection::BadDirection
        );
    }
}
