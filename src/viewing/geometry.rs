//! Viewing geometry of a body in a photographic image.
//!
//! # Frames
//!
//! - Body frame: see [`crate::body`]. The observer sits in the `y-z`
//!   plane on the `-y` side, at `(0, -R·cosφ, R·sinφ)` for range `R` and
//!   sub-observer latitude `φ`; body-frame longitude 0 is therefore the
//!   sub-observer meridian.
//! - Observer frame: `+y` is the optical axis (pointing from the camera
//!   into the scene), `+x` is increasing sample and `+z` is image up
//!   (decreasing line).
//!
//! The full rotation is `observ2body = Rz(twist)·Rx(sub_lat_mod)·Ry(-PA)`.
//! Recovering `sub_lat_mod` from the observed geometry has two algebraic
//! solutions; both are built and the one that best reproduces a known
//! reference vector (and puts the north pole at the configured position
//! angle) is kept.
//!
//! The position angle is the angle of the projected north pole measured
//! from image up toward increasing sample.
//!
//! # Usage
//!
//! Configure a [`ViewingGeometryBuilder`] with the setters, then call
//! [`ViewingGeometryBuilder::finalize_setup`] to obtain an immutable
//! [`ViewingGeometry`].

use std::f64::consts::PI;
use std::sync::Arc;

use ndarray::Array2;

use crate::angles::{latitude_from_degrees, longitude_from_degrees, normalize_longitude};
use crate::body::{BodyData, Intersection};
use crate::error::GeometryError;
use crate::linalg::{
    magnitude, rot_x, rot_y, rotation_x, rotation_y, rotation_z, unit, Matrix3, Vector3,
};
use crate::viewing::correction::{GeometricCorrection, IdentityCorrection};

/// Largest acceptable rotation residual relative to the reference vector
/// magnitude (1e-8 %).
const ROTATION_TOLERANCE: f64 = 1e-10;

/// How the body is placed in the image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CenterSpec {
    /// Pixel location of the body centre.
    Pixel { sample: f64, line: f64 },
    /// Planetocentric latitude and longitude (radians) on the optical axis.
    LatLon { lat: f64, lon: f64 },
}

/// Collects and validates viewing parameters.
///
/// Every setter checks its argument immediately. Angles are in degrees,
/// distances in kilometres.
#[derive(Debug)]
pub struct ViewingGeometryBuilder {
    body: Arc<dyn BodyData>,
    sub_observ_lat: Option<f64>,
    sub_observ_lon: Option<f64>,
    sub_solar_lat: Option<f64>,
    sub_solar_lon: Option<f64>,
    range: Option<f64>,
    position_angle: Option<f64>,
    /// Millimetres
    focal_length: Option<f64>,
    /// Pixels per millimetre
    scale: Option<f64>,
    km_per_pixel: Option<f64>,
    optical_axis: Option<(f64, f64)>,
    center: Option<CenterSpec>,
    mu_limit: f64,
    use_terminator: bool,
    correction: Box<dyn GeometricCorrection>,
}

impl ViewingGeometryBuilder {
    pub fn new(body: Arc<dyn BodyData>) -> Self {
        Self {
            body,
            sub_observ_lat: None,
            sub_observ_lon: None,
            sub_solar_lat: None,
            sub_solar_lon: None,
            range: None,
            position_angle: None,
            focal_length: None,
            scale: None,
            km_per_pixel: None,
            optical_axis: None,
            center: None,
            // Emission angle limit of 90°.
            mu_limit: 0.0,
            use_terminator: false,
            correction: Box::new(IdentityCorrection),
        }
    }

    pub fn sub_observ_lat(&mut self, lat: f64) -> Result<(), GeometryError> {
        self.sub_observ_lat = Some(latitude_from_degrees("sub-observer latitude", lat)?);
        Ok(())
    }

    pub fn sub_observ_lon(&mut self, lon: f64) -> Result<(), GeometryError> {
        self.sub_observ_lon = Some(longitude_from_degrees("sub-observer longitude", lon)?);
        Ok(())
    }

    pub fn sub_solar_lat(&mut self, lat: f64) -> Result<(), GeometryError> {
        self.sub_solar_lat = Some(latitude_from_degrees("sub-solar latitude", lat)?);
        Ok(())
    }

    pub fn sub_solar_lon(&mut self, lon: f64) -> Result<(), GeometryError> {
        self.sub_solar_lon = Some(longitude_from_degrees("sub-solar longitude", lon)?);
        Ok(())
    }

    pub fn position_angle(&mut self, north: f64) -> Result<(), GeometryError> {
        self.position_angle = Some(longitude_from_degrees("position angle", north)?);
        Ok(())
    }

    /// Observer to body centre distance (km).
    pub fn range(&mut self, range: f64) -> Result<(), GeometryError> {
        if !range.is_finite() {
            return Err(GeometryError::InvalidArgument("range is not finite".into()));
        }

        let min_radius = self
            .body
            .centric_radius(0.0)
            .min(self.body.centric_radius(PI / 2.0));
        if range <= min_radius {
            return Err(GeometryError::Domain(format!(
                "range {range} km places the observer inside the body"
            )));
        }

        // Range is squared in the visibility and intersection equations.
        if range >= f64::MAX.sqrt() {
            return Err(GeometryError::Range(format!("range {range} km too large")));
        }

        self.range = Some(range);
        Ok(())
    }

    /// Camera focal length (mm).
    pub fn focal_length(&mut self, len: f64) -> Result<(), GeometryError> {
        if !(len > 0.0) || !len.is_finite() {
            return Err(GeometryError::InvalidArgument(format!(
                "focal length must be positive, got {len}"
            )));
        }
        self.focal_length = Some(len);
        Ok(())
    }

    /// Image scale (pixels/mm).
    pub fn scale(&mut self, s: f64) -> Result<(), GeometryError> {
        if !(s > 0.0) || !s.is_finite() {
            return Err(GeometryError::InvalidArgument(format!(
                "image scale must be positive, got {s}"
            )));
        }
        self.scale = Some(s);
        Ok(())
    }

    /// Image resolution at the body centre (km/pixel).
    pub fn km_per_pixel(&mut self, km: f64) -> Result<(), GeometryError> {
        if !(km > 0.0) || !km.is_finite() {
            return Err(GeometryError::InvalidArgument(format!(
                "km per pixel must be positive, got {km}"
            )));
        }
        self.km_per_pixel = Some(km);
        Ok(())
    }

    /// Angular resolution; requires the range to be set already.
    pub fn arcsec_per_pixel(&mut self, arcsec: f64) -> Result<(), GeometryError> {
        let range = self.range.ok_or_else(|| {
            GeometryError::Logic("range must be set before arcseconds per pixel".into())
        })?;
        if !(arcsec > 0.0) || !arcsec.is_finite() {
            return Err(GeometryError::InvalidArgument(format!(
                "arcseconds per pixel must be positive, got {arcsec}"
            )));
        }

        // Small angle approximation: 648000 arcseconds in π radians.
        self.km_per_pixel(PI / 648_000.0 * arcsec * range)
    }

    pub fn optical_axis(&mut self, sample: f64, line: f64) -> Result<(), GeometryError> {
        if !sample.is_finite() || !line.is_finite() {
            return Err(GeometryError::InvalidArgument(
                "optical axis coordinates must be finite".into(),
            ));
        }
        self.optical_axis = Some((sample, line));
        Ok(())
    }

    /// Pixel location of the body centre. Replaces any lat/lon centre.
    pub fn body_center(&mut self, sample: f64, line: f64) -> Result<(), GeometryError> {
        if !sample.is_finite() || !line.is_finite() {
            return Err(GeometryError::InvalidArgument(
                "body centre coordinates must be finite".into(),
            ));
        }
        self.center = Some(CenterSpec::Pixel { sample, line });
        Ok(())
    }

    /// Latitude and longitude on the optical axis. Replaces any pixel centre.
    pub fn lat_lon_center(&mut self, lat: f64, lon: f64) -> Result<(), GeometryError> {
        let lat = latitude_from_degrees("latitude at centre", lat)?;
        let lon = longitude_from_degrees("longitude at centre", lon)?;
        self.center = Some(CenterSpec::LatLon { lat, lon });
        Ok(())
    }

    /// Points seen at more than `angle` degrees from the surface normal are
    /// not visible.
    pub fn emi_ang_limit(&mut self, angle: f64) -> Result<(), GeometryError> {
        if !(-90.0..=90.0).contains(&angle) {
            return Err(GeometryError::Range(format!(
                "emission angle limit {angle}° outside [-90°, 90°]"
            )));
        }
        self.mu_limit = angle.to_radians().cos();
        Ok(())
    }

    /// Treat the night side as not visible.
    pub fn use_terminator(&mut self, enable: bool) {
        self.use_terminator = enable;
    }

    pub fn set_geometric_correction(&mut self, correction: Box<dyn GeometricCorrection>) {
        self.correction = correction;
    }

    /// Derive the rotation matrices and image scale for an image of
    /// `samples` × `lines` pixels, freezing the configuration.
    pub fn finalize_setup(
        self,
        samples: usize,
        lines: usize,
    ) -> Result<ViewingGeometry, GeometryError> {
        let sub_observ_lat = self
            .sub_observ_lat
            .ok_or(GeometryError::Unset("sub-observer latitude"))?;
        let sub_observ_lon = self
            .sub_observ_lon
            .ok_or(GeometryError::Unset("sub-observer longitude"))?;
        let position_angle = self
            .position_angle
            .ok_or(GeometryError::Unset("position angle"))?;
        let range = self.range.ok_or(GeometryError::Unset("range"))?;
        let center = self.center.ok_or(GeometryError::Unset("body centre"))?;

        let sub_solar = match (self.sub_solar_lat, self.sub_solar_lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ if self.use_terminator => return Err(GeometryError::Unset("sub-solar point")),
            _ => None,
        };

        let (oa_s, oa_l) = self
            .optical_axis
            .unwrap_or((samples as f64 / 2.0, lines as f64 / 2.0));

        let km_per_pixel = match (self.km_per_pixel, self.focal_length, self.scale) {
            (Some(km), _, _) => km,
            (None, Some(f), Some(s)) => range / (f * s),
            _ => return Err(GeometryError::Unset("km per pixel (or focal length and scale)")),
        };

        let (sin_lat, cos_lat) = sub_observ_lat.sin_cos();
        let range_b = Vector3::new(0.0, -range * cos_lat, range * sin_lat);

        let (observ2body, normal_range, sample_center, line_center) = match center {
            CenterSpec::Pixel { sample, line } => {
                let x = (sample - oa_s) * km_per_pixel;
                let z = (oa_l - line) * km_per_pixel;
                let radicand = range * range - (x * x + z * z);
                if !(radicand > 0.0) {
                    return Err(GeometryError::InconsistentGeometry(format!(
                        "body centre offset {} km from the optical axis exceeds range {range} km",
                        x.hypot(z)
                    )));
                }
                let normal_range = radicand.sqrt();
                let range_o = Vector3::new(x, normal_range, z);
                let observ2body = rotation_from_range(&range_o, &range_b, position_angle);
                (observ2body, normal_range, sample, line)
            }
            CenterSpec::LatLon { lat, lon } => {
                let lon_b = body_longitude(self.body.prograde(), sub_observ_lon, lon);
                if self.body.mu(sub_observ_lat, sub_observ_lon, lat, lon, range) <= 0.0 {
                    return Err(GeometryError::Range(format!(
                        "latitude {}° longitude {}° at the optical axis is not visible",
                        lat.to_degrees(),
                        lon.to_degrees()
                    )));
                }
                let point = self.body.surface_point(lat, lon_b);
                let axis_b = point - range_b;
                let observ2body = rotation_from_axis(&axis_b, position_angle);

                let range_o = observ2body.transpose() * -range_b;
                let normal_range = range_o[1];
                (
                    observ2body,
                    normal_range,
                    oa_s + range_o[0] / km_per_pixel,
                    oa_l - range_o[2] / km_per_pixel,
                )
            }
        };

        let focal_length_pixels = normal_range / km_per_pixel;
        tracing::debug!(
            km_per_pixel,
            normal_range,
            focal_length_pixels,
            sample_center,
            line_center,
            "viewing geometry finalized"
        );

        Ok(ViewingGeometry {
            body: self.body,
            sub_observ_lat,
            sub_observ_lon,
            sub_solar,
            range,
            position_angle,
            km_per_pixel,
            focal_length_pixels,
            normal_range,
            oa_s,
            oa_l,
            sample_center,
            line_center,
            mu_limit: self.mu_limit,
            use_terminator: self.use_terminator,
            range_b,
            body2observ: observ2body.transpose(),
            observ2body,
            correction: self.correction,
        })
    }
}

/// Finalized, immutable viewing geometry.
#[derive(Debug)]
pub struct ViewingGeometry {
    body: Arc<dyn BodyData>,
    sub_observ_lat: f64,
    sub_observ_lon: f64,
    sub_solar: Option<(f64, f64)>,
    range: f64,
    position_angle: f64,
    km_per_pixel: f64,
    focal_length_pixels: f64,
    normal_range: f64,
    oa_s: f64,
    oa_l: f64,
    sample_center: f64,
    line_center: f64,
    mu_limit: f64,
    use_terminator: bool,
    /// Body centre to observer, body frame.
    range_b: Vector3,
    observ2body: Matrix3,
    body2observ: Matrix3,
    correction: Box<dyn GeometricCorrection>,
}

impl ViewingGeometry {
    pub fn body(&self) -> &Arc<dyn BodyData> {
        &self.body
    }

    pub fn sub_observ_lat(&self) -> f64 {
        self.sub_observ_lat
    }

    pub fn sub_observ_lon(&self) -> f64 {
        self.sub_observ_lon
    }

    pub fn sub_solar(&self) -> Option<(f64, f64)> {
        self.sub_solar
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn position_angle(&self) -> f64 {
        self.position_angle
    }

    pub fn km_per_pixel(&self) -> f64 {
        self.km_per_pixel
    }

    pub fn focal_length_pixels(&self) -> f64 {
        self.focal_length_pixels
    }

    /// Distance from the observer to the body centre along the optical axis.
    pub fn normal_range(&self) -> f64 {
        self.normal_range
    }

    pub fn optical_axis(&self) -> (f64, f64) {
        (self.oa_s, self.oa_l)
    }

    pub fn body_center(&self) -> (f64, f64) {
        (self.sample_center, self.line_center)
    }

    /// Body centre to observer vector in the body frame.
    pub fn range_vector(&self) -> Vector3 {
        self.range_b
    }

    pub fn observ2body(&self) -> &Matrix3 {
        &self.observ2body
    }

    pub fn body2observ(&self) -> &Matrix3 {
        &self.body2observ
    }

    pub fn mu_limit(&self) -> f64 {
        self.mu_limit
    }

    /// Replace the lens correction; the previous one is dropped.
    pub fn set_geometric_correction(&mut self, correction: Box<dyn GeometricCorrection>) {
        self.correction = correction;
    }

    /// Whether (`lat`, `lon`) faces the observer within the emission angle
    /// limit and, with the terminator enabled, is lit.
    pub fn is_visible(&self, lat: f64, lon: f64) -> bool {
        let mu = self
            .body
            .mu(self.sub_observ_lat, self.sub_observ_lon, lat, lon, self.range);
        if mu <= self.mu_limit {
            return false;
        }

        match (self.use_terminator, self.sub_solar) {
            (true, Some((ss_lat, ss_lon))) => self.body.mu0(ss_lat, ss_lon, lat, lon) > 0.0,
            _ => true,
        }
    }

    /// Image (sample, line) of planetocentric (`lat`, `lon`), or `None` if
    /// the point is not visible.
    pub fn latlon2pix(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        if !self.is_visible(lat, lon) {
            return None;
        }

        let lon_b = body_longitude(self.body.prograde(), self.sub_observ_lon, lon);
        let point = self.body.surface_point(lat, lon_b);
        let obs = self.body2observ * (point - self.range_b);

        let mut sample = self.focal_length_pixels * obs[0] / obs[1];
        // Line axis runs top to bottom.
        let mut line = -self.focal_length_pixels * obs[2] / obs[1];

        self.correction.object_to_image(&mut line, &mut sample);

        Some((self.oa_s + sample, self.oa_l + line))
    }

    /// Planetocentric (lat, lon) seen at image (`sample`, `line`), or
    /// `None` if the line of sight misses the body.
    pub fn pix2latlon(&self, sample: f64, line: f64) -> Option<(f64, f64)> {
        let mut s = sample - self.oa_s;
        let mut l = line - self.oa_l;
        self.correction.image_to_object(&mut l, &mut s);

        // Line of sight scaled so that it ends in the plane through the
        // body centre normal to the optical axis.
        let sight_o = Vector3::new(
            s * self.km_per_pixel,
            self.normal_range,
            -l * self.km_per_pixel,
        );
        let sight_b = self.observ2body * sight_o;
        let in_plane = self.range_b + sight_b;

        match self.body.ellipse_intersection(&in_plane, &-sight_b) {
            Intersection::Hit { lat, lon } => Some((lat, self.planet_longitude(lon))),
            Intersection::Miss => None,
            Intersection::BadDirection => {
                debug_assert!(false, "line of sight has zero length");
                None
            }
        }
    }

    /// Pixels of a `samples` × `lines` image that show the body, indexed
    /// `[line, sample]`. Every pixel is tested individually.
    pub fn body_mask(&self, samples: usize, lines: usize) -> Array2<bool> {
        Array2::from_shape_fn((lines, samples), |(line, sample)| {
            self.pix2latlon(sample as f64, line as f64).is_some()
        })
    }

    fn planet_longitude(&self, lon_b: f64) -> f64 {
        let lon = if self.body.prograde() {
            self.sub_observ_lon - lon_b
        } else {
            self.sub_observ_lon + lon_b
        };
        normalize_longitude(lon)
    }
}

/// Longitude relative to the sub-observer meridian, increasing eastward.
fn body_longitude(prograde: bool, sub_observ_lon: f64, lon: f64) -> f64 {
    if prograde {
        sub_observ_lon - lon
    } else {
        lon - sub_observ_lon
    }
}

fn candidate_rotation(sub_lat_mod: f64, twist: f64, position_angle: f64) -> Matrix3 {
    rotation_z(twist) * rotation_x(sub_lat_mod) * rotation_y(-position_angle)
}

/// How far `observ2body` is from carrying `reference_o` onto
/// `reference_b` with the north pole at `position_angle` in the image.
fn rotation_residual(
    observ2body: &Matrix3,
    position_angle: f64,
    reference_o: &Vector3,
    reference_b: &Vector3,
) -> f64 {
    let mut residual = magnitude(&(observ2body * reference_o - reference_b));

    // A pole along the line of sight has no image direction.
    let pole = observ2body.transpose() * Vector3::new(0.0, 0.0, 1.0);
    let h = pole[0].hypot(pole[2]);
    if h > f64::EPSILON {
        let (sin_pa, cos_pa) = position_angle.sin_cos();
        residual += (pole[0] / h - sin_pa).hypot(pole[2] / h - cos_pa) * magnitude(reference_b);
    }

    residual
}

/// Keep the candidate `(sub_lat_mod, twist)` with the smallest residual,
/// warning if even that one is off.
fn select_rotation(
    candidates: [(f64, f64); 2],
    position_angle: f64,
    reference_o: &Vector3,
    reference_b: &Vector3,
) -> Matrix3 {
    let evaluate = |(sub_lat_mod, twist): (f64, f64)| {
        let m = candidate_rotation(sub_lat_mod, twist, position_angle);
        let r = rotation_residual(&m, position_angle, reference_o, reference_b);
        (m, r, sub_lat_mod)
    };

    let first = evaluate(candidates[0]);
    let second = evaluate(candidates[1]);
    let (best, residual, sub_lat_mod) = if second.1 < first.1 { second } else { first };

    tracing::debug!(
        sub_lat_mod = sub_lat_mod.to_degrees(),
        residual,
        rejected_residual = first.1.max(second.1),
        "rotation matrix candidate selected"
    );

    let tolerance = ROTATION_TOLERANCE * magnitude(reference_b);
    if residual > tolerance {
        tracing::warn!(
            residual,
            tolerance,
            "rotation matrices do not reproduce the viewing geometry; \
             check the body centre, range and position angle"
        );
    }

    best
}

/// Rotation given the body centre direction in both frames.
///
/// `range_o` points from the observer to the body centre (observer
/// frame); `range_b` from the body centre to the observer (body frame).
fn rotation_from_range(range_o: &Vector3, range_b: &Vector3, position_angle: f64) -> Matrix3 {
    let target = -*range_b;
    let target_unit = unit(target);
    let w = rot_y(-position_angle, &unit(*range_o));

    // z component of Rx(s)·w: w_y·sin s + w_z·cos s = ρ·sin(s + α).
    let rho = w[1].hypot(w[2]);
    let alpha = w[2].atan2(w[1]);
    let beta = (target_unit[2] / rho).clamp(-1.0, 1.0).asin();

    let candidates = [beta - alpha, PI - beta - alpha].map(|sub_lat_mod| {
        let v = rot_x(sub_lat_mod, &w);
        (sub_lat_mod, v[0].atan2(v[1]))
    });

    select_rotation(candidates, position_angle, range_o, &target)
}

/// Rotation given the optical axis direction in the body frame.
///
/// `axis_b` points from the observer along the optical axis.
fn rotation_from_axis(axis_b: &Vector3, position_angle: f64) -> Matrix3 {
    let a = unit(*axis_b);

    // Rz(t)·Rx(s)·ŷ = (-cos s·sin t, cos s·cos t, sin s).
    let sub_lat_mod = a[2].clamp(-1.0, 1.0).asin();
    let candidates = [sub_lat_mod, PI - sub_lat_mod].map(|s| {
        let sign = s.cos().signum();
        (s, (-a[0] * sign).atan2(a[1] * sign))
    });

    let reference_o = Vector3::new(0.0, magnitude(axis_b), 0.0);
    select_rotation(candidates, position_angle, &reference_o, axis_b)
}
