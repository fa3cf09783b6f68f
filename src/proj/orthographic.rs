//! Orthographic projection: the body as seen from infinitely far away.
//!
//! Each map cell is a line of sight parallel to the direction of the
//! observer; its intersection with the body is the nearer root of the
//! line/ellipsoid quadratic. Cells whose line of sight misses the body
//! stay empty.
//!
//! In body coordinates the observer lies along `ô = (0, -cosφ, sinφ)`
//! for sub-observer latitude `φ`, with the sub-observer meridian at
//! body longitude 0. The image plane is spanned by `x̂ = (1, 0, 0)`
//! (increasing sample) and `ẑ = (0, sinφ, cosφ)` (up, toward north),
//! then turned so that north lies at the position angle.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::sync::Arc;

use ndarray::Array2;

use crate::angles::{latitude_from_degrees, longitude_from_degrees, normalize_longitude};
use crate::body::{BodyData, Intersection};
use crate::error::MapError;
use crate::linalg::Vector3;
use crate::proj::common::{check_grid, draw_graticule};
use crate::proj::MapProjection;

/// Fraction of the smaller map dimension covered by the equatorial
/// diameter when no resolution is given.
const DEFAULT_FILL: f64 = 0.9;

/// Where the body is placed on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrthographicCenter {
    /// Body centre at the centre of the map.
    Default,
    /// Body centre at this map position (samples, lines from the bottom).
    Pixel { sample: f64, line: f64 },
    /// Planetocentric latitude and longitude (degrees) at the centre of
    /// the map.
    LatLon { lat: f64, lon: f64 },
}

/// Map scale and body centre for a particular map size.
#[derive(Debug, Clone, Copy)]
struct Layout {
    km_per_pixel: f64,
    sample_center: f64,
    line_center: f64,
}

#[derive(Debug, Clone)]
pub struct Orthographic {
    body: Arc<dyn BodyData>,
    sub_observ_lat: f64,
    sub_observ_lon: f64,
    position_angle: f64,
    km_per_pixel: Option<f64>,
    center: OrthographicCenter,
    /// Toward the observer, body frame.
    to_observer: Vector3,
    /// Image plane basis before the position angle turn, body frame.
    x_axis: Vector3,
    z_axis: Vector3,
}

impl Orthographic {
    /// Angles in degrees. With `km_per_pixel` unset the equatorial
    /// diameter spans 90% of the smaller map dimension.
    pub fn new(
        body: Arc<dyn BodyData>,
        sub_observ_lat: f64,
        sub_observ_lon: f64,
        position_angle: f64,
        km_per_pixel: Option<f64>,
        center: OrthographicCenter,
    ) -> Result<Self, MapError> {
        let sub_observ_lat = latitude_from_degrees("sub-observer latitude", sub_observ_lat)?;
        let sub_observ_lon = longitude_from_degrees("sub-observer longitude", sub_observ_lon)?;
        let position_angle = longitude_from_degrees("position angle", position_angle)?;

        if let Some(km) = km_per_pixel {
            if !(km > 0.0 && km.is_finite()) {
                return Err(MapError::InvalidParameter(format!(
                    "km per pixel must be positive, got {km}"
                )));
            }
        }

        let center = match center {
            OrthographicCenter::LatLon { lat, lon } => OrthographicCenter::LatLon {
                lat: latitude_from_degrees("latitude at centre", lat)?,
                lon: longitude_from_degrees("longitude at centre", lon)?,
            },
            OrthographicCenter::Pixel { sample, line }
                if !sample.is_finite() || !line.is_finite() =>
            {
                return Err(MapError::InvalidParameter(
                    "body centre must be finite".into(),
                ));
            }
            other => other,
        };

        let (sin_lat, cos_lat) = sub_observ_lat.sin_cos();
        Ok(Self {
            body,
            sub_observ_lat,
            sub_observ_lon,
            position_angle,
            km_per_pixel,
            center,
            to_observer: Vector3::new(0.0, -cos_lat, sin_lat),
            x_axis: Vector3::new(1.0, 0.0, 0.0),
            z_axis: Vector3::new(0.0, sin_lat, cos_lat),
        })
    }

    pub fn sub_observ_lat(&self) -> f64 {
        self.sub_observ_lat
    }

    pub fn sub_observ_lon(&self) -> f64 {
        self.sub_observ_lon
    }

    fn body_longitude(&self, lon: f64) -> f64 {
        if self.body.prograde() {
            self.sub_observ_lon - lon
        } else {
            lon - self.sub_observ_lon
        }
    }

    fn planet_longitude(&self, lon_b: f64) -> f64 {
        let lon = if self.body.prograde() {
            self.sub_observ_lon - lon_b
        } else {
            self.sub_observ_lon + lon_b
        };
        normalize_longitude(lon)
    }

    /// Cosine of the emission angle at (`lat`, `lon_b`) seen from infinity.
    fn facing(&self, lat: f64, lon_b: f64) -> f64 {
        let latg = self.body.graphic_latitude(lat);
        let (sin_g, cos_g) = latg.sin_cos();
        let (sin_l, cos_l) = lon_b.sin_cos();
        Vector3::new(cos_g * sin_l, -cos_g * cos_l, sin_g).dot(&self.to_observer)
    }

    /// Position-angle-turned image plane coordinates (km) of a body-frame
    /// point.
    fn plane_coordinates(&self, p: &Vector3) -> (f64, f64) {
        let u0 = p.dot(&self.x_axis);
        let v0 = p.dot(&self.z_axis);
        let (s, c) = self.position_angle.sin_cos();
        (u0 * c + v0 * s, -u0 * s + v0 * c)
    }

    fn layout(&self, samples: usize, lines: usize) -> Result<Layout, MapError> {
        let km_per_pixel = match self.km_per_pixel {
            Some(km) => km,
            None => {
                2.0 * self.body.centric_radius(0.0) / (DEFAULT_FILL * samples.min(lines) as f64)
            }
        };

        let (sample_center, line_center) = match self.center {
            OrthographicCenter::Default => (samples as f64 / 2.0, lines as f64 / 2.0),
            OrthographicCenter::Pixel { sample, line } => (sample, line),
            OrthographicCenter::LatLon { lat, lon } => {
                let lon_b = self.body_longitude(lon);
                if self.facing(lat, lon_b) <= 0.0 {
                    return Err(MapError::OutOfRange(format!(
                        "latitude {}° longitude {}° is not visible from the sub-observer point",
                        lat.to_degrees(),
                        lon.to_degrees()
                    )));
                }
                let (u, v) = self.plane_coordinates(&self.body.surface_point(lat, lon_b));
                (
                    samples as f64 / 2.0 - u / km_per_pixel,
                    lines as f64 / 2.0 - v / km_per_pixel,
                )
            }
        };

        tracing::debug!(km_per_pixel, sample_center, line_center, "orthographic layout");

        Ok(Layout {
            km_per_pixel,
            sample_center,
            line_center,
        })
    }
}

impl MapProjection for Orthographic {
    fn projection_name(&self) -> &'static str {
        "Orthographic"
    }

    fn plot_map(
        &self,
        samples: usize,
        lines: usize,
        plot: &mut dyn FnMut(f64, f64, usize),
    ) -> Result<(), MapError> {
        let layout = self.layout(samples, lines)?;
        let (s, c) = self.position_angle.sin_cos();

        for k in 0..lines {
            let v = (k as f64 + 0.5 - layout.line_center) * layout.km_per_pixel;
            for i in 0..samples {
                let u = (i as f64 + 0.5 - layout.sample_center) * layout.km_per_pixel;

                // Undo the position angle turn.
                let u0 = u * c - v * s;
                let v0 = u * s + v * c;
                let origin = self.x_axis * u0 + self.z_axis * v0;

                match self.body.ellipse_intersection(&origin, &self.to_observer) {
                    Intersection::Hit { lat, lon } => {
                        plot(lat, self.planet_longitude(lon), k * samples + i)
                    }
                    Intersection::Miss => {}
                    Intersection::BadDirection => {
                        debug_assert!(false, "observer direction has zero length");
                    }
                }
            }
        }

        Ok(())
    }

    fn plot_grid(
        &self,
        samples: usize,
        lines: usize,
        lat_interval: f64,
        lon_interval: f64,
        grid: &mut Array2<u8>,
    ) -> Result<(), MapError> {
        check_grid(grid, samples, lines, lat_interval, lon_interval)?;
        let layout = self.layout(samples, lines)?;

        let project = |lat: f64, lon: f64| {
            let lon_b = self.body_longitude(lon);
            if self.facing(lat, lon_b) <= 0.0 {
                return None;
            }
            let (u, v) = self.plane_coordinates(&self.body.surface_point(lat, lon_b));
            Some((
                layout.sample_center + u / layout.km_per_pixel,
                layout.line_center + v / layout.km_per_pixel,
            ))
        };

        draw_graticule(
            grid,
            (-FRAC_PI_2, FRAC_PI_2),
            (0.0, TAU),
            lat_interval,
            lon_interval,
            project,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::OblateSpheroid;
    use approx::assert_relative_eq;

    fn jupiter() -> Arc<dyn BodyData> {
        Arc::new(OblateSpheroid::new(true, 71492.0, 66854.0).unwrap())
    }

    fn cells(p: &Orthographic, samples: usize, lines: usize) -> Vec<(f64, f64, usize)> {
        let mut cells = Vec::new();
        p.plot_map(samples, lines, &mut |lat, lon, offset| cells.push((lat, lon, offset)))
            .unwrap();
        cells
    }

    #[test]
    fn test_invalid_parameters() {
        let b = jupiter();
        let d = OrthographicCenter::Default;
        assert!(Orthographic::new(b.clone(), 95.0, 0.0, 0.0, None, d).is_err());
        assert!(Orthographic::new(b.clone(), 0.0, 0.0, 0.0, Some(0.0), d).is_err());
        let far = OrthographicCenter::LatLon { lat: 100.0, lon: 0.0 };
        assert!(Orthographic::new(b, 0.0, 0.0, 0.0, None, far).is_err());
    }

    #[test]
    fn test_centre_cell_is_sub_observer_point() {
        let p = Orthographic::new(jupiter(), 20.0, 45.0, 30.0, None, OrthographicCenter::Default)
            .unwrap();
        let n = 101;
        let all = cells(&p, n, n);
        let centre = all.iter().find(|c| c.2 == 50 * n + 50).unwrap();
        assert_relative_eq!(centre.0, 20.0_f64.to_radians(), epsilon = 1e-12);
        assert_relative_eq!(centre.1, 45.0_f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn test_default_scale_fills_ninety_percent() {
        let p = Orthographic::new(jupiter(), 0.0, 0.0, 0.0, None, OrthographicCenter::Default)
            .unwrap();
        let n = 200;
        let all = cells(&p, n, n);

        // Equatorial row: the disc covers 180 of 200 samples.
        let row: Vec<usize> = all
            .iter()
            .filter(|c| c.2 / n == n / 2)
            .map(|c| c.2 % n)
            .collect();
        assert!((179..=181).contains(&row.len()), "row = {}", row.len());
        assert_eq!(row[0], 10);
    }

    #[test]
    fn test_prograde_longitude_increases_leftward() {
        let p = Orthographic::new(jupiter(), 0.0, 100.0, 0.0, None, OrthographicCenter::Default)
            .unwrap();
        let n = 51;
        let all = cells(&p, n, n);
        let row: Vec<f64> = all.iter().filter(|c| c.2 / n == 25).map(|c| c.1).collect();
        for pair in row.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn test_north_up_at_zero_position_angle() {
        let p = Orthographic::new(jupiter(), 10.0, 0.0, 0.0, None, OrthographicCenter::Default)
            .unwrap();
        let n = 51;
        let all = cells(&p, n, n);
        let top = all.iter().filter(|c| c.2 / n == 45).map(|c| c.0).fold(f64::MIN, f64::max);
        let bottom = all.iter().filter(|c| c.2 / n == 5).map(|c| c.0).fold(f64::MIN, f64::max);
        assert!(top > 0.0 && bottom < 0.0);

        // Position angle 180°: south up.
        let p = Orthographic::new(jupiter(), 10.0, 0.0, 180.0, None, OrthographicCenter::Default)
            .unwrap();
        let all = cells(&p, n, n);
        let top = all.iter().filter(|c| c.2 / n == 45).map(|c| c.0).fold(f64::MIN, f64::max);
        assert!(top < 0.0);
    }

    #[test]
    fn test_lat_lon_centre() {
        let center = OrthographicCenter::LatLon { lat: 30.0, lon: 60.0 };
        let p = Orthographic::new(jupiter(), 0.0, 40.0, 15.0, Some(500.0), center).unwrap();
        let n = 101;
        let all = cells(&p, n, n);
        let c = all.iter().find(|c| c.2 == 50 * n + 50).unwrap();
        assert_relative_eq!(c.0, 30.0_f64.to_radians(), epsilon = 1e-10);
        assert_relative_eq!(c.1, 60.0_f64.to_radians(), epsilon = 1e-10);
    }

    #[test]
    fn test_far_side_centre_is_out_of_range() {
        let center = OrthographicCenter::LatLon { lat: 0.0, lon: 200.0 };
        let p = Orthographic::new(jupiter(), 0.0, 20.0, 0.0, None, center).unwrap();
        let r = p.plot_map(10, 10, &mut |_, _, _| {});
        assert!(matches!(r, Err(MapError::OutOfRange(_))));
    }

    #[test]
    fn test_pixel_centre_offsets_disc() {
        let center = OrthographicCenter::Pixel { sample: 10.0, line: 10.0 };
        let p = Orthographic::new(jupiter(), 0.0, 0.0, 0.0, Some(71492.0 / 5.0), center).unwrap();
        let all = cells(&p, 40, 40);
        assert!(!all.is_empty());
        for &(_, _, offset) in &all {
            let (k, i) = (offset / 40, offset % 40);
            assert!(i < 16 && k < 16);
        }
    }

    #[test]
    fn test_grid_visible_only() {
        let p = Orthographic::new(jupiter(), 0.0, 0.0, 0.0, None, OrthographicCenter::Default)
            .unwrap();
        let mut grid = Array2::zeros((64, 64));
        p.plot_grid(64, 64, 30f64.to_radians(), 30f64.to_radians(), &mut grid)
            .unwrap();
        // Central meridian down the middle, corners blank.
        assert!(grid.column(32).iter().skip(10).take(44).all(|&v| v == 255));
        assert_eq!(grid[[0, 0]], 0);
        assert_eq!(grid[[63, 63]], 0);
    }
}
