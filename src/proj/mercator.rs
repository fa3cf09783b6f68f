//! Mercator projection of an oblate spheroid.
//!
//!   x(λ)  = λ − λ₀
//!   y(φg) = ln(tan(π/4 + φg/2)·((1 − e·sinφg)/(1 + e·sinφg))^(e/2))
//!
//! Both in radians at the equator, so one map pixel covers 2π/samples
//! radians in each direction. The map always spans 360° of longitude
//! centred on `lon_at_center`; the number of lines sets the latitude
//! coverage.
//!
//! Inverse: the spherical φg = 2·atan(exp(y)) − π/2 seeds a Newton root
//! find on y(φg), once per map line.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};
use std::sync::Arc;

use ndarray::Array2;

use crate::angles::longitude_from_degrees;
use crate::body::{BodyData, OblateSpheroid};
use crate::error::MapError;
use crate::proj::common::{check_grid, column_longitude, draw_graticule, longitude_column};
use crate::proj::MapProjection;
use crate::root_find::root_find;

/// Conformal cylindrical projection.
#[derive(Debug, Clone)]
pub struct Mercator {
    body: Arc<OblateSpheroid>,
    /// Longitude at the central meridian (radians).
    lon_at_center: f64,
    /// Planetographic latitude beyond which cells are left empty.
    max_latg: Option<f64>,
}

impl Mercator {
    /// `lon_at_center` and `max_lat` in degrees. `max_lat` bounds the map
    /// symmetrically about the equator and must lie in `(0, 90)`.
    pub fn new(
        body: Arc<OblateSpheroid>,
        lon_at_center: f64,
        max_lat: Option<f64>,
    ) -> Result<Self, MapError> {
        let lon_at_center = longitude_from_degrees("longitude at centre", lon_at_center)?;

        let max_latg = match max_lat {
            Some(lat) if !(lat > 0.0 && lat < 90.0) => {
                return Err(MapError::InvalidParameter(format!(
                    "Mercator maximum latitude {lat}° must be in (0°, 90°)"
                )));
            }
            Some(lat) => Some(body.graphic_latitude(lat.to_radians())),
            None => None,
        };

        Ok(Self {
            body,
            lon_at_center,
            max_latg,
        })
    }

    pub fn lon_at_center(&self) -> f64 {
        self.lon_at_center
    }

    /// Scale factor at planetocentric latitude `lat`: 1 on the equator,
    /// growing toward the poles.
    pub fn distortion(&self, lat: f64) -> f64 {
        let latg = self.body.graphic_latitude(lat);
        self.body.eq_rad() / (self.body.prime_vertical_radius(latg) * latg.cos())
    }

    /// Northing of planetographic latitude `latg`.
    fn mercator_y(&self, latg: f64) -> f64 {
        let e = self.body.first_eccentricity();
        let es = e * latg.sin();
        ((FRAC_PI_4 + latg / 2.0).tan() * ((1.0 - es) / (1.0 + es)).powf(e / 2.0)).ln()
    }

    /// Planetographic latitude at northing `y`. Northings beyond that of
    /// the largest latitude below the pole map to the pole itself.
    fn latitude_at(&self, y: f64) -> Result<f64, MapError> {
        if y.abs() >= self.mercator_y(FRAC_PI_2) {
            return Ok(FRAC_PI_2.copysign(y));
        }
        let guess = 2.0 * y.exp().atan() - FRAC_PI_2;
        Ok(root_find(y, guess, |latg| self.mercator_y(latg))?)
    }

    fn west_edge(&self) -> f64 {
        self.lon_at_center - PI
    }
}

impl MapProjection for Mercator {
    fn projection_name(&self) -> &'static str {
        "Mercator"
    }

    fn plot_map(
        &self,
        samples: usize,
        lines: usize,
        plot: &mut dyn FnMut(f64, f64, usize),
    ) -> Result<(), MapError> {
        let prograde = self.body.prograde();
        let res = TAU / samples as f64;
        let y_max = self.max_latg.map(|latg| self.mercator_y(latg));

        let longitudes: Vec<f64> = (0..samples)
            .map(|i| column_longitude(prograde, self.west_edge(), TAU, samples, i))
            .collect();

        for k in 0..lines {
            let y = (k as f64 + 0.5 - lines as f64 / 2.0) * res;
            if y_max.is_some_and(|m| y.abs() > m) {
                continue;
            }

            let lat = self.body.centric_latitude(self.latitude_at(y)?);

            let offset = k * samples;
            for (i, &lon) in longitudes.iter().enumerate() {
                plot(lat, lon, offset + i);
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
        let prograde = self.body.prograde();
        let res = TAU / samples as f64;
        let half_height = lines as f64 / 2.0;

        // Parallels beyond the top and bottom map lines are off the map.
        let edge_latg = match self.max_latg {
            Some(latg) => latg,
            None => self.latitude_at(half_height * res)?,
        };
        let edge_lat = self.body.centric_latitude(edge_latg);

        let project = |lat: f64, lon: f64| {
            let x = longitude_column(prograde, self.west_edge(), TAU, samples, lon)?;
            let y = self.mercator_y(self.body.graphic_latitude(lat));
            Some((x, y / res + half_height))
        };

        draw_graticule(
            grid,
            (-edge_lat, edge_lat),
            (self.west_edge(), TAU),
            lat_interval,
            lon_interval,
            project,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn saturn() -> Arc<OblateSpheroid> {
        Arc::new(OblateSpheroid::new(true, 60268.0, 54364.0).unwrap())
    }

    #[test]
    fn test_invalid_max_lat() {
        assert!(Mercator::new(saturn(), 0.0, Some(90.0)).is_err());
        assert!(Mercator::new(saturn(), 0.0, Some(-10.0)).is_err());
        assert!(Mercator::new(saturn(), 400.0, None).is_err());
        assert!(Mercator::new(saturn(), -90.0, Some(80.0)).is_ok());
    }

    #[test]
    fn test_distortion() {
        let m = Mercator::new(saturn(), 0.0, None).unwrap();
        assert_relative_eq!(m.distortion(0.0), 1.0, epsilon = 1e-15);
        for deg in [-60.0_f64, -10.0, 5.0, 45.0, 80.0] {
            assert!(m.distortion(deg.to_radians()) > 1.0);
        }
        assert!(m.distortion(0.8) > m.distortion(0.4));
    }

    #[test]
    fn test_latitude_inverse() {
        let m = Mercator::new(saturn(), 0.0, None).unwrap();
        for deg in [-75.0_f64, -30.0, 0.0, 12.5, 60.0, 84.0] {
            let latg = deg.to_radians();
            let y = m.mercator_y(latg);
            assert_relative_eq!(m.latitude_at(y).unwrap(), latg, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_spherical_limit() {
        let sphere = Arc::new(OblateSpheroid::new(true, 1000.0, 1000.0).unwrap());
        let m = Mercator::new(sphere, 0.0, None).unwrap();
        let lat = 0.7_f64;
        assert_relative_eq!(m.mercator_y(lat), (FRAC_PI_4 + lat / 2.0).tan().ln(), epsilon = 1e-15);
    }

    #[test]
    fn test_plot_map_rows() {
        let m = Mercator::new(saturn(), 90.0, None).unwrap();
        let samples = 16;
        let lines = 8;
        let mut cells = Vec::new();
        m.plot_map(samples, lines, &mut |lat, lon, offset| cells.push((lat, lon, offset)))
            .unwrap();
        assert_eq!(cells.len(), samples * lines);

        // Rows symmetric about the equator.
        assert_relative_eq!(cells[0].0, -cells[(lines - 1) * samples].0, epsilon = 1e-12);
        // Prograde: the centre columns straddle lon_at_center, east to the left.
        let c = cells[samples / 2 - 1].1;
        let d = cells[samples / 2].1;
        assert_relative_eq!(c, (90.0_f64 + 11.25).to_radians(), epsilon = 1e-12);
        assert_relative_eq!(d, (90.0_f64 - 11.25).to_radians(), epsilon = 1e-12);

        // Cells are square in Mercator space: row 4 is one pixel north of
        // the equator.
        let latg = saturn().graphic_latitude(cells[4 * samples].0);
        assert_relative_eq!(m.mercator_y(latg), 0.5 * TAU / samples as f64, epsilon = 1e-12);
    }

    #[test]
    fn test_latitude_inverse_near_pole() {
        let m = Mercator::new(saturn(), 0.0, None).unwrap();
        for y in [12.0_f64, 15.5, 18.85] {
            for sign in [1.0, -1.0] {
                let latg = m.latitude_at(sign * y).unwrap();
                assert!(latg.abs() < FRAC_PI_2);
                assert_relative_eq!(m.mercator_y(latg), sign * y, max_relative = 1e-6);
            }
        }
        // Past the last representable latitude.
        assert_eq!(m.latitude_at(500.0).unwrap(), FRAC_PI_2);
        assert_eq!(m.latitude_at(-500.0).unwrap(), -FRAC_PI_2);
    }

    #[test]
    fn test_tall_map() {
        let m = Mercator::new(saturn(), 0.0, None).unwrap();
        for lines in [64, 80, 96] {
            let mut top = f64::NEG_INFINITY;
            let mut count = 0;
            m.plot_map(16, lines, &mut |lat, _, _| {
                top = top.max(lat);
                count += 1;
            })
            .unwrap();
            assert_eq!(count, 16 * lines);
            assert!(top < FRAC_PI_2 && top > 89.99_f64.to_radians(), "top = {top}");
        }
    }

    #[test]
    fn test_max_lat_clips_rows() {
        let m = Mercator::new(saturn(), 0.0, Some(30.0)).unwrap();
        let mut rows = Vec::new();
        m.plot_map(36, 36, &mut |lat, _, offset| {
            if offset % 36 == 0 {
                rows.push(lat);
            }
        })
        .unwrap();
        assert!(!rows.is_empty() && rows.len() < 36);
        for lat in rows {
            assert!(lat.abs() <= 30.0_f64.to_radians());
        }
    }

    #[test]
    fn test_grid_has_equator() {
        let m = Mercator::new(saturn(), 0.0, None).unwrap();
        let mut grid = Array2::zeros((64, 128));
        m.plot_grid(128, 64, 30f64.to_radians(), 30f64.to_radians(), &mut grid)
            .unwrap();
        let equator: usize = [31, 32]
            .iter()
            .map(|&k| grid.row(k).iter().filter(|&&v| v == 255).count())
            .sum();
        assert!(equator >= 128);
    }
}
