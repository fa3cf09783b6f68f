//! Polar Stereographic projection of an oblate spheroid.
//!
//!   ρ(φg) = k·tan(π/4 − φg/2)·((1 + e·sinφg)/(1 − e·sinφg))^(e/2)
//!   k     = 2a / √((1 + e)^(1+e)·(1 − e)^(1−e))
//!
//! with φg measured toward the projection pole, so the scale is exact at
//! the pole. The map is a disc of radius ρ(max_lat) centred on the pole,
//! inscribed in the smaller map dimension. The 0° meridian runs from the
//! pole toward the bottom of the map.
//!
//! Inverse: the spherical φg = π/2 − 2·atan(ρ/k) seeds a Newton root find
//! on ρ(φg) for every map cell.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};
use std::sync::Arc;

use ndarray::Array2;

use crate::angles::normalize_longitude;
use crate::body::{BodyData, OblateSpheroid};
use crate::error::MapError;
use crate::proj::common::{check_grid, draw_graticule};
use crate::proj::MapProjection;
use crate::root_find::root_find;

/// Projection pole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pole {
    North,
    South,
}

impl Pole {
    fn sign(self) -> f64 {
        match self {
            Pole::North => 1.0,
            Pole::South => -1.0,
        }
    }
}

/// Azimuthal conformal projection centred on a pole.
#[derive(Debug, Clone)]
pub struct PolarStereographic {
    body: Arc<OblateSpheroid>,
    pole: Pole,
    /// Planetocentric latitude of the map edge, measured toward the pole.
    edge_lat: f64,
    /// ρ scale constant k (km).
    rho_coef: f64,
}

impl PolarStereographic {
    /// `max_lat` (degrees) is the latitude at the edge of the map disc; it
    /// must lie strictly between the poles.
    pub fn new(body: Arc<OblateSpheroid>, pole: Pole, max_lat: f64) -> Result<Self, MapError> {
        if !(max_lat > -90.0 && max_lat < 90.0) {
            return Err(MapError::InvalidParameter(format!(
                "polar stereographic edge latitude {max_lat}° must be in (-90°, 90°)"
            )));
        }

        let e = body.first_eccentricity();
        let rho_coef =
            2.0 * body.eq_rad() / ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt();

        Ok(Self {
            edge_lat: pole.sign() * max_lat.to_radians(),
            body,
            pole,
            rho_coef,
        })
    }

    pub fn pole(&self) -> Pole {
        self.pole
    }

    /// Scale factor at planetocentric latitude `lat`: 1 at the pole,
    /// growing toward the opposite pole.
    pub fn distortion(&self, lat: f64) -> f64 {
        let latg = self.body.graphic_latitude(self.pole.sign() * lat);
        let cos_latg = latg.cos();
        if cos_latg < f64::EPSILON {
            return 1.0;
        }
        self.rho(latg) / (self.body.prime_vertical_radius(latg) * cos_latg)
    }

    /// Distance from the pole on the map (km) of pole-relative
    /// planetographic latitude `latg`.
    fn rho(&self, latg: f64) -> f64 {
        let e = self.body.first_eccentricity();
        let es = e * latg.sin();
        self.rho_coef * (FRAC_PI_4 - latg / 2.0).tan() * ((1.0 + es) / (1.0 - es)).powf(e / 2.0)
    }

    /// Pole-relative planetographic latitude at map distance `rho`.
    fn latitude_at(&self, rho: f64) -> Result<f64, MapError> {
        if rho == 0.0 {
            return Ok(FRAC_PI_2);
        }
        let guess = FRAC_PI_2 - 2.0 * (rho / self.rho_coef).atan();
        Ok(root_find(rho, guess, |latg| self.rho(latg))?)
    }

    fn km_per_pixel(&self, samples: usize, lines: usize) -> f64 {
        let edge_latg = self.body.graphic_latitude(self.edge_lat);
        self.rho(edge_latg) / (samples.min(lines) as f64 / 2.0)
    }

    /// Longitude of the map direction (`x`, `y`) from the pole, `y` up.
    fn longitude(&self, x: f64, y: f64) -> f64 {
        let theta = x.atan2(-y);
        if self.body.prograde() {
            normalize_longitude(-theta)
        } else {
            normalize_longitude(theta)
        }
    }
}

impl MapProjection for PolarStereographic {
    fn projection_name(&self) -> &'static str {
        "Polar Stereographic"
    }

    fn plot_map(
        &self,
        samples: usize,
        lines: usize,
        plot: &mut dyn FnMut(f64, f64, usize),
    ) -> Result<(), MapError> {
        let km_per_pixel = self.km_per_pixel(samples, lines);
        let rho_max = km_per_pixel * samples.min(lines) as f64 / 2.0;
        let sign = self.pole.sign();

        for k in 0..lines {
            let y = (k as f64 + 0.5 - lines as f64 / 2.0) * km_per_pixel;
            for i in 0..samples {
                let x = (i as f64 + 0.5 - samples as f64 / 2.0) * km_per_pixel;
                let rho = x.hypot(y);
                if rho > rho_max {
                    continue;
                }

                let latg = self.latitude_at(rho)?;
                let lat = sign * self.body.centric_latitude(latg);
                plot(lat, self.longitude(x, y), k * samples + i);
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
        let km_per_pixel = self.km_per_pixel(samples, lines);
        let sign = self.pole.sign();
        let prograde = self.body.prograde();

        let project = |lat: f64, lon: f64| {
            let pole_lat = sign * lat;
            if pole_lat < self.edge_lat {
                return None;
            }
            let rho = self.rho(self.body.graphic_latitude(pole_lat));
            let theta = if prograde { -lon } else { lon };
            let (sin_t, cos_t) = theta.sin_cos();
            Some((
                rho * sin_t / km_per_pixel + samples as f64 / 2.0,
                -rho * cos_t / km_per_pixel + lines as f64 / 2.0,
            ))
        };

        let (lo_lat, hi_lat) = match self.pole {
            Pole::North => (self.edge_lat, FRAC_PI_2),
            Pole::South => (-FRAC_PI_2, -self.edge_lat),
        };
        draw_graticule(grid, (lo_lat, hi_lat), (0.0, TAU), lat_interval, lon_interval, project)
    }
}
