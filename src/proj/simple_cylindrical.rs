//! Simple Cylindrical (plate carrée) projection.
//!
//!   lat(k) = lo_lat + (k + ½)·(hi_lat − lo_lat)/lines
//!   lon(i) = hi_lon − (i + ½)·(hi_lon − lo_lon)/samples   (prograde)
//!   lon(i) = lo_lon + (i + ½)·(hi_lon − lo_lon)/samples   (retrograde)
//!
//! With `graphic_lat` the rows are evenly spaced in planetographic
//! latitude instead.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::sync::Arc;

use ndarray::Array2;

use crate::angles::{latitude_from_degrees, normalize_longitude};
use crate::body::BodyData;
use crate::error::MapError;
use crate::proj::common::{check_grid, column_longitude, draw_graticule, longitude_column};
use crate::proj::MapProjection;

/// Latitude and longitude linear in map lines and samples.
#[derive(Debug, Clone)]
pub struct SimpleCylindrical {
    body: Arc<dyn BodyData>,
    /// Planetocentric latitude bounds (radians).
    lo_lat: f64,
    hi_lat: f64,
    /// Western longitude bound in [0, 2π) and eastward extent (radians).
    lo_lon: f64,
    lon_span: f64,
    graphic_lat: bool,
}

impl SimpleCylindrical {
    /// Bounds are planetocentric degrees. Longitudes may be given in
    /// `[-360, 360]`; `hi_lon - lo_lon` must be in `(0, 360]`.
    pub fn new(
        body: Arc<dyn BodyData>,
        lo_lat: f64,
        hi_lat: f64,
        lo_lon: f64,
        hi_lon: f64,
        graphic_lat: bool,
    ) -> Result<Self, MapError> {
        let lo = latitude_from_degrees("lower latitude", lo_lat)?;
        let hi = latitude_from_degrees("upper latitude", hi_lat)?;
        if !(lo < hi) {
            return Err(MapError::InvalidParameter(format!(
                "lower latitude {lo_lat}° must be below upper latitude {hi_lat}°"
            )));
        }

        for (name, lon) in [("lower longitude", lo_lon), ("upper longitude", hi_lon)] {
            if !(-360.0..=360.0).contains(&lon) {
                return Err(MapError::InvalidParameter(format!(
                    "{name} {lon}° outside [-360°, 360°]"
                )));
            }
        }
        let span = hi_lon - lo_lon;
        if !(span > 0.0 && span <= 360.0) {
            return Err(MapError::InvalidParameter(format!(
                "longitude range {lo_lon}°..{hi_lon}° must span (0°, 360°]"
            )));
        }

        Ok(Self {
            body,
            lo_lat: lo,
            hi_lat: hi,
            lo_lon: normalize_longitude(lo_lon.to_radians()),
            lon_span: span.to_radians(),
            graphic_lat,
        })
    }

    /// Whole body: latitudes -90°..90°, longitudes 0°..360°.
    pub fn global(body: Arc<dyn BodyData>) -> Self {
        Self {
            body,
            lo_lat: -FRAC_PI_2,
            hi_lat: FRAC_PI_2,
            lo_lon: 0.0,
            lon_span: TAU,
            graphic_lat: false,
        }
    }

    /// Latitude bounds in the spacing used along map lines.
    fn row_bounds(&self) -> (f64, f64) {
        if self.graphic_lat {
            (
                self.body.graphic_latitude(self.lo_lat),
                self.body.graphic_latitude(self.hi_lat),
            )
        } else {
            (self.lo_lat, self.hi_lat)
        }
    }
}

impl MapProjection for SimpleCylindrical {
    fn projection_name(&self) -> &'static str {
        "Simple Cylindrical"
    }

    fn plot_map(
        &self,
        samples: usize,
        lines: usize,
        plot: &mut dyn FnMut(f64, f64, usize),
    ) -> Result<(), MapError> {
        let prograde = self.body.prograde();
        let (lo, hi) = self.row_bounds();
        let lat_res = (hi - lo) / lines as f64;

        let longitudes: Vec<f64> = (0..samples)
            .map(|i| column_longitude(prograde, self.lo_lon, self.lon_span, samples, i))
            .collect();

        for k in 0..lines {
            let mut lat = lo + (k as f64 + 0.5) * lat_res;
            if self.graphic_lat {
                lat = self.body.centric_latitude(lat);
            }

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
        let (lo, hi) = self.row_bounds();
        let lat_res = (hi - lo) / lines as f64;

        let project = |lat: f64, lon: f64| {
            let row_lat = if self.graphic_lat {
                self.body.graphic_latitude(lat)
            } else {
                lat
            };
            let x = longitude_column(prograde, self.lo_lon, self.lon_span, samples, lon)?;
            Some((x, (row_lat - lo) / lat_res))
        };

        draw_graticule(
            grid,
            (self.lo_lat, self.hi_lat),
            (self.lo_lon, self.lon_span),
            lat_interval,
            lon_interval,
            project,
        )
    }
}
